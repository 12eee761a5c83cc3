//! Pure effect interfaces the engine calls through
//!
//! Core declares signatures only; implementations live with the concrete
//! cloud client (or the testkit fake). Keeping the interfaces here lets the
//! orchestration layer stay generic over any remote transport.

pub mod access;
pub mod reliability;

pub use access::{AccessBindingEffects, BindingPage, RemoteOperation};
pub use reliability::{BackoffStrategy, RetryPolicy};
