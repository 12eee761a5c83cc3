//! Nimbus Testing Infrastructure
//!
//! Shared fakes for exercising the reconciliation stack without a network.
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! nimbus-testkit = { path = "../nimbus-testkit" }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod access;

pub use access::FakeAccessBindingService;
