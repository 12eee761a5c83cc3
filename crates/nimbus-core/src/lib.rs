//! Nimbus Core - Access-Binding Model and Algorithms
//!
//! The pure heart of the Nimbus reconciliation engine:
//!
//! - Binding model: [`Subject`], [`AccessBinding`], [`Policy`],
//!   [`PolicyDelta`] — plain values compared by content.
//! - Canonicalization: [`canonical`] collapses binding lists into the
//!   `role -> set<member>` shape that defines binding equality.
//! - Diffing: [`delta`] computes the minimal add/remove operations moving
//!   the current policy to a desired one.
//! - Batching: [`batch`] slices deltas against the remote call-size limit.
//! - Effects: [`effects`] declares the remote API surface and retry policy
//!   the orchestration layer is generic over.
//!
//! No I/O happens in this crate; everything here is deterministic and
//! testable in isolation. The orchestration layer lives in `nimbus-iam`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod batch;
pub mod binding;
pub mod canonical;
pub mod delta;
pub mod effects;
pub mod errors;

pub use batch::{count_batches, MAX_DELTAS_PER_UPDATE};
pub use binding::{
    AccessBinding, BindingAction, BindingDelta, Policy, PolicyDelta, Subject, SubjectKind,
};
pub use effects::{AccessBindingEffects, BackoffStrategy, BindingPage, RemoteOperation, RetryPolicy};
pub use errors::{NimbusError, Result};
