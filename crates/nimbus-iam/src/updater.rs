//! The per-resource-kind updater capability
//!
//! Every cloud resource kind that carries access bindings exposes this
//! capability set to the reconciler. There is no shared behavior beyond the
//! contract, so the trait is flat: one implementation per resource kind
//! (in practice, [`crate::ApiIamUpdater`] instantiated with the kind).

use async_trait::async_trait;
use nimbus_core::{Policy, PolicyDelta, Result};

/// Capability interface the reconciler drives for one resource.
///
/// Failure semantics: implementations wrap remote errors with resource
/// kind and id context but never retry internally — only the reconciler
/// can tell a transient conflict from a hard failure.
#[async_trait]
pub trait ResourceIamUpdater: Send + Sync {
    /// Stable identifier of the target resource
    fn resource_id(&self) -> &str;

    /// Key identifying this resource's binding set for in-process
    /// serialization. Shaped as `iam-<kind>-<id>` so two kinds with
    /// colliding raw ids never share a lock.
    fn mutex_key(&self) -> String;

    /// Human-readable identity for diagnostics, never used for logic
    fn describe(&self) -> String;

    /// List the resource's current bindings, pagination flattened
    async fn resource_iam_policy(&self) -> Result<Policy>;

    /// Replace the entire policy atomically, waiting on the remote
    /// long-running operation
    async fn set_resource_iam_policy(&self, policy: &Policy) -> Result<()>;

    /// Apply incremental deltas in sequential batches, each waited on
    /// before the next is issued
    async fn update_resource_iam_policy(&self, delta: &PolicyDelta) -> Result<()>;
}
