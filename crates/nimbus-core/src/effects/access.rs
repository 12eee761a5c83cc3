//! Remote access-binding API surface
//!
//! The RPC-shaped operations the reconciliation engine needs from the cloud
//! API: list with pagination, full replace, incremental update, and waiting
//! on the long-running operations the write calls return. Transport details
//! (wire encoding, auth, endpoints) are out of scope here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::binding::{AccessBinding, BindingDelta};
use crate::errors::Result;

/// One page of a binding listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingPage {
    /// Bindings on this page
    pub bindings: Vec<AccessBinding>,
    /// Opaque token for the next page; empty when no pages remain
    pub next_page_token: String,
}

/// Handle to a remote long-running operation returned by a write call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOperation {
    /// Remote operation identifier
    pub id: String,
    /// Human-readable description of what the operation does
    pub description: String,
}

/// The remote API operations the engine depends on.
///
/// Implementations must not retry internally; classifying failures as
/// transient or fatal is the orchestrator's job. Every method is bound to
/// the caller's task, so dropping the future cancels the in-flight wait
/// (the remote side keeps whatever it already committed).
#[async_trait]
pub trait AccessBindingEffects: Send + Sync {
    /// List one page of the resource's current bindings.
    async fn list_access_bindings(
        &self,
        resource_id: &str,
        page_token: &str,
        page_size: i64,
    ) -> Result<BindingPage>;

    /// Replace the resource's entire binding set atomically.
    async fn set_access_bindings(
        &self,
        resource_id: &str,
        bindings: &[AccessBinding],
    ) -> Result<RemoteOperation>;

    /// Apply incremental deltas. Callers must respect
    /// [`crate::batch::MAX_DELTAS_PER_UPDATE`] per call.
    async fn update_access_bindings(
        &self,
        resource_id: &str,
        deltas: &[BindingDelta],
    ) -> Result<RemoteOperation>;

    /// Block until the given long-running operation completes or fails.
    async fn await_operation(&self, operation: &RemoteOperation) -> Result<()>;
}
