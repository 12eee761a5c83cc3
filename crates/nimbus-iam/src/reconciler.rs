//! The reconciliation orchestrator
//!
//! Drives one logical "reconcile policy for resource X" call end to end:
//! acquire the resource's named lock, list current bindings, compute the
//! delta, apply it (the updater batches internally), and read the final
//! policy back — the remote system is the source of truth, so the locally
//! computed delta is never trusted over a fresh listing. Conflict-class
//! errors re-enter the read step with backoff; every other error is fatal
//! and surfaced untouched.

use std::sync::Arc;

use nimbus_core::delta::policy_delta;
use nimbus_core::{NimbusError, Policy, Result, RetryPolicy};

use crate::intent::BindingIntent;
use crate::lock::KeyedLocks;
use crate::updater::ResourceIamUpdater;

/// Orchestrates access-binding reconciliation for any updater.
pub struct IamReconciler {
    locks: Arc<KeyedLocks>,
    retry: RetryPolicy,
}

impl IamReconciler {
    /// Create a reconciler over a shared lock registry with the default
    /// conflict retry policy (5 attempts, exponential backoff with jitter).
    pub fn new(locks: Arc<KeyedLocks>) -> Self {
        Self {
            locks,
            retry: RetryPolicy::exponential().with_max_attempts(5).with_jitter(),
        }
    }

    /// Replace the conflict retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reconcile the resource to an explicit desired policy.
    ///
    /// If current and desired already agree at the canonical-set level, no
    /// remote write is issued. Returns the post-reconciliation policy as
    /// read back from the remote.
    pub async fn reconcile(
        &self,
        updater: &dyn ResourceIamUpdater,
        desired: &Policy,
    ) -> Result<Policy> {
        self.reconcile_with(updater, |_| desired.clone()).await
    }

    /// Reconcile the resource under a [`BindingIntent`].
    ///
    /// The intent is resolved against the fresh current policy inside the
    /// lock on every attempt, so retries never act on a stale read.
    pub async fn apply(
        &self,
        updater: &dyn ResourceIamUpdater,
        intent: &BindingIntent,
    ) -> Result<Policy> {
        self.reconcile_with(updater, |current| intent.desired_policy(current))
            .await
    }

    /// Overwrite the entire policy (first-write or full-replace semantics)
    /// and return the read-back result.
    pub async fn overwrite(
        &self,
        updater: &dyn ResourceIamUpdater,
        policy: &Policy,
    ) -> Result<Policy> {
        let key = updater.mutex_key();
        let _guard = self.locks.lock(&key).await;
        updater.set_resource_iam_policy(policy).await?;
        updater.resource_iam_policy().await
    }

    async fn reconcile_with<F>(
        &self,
        updater: &dyn ResourceIamUpdater,
        build_desired: F,
    ) -> Result<Policy>
    where
        F: Fn(&Policy) -> Policy,
    {
        let key = updater.mutex_key();
        let _guard = self.locks.lock(&key).await;
        tracing::debug!(resource = %updater.describe(), "reconciling access bindings");

        let build = &build_desired;
        self.retry
            .execute_if(
                move || async move {
                    let current = updater.resource_iam_policy().await?;
                    let desired = build(&current);
                    let delta = policy_delta(&current, &desired);
                    if delta.is_empty() {
                        tracing::debug!(
                            resource = %updater.describe(),
                            "bindings already converged, skipping remote write"
                        );
                        return Ok(current);
                    }
                    tracing::debug!(
                        resource = %updater.describe(),
                        deltas = delta.len(),
                        "applying access binding delta"
                    );
                    updater.update_resource_iam_policy(&delta).await?;
                    updater.resource_iam_policy().await
                },
                NimbusError::is_conflict,
            )
            .await
    }
}
