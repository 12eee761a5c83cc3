//! Generic API-backed updater
//!
//! [`ApiIamUpdater`] is the one [`ResourceIamUpdater`] implementation every
//! resource kind instantiates: it carries the kind name and resource id and
//! drives any [`AccessBindingEffects`] client. Listing flattens pagination,
//! writes wait on their long-running operations, and updates are applied in
//! sequential batches of at most [`MAX_DELTAS_PER_UPDATE`] deltas.

use std::sync::Arc;

use async_trait::async_trait;
use nimbus_core::batch::{count_batches, MAX_DELTAS_PER_UPDATE};
use nimbus_core::{
    AccessBindingEffects, NimbusError, Policy, PolicyDelta, Result,
};

use crate::updater::ResourceIamUpdater;

/// Default page size for binding listings.
const LIST_PAGE_SIZE: i64 = 1000;

/// Updater for one resource of one kind, backed by a remote API client.
pub struct ApiIamUpdater<C> {
    client: Arc<C>,
    resource_kind: String,
    resource_id: String,
    page_size: i64,
}

impl<C> ApiIamUpdater<C> {
    /// Create an updater for `resource_id` of `resource_kind`.
    pub fn new(client: Arc<C>, resource_kind: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            client,
            resource_kind: resource_kind.into(),
            resource_id: resource_id.into(),
            page_size: LIST_PAGE_SIZE,
        }
    }

    /// Override the listing page size (the remote list API accepts one).
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Prefix a remote error with resource context, preserving its variant
    /// so retry classification survives the wrap.
    fn wrap(&self, operation: &str, err: NimbusError) -> NimbusError {
        let context = format!(
            "{operation} for {} {:?}",
            self.resource_kind, self.resource_id
        );
        match err {
            NimbusError::Invalid { message } => {
                NimbusError::invalid(format!("{context}: {message}"))
            }
            NimbusError::NotFound { message } => {
                NimbusError::not_found(format!("{context}: {message}"))
            }
            NimbusError::Conflict { message } => {
                NimbusError::conflict(format!("{context}: {message}"))
            }
            NimbusError::Api { message } => NimbusError::api(format!("{context}: {message}")),
            NimbusError::PartialApply {
                committed_batches,
                committed_deltas,
                message,
            } => NimbusError::partial_apply(
                committed_batches,
                committed_deltas,
                format!("{context}: {message}"),
            ),
            NimbusError::Internal { message } => {
                NimbusError::internal(format!("{context}: {message}"))
            }
        }
    }
}

#[async_trait]
impl<C: AccessBindingEffects> ResourceIamUpdater for ApiIamUpdater<C> {
    fn resource_id(&self) -> &str {
        &self.resource_id
    }

    fn mutex_key(&self) -> String {
        format!("iam-{}-{}", self.resource_kind, self.resource_id)
    }

    fn describe(&self) -> String {
        format!("{} {:?}", self.resource_kind, self.resource_id)
    }

    async fn resource_iam_policy(&self) -> Result<Policy> {
        let mut bindings = Vec::new();
        let mut page_token = String::new();
        loop {
            let page = self
                .client
                .list_access_bindings(&self.resource_id, &page_token, self.page_size)
                .await
                .map_err(|e| self.wrap("listing access bindings", e))?;
            bindings.extend(page.bindings);
            if page.next_page_token.is_empty() {
                break;
            }
            page_token = page.next_page_token;
        }
        Ok(Policy::from_bindings(bindings))
    }

    async fn set_resource_iam_policy(&self, policy: &Policy) -> Result<()> {
        let operation = self
            .client
            .set_access_bindings(&self.resource_id, &policy.bindings)
            .await
            .map_err(|e| self.wrap("setting access bindings", e))?;
        self.client
            .await_operation(&operation)
            .await
            .map_err(|e| self.wrap("setting access bindings", e))
    }

    async fn update_resource_iam_policy(&self, delta: &PolicyDelta) -> Result<()> {
        let batches = count_batches(delta.len(), MAX_DELTAS_PER_UPDATE);
        let mut committed_batches = 0usize;
        let mut committed_deltas = 0usize;

        for (index, chunk) in delta.deltas.chunks(MAX_DELTAS_PER_UPDATE).enumerate() {
            tracing::debug!(
                resource = %self.describe(),
                batch = index + 1,
                batches,
                deltas = chunk.len(),
                "applying access binding batch"
            );
            let result = async {
                let operation = self
                    .client
                    .update_access_bindings(&self.resource_id, chunk)
                    .await?;
                self.client.await_operation(&operation).await
            }
            .await;

            if let Err(err) = result {
                // Committed batches are not rolled back; the caller re-runs
                // reconciliation, which recomputes the delta from remote
                // ground truth.
                let err = self.wrap("updating access bindings", err);
                if committed_batches == 0 {
                    return Err(err);
                }
                return Err(NimbusError::partial_apply(
                    committed_batches,
                    committed_deltas,
                    err.to_string(),
                ));
            }
            committed_batches += 1;
            committed_deltas += chunk.len();
        }
        Ok(())
    }
}
