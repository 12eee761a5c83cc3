//! In-memory fake of the remote access-binding service
//!
//! Backs integration tests of the reconciliation stack: real pagination,
//! scripted conflict bursts, per-call failure injection, and full call
//! recording, with no network anywhere. State mutates at the update/set
//! call; operations returned by writes resolve instantly in
//! `await_operation`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use nimbus_core::{
    AccessBinding, AccessBindingEffects, BindingAction, BindingDelta, BindingPage, NimbusError,
    RemoteOperation, Result,
};
use parking_lot::Mutex;

#[derive(Default)]
struct Inner {
    resources: HashMap<String, Vec<AccessBinding>>,
    missing: HashSet<String>,
    update_call_sizes: Vec<usize>,
    set_calls: usize,
    list_calls: usize,
    conflicts_remaining: u32,
    fail_update_call: Option<usize>,
    next_operation: u64,
}

impl Inner {
    fn operation(&mut self, description: &str) -> RemoteOperation {
        self.next_operation += 1;
        RemoteOperation {
            id: format!("operation-{}", self.next_operation),
            description: description.to_string(),
        }
    }

    fn check_exists(&self, resource_id: &str) -> Result<()> {
        if self.missing.contains(resource_id) {
            return Err(NimbusError::not_found(format!(
                "resource {resource_id:?} does not exist"
            )));
        }
        Ok(())
    }
}

/// Fake [`AccessBindingEffects`] implementation with fault injection.
#[derive(Default)]
pub struct FakeAccessBindingService {
    inner: Mutex<Inner>,
}

impl FakeAccessBindingService {
    /// An empty service with no resources and no scripted faults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource with its current bindings.
    pub fn seed(&self, resource_id: impl Into<String>, bindings: Vec<AccessBinding>) {
        self.inner.lock().resources.insert(resource_id.into(), bindings);
    }

    /// Make every call against `resource_id` report not-found.
    pub fn mark_missing(&self, resource_id: impl Into<String>) {
        self.inner.lock().missing.insert(resource_id.into());
    }

    /// The next `n` update calls fail with a conflicting-operation error
    /// before mutating any state.
    pub fn inject_conflicts(&self, n: u32) {
        self.inner.lock().conflicts_remaining = n;
    }

    /// The `n`-th update call (1-based, counted across all resources)
    /// fails with an API error before mutating any state.
    pub fn fail_update_call(&self, n: usize) {
        self.inner.lock().fail_update_call = Some(n);
    }

    /// Current bindings of a resource (empty if never seeded).
    pub fn bindings_of(&self, resource_id: &str) -> Vec<AccessBinding> {
        self.inner
            .lock()
            .resources
            .get(resource_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Sizes of every update call issued so far, including failed ones.
    pub fn update_call_sizes(&self) -> Vec<usize> {
        self.inner.lock().update_call_sizes.clone()
    }

    /// Number of set (full replace) calls issued so far.
    pub fn set_call_count(&self) -> usize {
        self.inner.lock().set_calls
    }

    /// Number of list calls issued so far (one per page).
    pub fn list_call_count(&self) -> usize {
        self.inner.lock().list_calls
    }
}

fn apply_delta(bindings: &mut Vec<AccessBinding>, delta: &BindingDelta) {
    match delta.action {
        BindingAction::Add => {
            if !bindings.contains(&delta.binding) {
                bindings.push(delta.binding.clone());
            }
        }
        BindingAction::Remove => {
            bindings.retain(|b| b != &delta.binding);
        }
    }
}

#[async_trait]
impl AccessBindingEffects for FakeAccessBindingService {
    async fn list_access_bindings(
        &self,
        resource_id: &str,
        page_token: &str,
        page_size: i64,
    ) -> Result<BindingPage> {
        let mut inner = self.inner.lock();
        inner.list_calls += 1;
        inner.check_exists(resource_id)?;

        let offset: usize = if page_token.is_empty() {
            0
        } else {
            page_token
                .parse()
                .map_err(|_| NimbusError::invalid(format!("bad page token {page_token:?}")))?
        };
        let page_size = if page_size <= 0 {
            usize::MAX
        } else {
            page_size as usize
        };

        let all = inner
            .resources
            .get(resource_id)
            .cloned()
            .unwrap_or_default();
        let end = all.len().min(offset.saturating_add(page_size));
        let bindings = all.get(offset..end).unwrap_or_default().to_vec();
        let next_page_token = if end < all.len() {
            end.to_string()
        } else {
            String::new()
        };
        Ok(BindingPage {
            bindings,
            next_page_token,
        })
    }

    async fn set_access_bindings(
        &self,
        resource_id: &str,
        bindings: &[AccessBinding],
    ) -> Result<RemoteOperation> {
        let mut inner = self.inner.lock();
        inner.check_exists(resource_id)?;
        inner.set_calls += 1;
        inner
            .resources
            .insert(resource_id.to_string(), bindings.to_vec());
        Ok(inner.operation("set access bindings"))
    }

    async fn update_access_bindings(
        &self,
        resource_id: &str,
        deltas: &[BindingDelta],
    ) -> Result<RemoteOperation> {
        let mut inner = self.inner.lock();
        inner.check_exists(resource_id)?;
        inner.update_call_sizes.push(deltas.len());
        let call_index = inner.update_call_sizes.len();

        if inner.conflicts_remaining > 0 {
            inner.conflicts_remaining -= 1;
            return Err(NimbusError::conflict(
                "access bindings are being mutated by another operation",
            ));
        }
        if inner.fail_update_call == Some(call_index) {
            return Err(NimbusError::api("injected update failure"));
        }

        let bindings = inner.resources.entry(resource_id.to_string()).or_default();
        // split the borrow: apply against a local, then store back
        let mut updated = std::mem::take(bindings);
        for delta in deltas {
            apply_delta(&mut updated, delta);
        }
        inner
            .resources
            .insert(resource_id.to_string(), updated);
        Ok(inner.operation("update access bindings"))
    }

    async fn await_operation(&self, _operation: &RemoteOperation) -> Result<()> {
        Ok(())
    }
}
