//! Diff computation between policies
//!
//! Given the current and desired policy for a resource, produce the minimal
//! list of add/remove operations moving one to the other. Both sides are
//! compared through the canonical membership map, so duplicate input facts
//! and input ordering never influence the result.

use crate::binding::{AccessBinding, BindingDelta, Policy, PolicyDelta};
use crate::canonical;

/// The minimal delta moving `current` to `desired`.
///
/// Adds come first (desired members missing from current), then removes
/// (current members absent from desired), each group in canonical
/// (role, member) order. The order is stable for testability only; applying
/// the operations in any order yields the same final set.
pub fn policy_delta(current: &Policy, desired: &Policy) -> PolicyDelta {
    let cur = canonical::indexed(&current.bindings);
    let des = canonical::indexed(&desired.bindings);

    let mut deltas = Vec::new();
    for (role, members) in &des {
        for (member, subject) in members {
            let present = cur.get(role).is_some_and(|m| m.contains_key(member));
            if !present {
                deltas.push(BindingDelta::add(AccessBinding::new(
                    role.clone(),
                    subject.clone(),
                )));
            }
        }
    }
    for (role, members) in &cur {
        for (member, subject) in members {
            let wanted = des.get(role).is_some_and(|m| m.contains_key(member));
            if !wanted {
                deltas.push(BindingDelta::remove(AccessBinding::new(
                    role.clone(),
                    subject.clone(),
                )));
            }
        }
    }
    PolicyDelta { deltas }
}

/// A delta revoking every binding of `role`, used when a role is retired
/// entirely rather than member by member.
pub fn role_removal_delta(role: &str, current: &Policy) -> PolicyDelta {
    let cur = canonical::indexed(&current.bindings);
    let deltas = cur
        .get(role)
        .map(|members| {
            members
                .values()
                .map(|subject| {
                    BindingDelta::remove(AccessBinding::new(role.to_string(), subject.clone()))
                })
                .collect()
        })
        .unwrap_or_default();
    PolicyDelta { deltas }
}

/// Apply a delta to a policy locally.
///
/// Model helper: the engine never trusts this over a remote read-back, but
/// tests use it to state the diff/apply round-trip law.
pub fn apply_delta(policy: &Policy, delta: &PolicyDelta) -> Policy {
    let mut index = canonical::indexed(&policy.bindings);
    for d in &delta.deltas {
        let member = d.binding.subject.member();
        match d.action {
            crate::binding::BindingAction::Add => {
                index
                    .entry(d.binding.role.clone())
                    .or_default()
                    .insert(member, d.binding.subject.clone());
            }
            crate::binding::BindingAction::Remove => {
                if let Some(members) = index.get_mut(&d.binding.role) {
                    members.remove(&member);
                    if members.is_empty() {
                        index.remove(&d.binding.role);
                    }
                }
            }
        }
    }
    Policy {
        bindings: canonical::flatten(index),
    }
}
