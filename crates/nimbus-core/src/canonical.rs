//! Canonicalization and merge of binding lists
//!
//! Everything here reduces a binding list to the canonical
//! `role -> set<member>` shape, where a member is the `kind:id` string of
//! the subject. That map is the only place binding equality is defined:
//! duplicate facts collapse regardless of input order, and set operations
//! (union, difference) run in O(n). The map is never persisted; it is
//! rebuilt from a [`Policy`](crate::binding::Policy)'s bindings each time a
//! merge or diff runs.
//!
//! Ordered containers are used so equal inputs always produce identical
//! output, but callers must treat results as sets: only membership is part
//! of the contract.

use std::collections::{BTreeMap, BTreeSet};

use crate::binding::{AccessBinding, Subject};
use crate::errors::{NimbusError, Result};

/// The canonical membership map: role to set of `kind:id` member strings.
pub fn roles_to_members_map(bindings: &[AccessBinding]) -> BTreeMap<String, BTreeSet<String>> {
    let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for binding in bindings {
        map.entry(binding.role.clone())
            .or_default()
            .insert(binding.subject.member());
    }
    map
}

/// Like [`roles_to_members_map`] but keeps the parsed subject alongside the
/// member string, so callers can rebuild bindings without re-parsing.
pub(crate) fn indexed(bindings: &[AccessBinding]) -> BTreeMap<String, BTreeMap<String, Subject>> {
    let mut map: BTreeMap<String, BTreeMap<String, Subject>> = BTreeMap::new();
    for binding in bindings {
        map.entry(binding.role.clone())
            .or_default()
            .insert(binding.subject.member(), binding.subject.clone());
    }
    map
}

pub(crate) fn flatten(index: BTreeMap<String, BTreeMap<String, Subject>>) -> Vec<AccessBinding> {
    let mut out = Vec::new();
    for (role, members) in index {
        for subject in members.into_values() {
            out.push(AccessBinding::new(role.clone(), subject));
        }
    }
    out
}

/// Union an arbitrary binding list into a flat, deduplicated one.
///
/// Used whenever two binding lists (API pages, or "to add" plus "existing")
/// must be combined. Output order is canonical (role, then member), not
/// input order.
pub fn merge_bindings(bindings: &[AccessBinding]) -> Vec<AccessBinding> {
    flatten(indexed(bindings))
}

/// The members currently holding `role`, deduplicated.
///
/// Answers "who has role R" without building the full map for every role.
pub fn role_members(role: &str, bindings: &[AccessBinding]) -> Vec<String> {
    let members: BTreeSet<String> = bindings
        .iter()
        .filter(|b| b.role == role)
        .map(|b| b.subject.member())
        .collect();
    members.into_iter().collect()
}

/// A new binding list with every binding for `role` removed, regardless of
/// member. Bindings for other roles pass through unchanged, in input order.
pub fn remove_role_from_bindings(role: &str, bindings: &[AccessBinding]) -> Vec<AccessBinding> {
    bindings
        .iter()
        .filter(|b| b.role != role)
        .cloned()
        .collect()
}

/// Parse a `kind:id` member string back into a [`Subject`].
///
/// Splits on the first colon only, so an id containing colons survives the
/// compose/decompose round trip. A member with no colon, or with a kind
/// outside the fixed vocabulary, is a hard input error.
pub fn parse_member(member: &str) -> Result<Subject> {
    let (kind, id) = member
        .split_once(':')
        .ok_or_else(|| NimbusError::invalid(format!("malformed member {member:?}: missing ':'")))?;
    Ok(Subject::new(kind.parse()?, id))
}

/// Build a binding fact from a role and a `kind:id` member string.
pub fn member_to_access_binding(role: impl Into<String>, member: &str) -> Result<AccessBinding> {
    Ok(AccessBinding::new(role, parse_member(member)?))
}
