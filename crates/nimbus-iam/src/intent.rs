//! Desired-policy intents
//!
//! The declarative framework exposes two binding resource forms — a
//! *binding* resource (one role, explicit member list, authoritative for
//! that role) and a *member* resource (one role, one member, additive
//! only) — plus the deletion paths. All of them reduce to "build a desired
//! policy from the fresh current one", which is what an intent does. The
//! reconciler resolves intents against current state inside the lock, so a
//! stale read can never leak into the desired policy.

use nimbus_core::canonical::{merge_bindings, remove_role_from_bindings};
use nimbus_core::{AccessBinding, Policy, Subject};
use serde::{Deserialize, Serialize};

/// A declarative change to one role's membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingIntent {
    /// Binding form: `members` becomes the complete membership of `role`;
    /// members of other roles are untouched.
    ReplaceRole {
        /// The role whose membership is replaced
        role: String,
        /// The authoritative member list
        members: Vec<Subject>,
    },
    /// Member form: grant `role` to `members`, keeping existing grants.
    AddMembers {
        /// The role being granted
        role: String,
        /// Members to add
        members: Vec<Subject>,
    },
    /// Revoke `role` from `members` only.
    RemoveMembers {
        /// The role being revoked
        role: String,
        /// Members to remove
        members: Vec<Subject>,
    },
    /// Retire `role` entirely, whoever holds it.
    RemoveRole {
        /// The role to retire
        role: String,
    },
}

impl BindingIntent {
    /// Resolve this intent against the fresh current policy.
    pub fn desired_policy(&self, current: &Policy) -> Policy {
        match self {
            Self::ReplaceRole { role, members } => {
                let mut bindings = remove_role_from_bindings(role, &current.bindings);
                bindings.extend(
                    members
                        .iter()
                        .map(|s| AccessBinding::new(role.clone(), s.clone())),
                );
                Policy::from_bindings(bindings)
            }
            Self::AddMembers { role, members } => {
                let mut bindings = current.bindings.clone();
                bindings.extend(
                    members
                        .iter()
                        .map(|s| AccessBinding::new(role.clone(), s.clone())),
                );
                Policy {
                    bindings: merge_bindings(&bindings),
                }
            }
            Self::RemoveMembers { role, members } => {
                let revoked: Vec<String> = members.iter().map(Subject::member).collect();
                let bindings = current
                    .bindings
                    .iter()
                    .filter(|b| !(b.role == *role && revoked.contains(&b.subject.member())))
                    .cloned()
                    .collect();
                Policy::from_bindings(bindings)
            }
            Self::RemoveRole { role } => Policy::from_bindings(remove_role_from_bindings(
                role,
                &current.bindings,
            )),
        }
    }

    /// The role this intent touches.
    pub fn role(&self) -> &str {
        match self {
            Self::ReplaceRole { role, .. }
            | Self::AddMembers { role, .. }
            | Self::RemoveMembers { role, .. }
            | Self::RemoveRole { role } => role,
        }
    }
}
