//! Access-binding data model
//!
//! The vocabulary of the reconciliation engine: a [`Subject`] is a principal,
//! an [`AccessBinding`] is one "role grants access to subject" fact, a
//! [`Policy`] is the set of facts attached to one resource, and a
//! [`PolicyDelta`] is the ordered list of add/remove operations that moves
//! one policy to another. All of these are plain values compared by content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{NimbusError, Result};

/// The fixed vocabulary of principal types.
///
/// Kinds are a closed enum so their wire names can never contain `:`,
/// which keeps the `kind:id` member encoding unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubjectKind {
    /// A human user account
    UserAccount,
    /// A machine service account
    ServiceAccount,
    /// A user federated from an external identity provider
    FederatedUser,
    /// A group of accounts
    Group,
    /// A well-known system group (e.g. all authenticated users)
    System,
}

impl SubjectKind {
    /// The wire name used in member strings and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserAccount => "userAccount",
            Self::ServiceAccount => "serviceAccount",
            Self::FederatedUser => "federatedUser",
            Self::Group => "group",
            Self::System => "system",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = NimbusError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "userAccount" => Ok(Self::UserAccount),
            "serviceAccount" => Ok(Self::ServiceAccount),
            "federatedUser" => Ok(Self::FederatedUser),
            "group" => Ok(Self::Group),
            "system" => Ok(Self::System),
            other => Err(NimbusError::invalid(format!(
                "unknown subject kind {other:?}"
            ))),
        }
    }
}

/// A principal reference: who is being granted access.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// The principal type
    pub kind: SubjectKind,
    /// The principal identifier within its type's namespace
    pub id: String,
}

impl Subject {
    /// Create a subject reference
    pub fn new(kind: SubjectKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// The canonical `kind:id` member encoding.
    ///
    /// This string is the single definition of subject equality used by
    /// canonicalization and diffing.
    pub fn member(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// One fact: "subject has role on the resource."
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessBinding {
    /// The granted role identifier
    pub role: String,
    /// The principal the role is granted to
    pub subject: Subject,
}

impl AccessBinding {
    /// Create a binding fact
    pub fn new(role: impl Into<String>, subject: Subject) -> Self {
        Self {
            role: role.into(),
            subject,
        }
    }
}

/// The full set of bindings attached to one resource.
///
/// Produced either by listing the resource's current bindings (with
/// pagination flattened) or by composing desired state from configuration.
/// Canonical invariant: no two bindings share a (role, subject) pair once
/// passed through [`crate::canonical::merge_bindings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// The binding facts, in no semantically meaningful order
    pub bindings: Vec<AccessBinding>,
}

impl Policy {
    /// An empty policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a canonical policy from an arbitrary binding list,
    /// collapsing duplicate facts.
    pub fn from_bindings(bindings: Vec<AccessBinding>) -> Self {
        Self {
            bindings: crate::canonical::merge_bindings(&bindings),
        }
    }

    /// True when the policy grants nothing
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Whether a delta grants or revokes its binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingAction {
    /// Grant the binding
    Add,
    /// Revoke the binding
    Remove,
}

/// An add or remove operation on a single binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDelta {
    /// Grant or revoke
    pub action: BindingAction,
    /// The binding being granted or revoked
    pub binding: AccessBinding,
}

impl BindingDelta {
    /// A delta granting `binding`
    pub fn add(binding: AccessBinding) -> Self {
        Self {
            action: BindingAction::Add,
            binding,
        }
    }

    /// A delta revoking `binding`
    pub fn remove(binding: AccessBinding) -> Self {
        Self {
            action: BindingAction::Remove,
            binding,
        }
    }
}

/// The ordered list of operations moving one policy state to another.
///
/// Ephemeral: computed inside one reconciliation call and discarded once
/// applied. Order is stable for testability but carries no semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDelta {
    /// The individual add/remove operations
    pub deltas: Vec<BindingDelta>,
}

impl PolicyDelta {
    /// True when there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Number of operations in the delta
    pub fn len(&self) -> usize {
        self.deltas.len()
    }
}
