//! Connection policies and the reconciliation rules between them.

use super::{ParsePolicyKindError, PolicyConflict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Delivery semantics of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// The reader only ever sees the latest sample.
    Data,
    /// Samples are queued in a bounded buffer.
    Buffer,
}

impl PolicyKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Buffer => "buffer",
        }
    }
}

impl TryFrom<&str> for PolicyKind {
    type Error = ParsePolicyKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "data" => Ok(Self::Data),
            "buffer" => Ok(Self::Buffer),
            _ => Err(ParsePolicyKindError(value.to_owned())),
        }
    }
}

/// Transport contract for a single port-to-port connection.
///
/// A policy with no field set is "unspecified": it defers to whatever the
/// other side of a merge requires.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ConnectionPolicy {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<PolicyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, String>,
}

impl ConnectionPolicy {
    /// Creates an unspecified policy, negotiated later.
    #[must_use]
    pub const fn unspecified() -> Self {
        Self {
            kind: None,
            size: None,
            fields: BTreeMap::new(),
        }
    }

    /// Creates a latest-value policy.
    #[must_use]
    pub const fn data() -> Self {
        Self {
            kind: Some(PolicyKind::Data),
            size: None,
            fields: BTreeMap::new(),
        }
    }

    /// Creates a bounded-buffer policy holding `size` samples.
    #[must_use]
    pub const fn buffer(size: u32) -> Self {
        Self {
            kind: Some(PolicyKind::Buffer),
            size: Some(size),
            fields: BTreeMap::new(),
        }
    }

    /// Sets the policy kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: PolicyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the buffer size.
    #[must_use]
    pub const fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets a transport-specific field.
    ///
    /// Such fields have no merge rule: two different values for the same
    /// field always conflict.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the policy kind, if set.
    #[must_use]
    pub const fn kind(&self) -> Option<PolicyKind> {
        self.kind
    }

    /// Returns the buffer size, if set.
    #[must_use]
    pub const fn size(&self) -> Option<u32> {
        self.size
    }

    /// Returns the transport-specific fields.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Returns whether no field is set.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.kind.is_none() && self.size.is_none() && self.fields.is_empty()
    }

    /// Reconciles two policies required on the same port pair.
    ///
    /// An unspecified side yields the other side unchanged. Otherwise kinds
    /// must agree, a buffer `size` takes the larger value, and every other
    /// overlapping field must be equal.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyConflict`] naming the first field whose values cannot
    /// be reconciled.
    pub fn merge(&self, other: &Self) -> Result<Self, PolicyConflict> {
        if self.is_unspecified() {
            return Ok(other.clone());
        }
        if other.is_unspecified() {
            return Ok(self.clone());
        }

        let kind = match (self.kind, other.kind) {
            (Some(left), Some(right)) if left != right => {
                return Err(PolicyConflict::new("type", left.as_str(), right.as_str()));
            }
            (left, right) => left.or(right),
        };

        let size = match (self.size, other.size) {
            (Some(left), Some(right)) if left != right => {
                if kind != Some(PolicyKind::Buffer) {
                    return Err(PolicyConflict::new(
                        "size",
                        left.to_string(),
                        right.to_string(),
                    ));
                }
                Some(left.max(right))
            }
            (left, right) => left.or(right),
        };

        let mut fields = self.fields.clone();
        for (name, value) in &other.fields {
            match fields.get(name) {
                Some(existing) if existing != value => {
                    return Err(PolicyConflict::new(name.clone(), existing.clone(), value.clone()));
                }
                Some(_) => {}
                None => {
                    fields.insert(name.clone(), value.clone());
                }
            }
        }

        Ok(Self { kind, size, fields })
    }
}

impl fmt::Display for ConnectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            return f.write_str("unspecified");
        }
        let mut parts = Vec::new();
        if let Some(kind) = self.kind {
            parts.push(kind.as_str().to_owned());
        }
        if let Some(size) = self.size {
            parts.push(format!("size={size}"));
        }
        parts.extend(self.fields.iter().map(|(name, value)| format!("{name}={value}")));
        f.write_str(&parts.join(" "))
    }
}
