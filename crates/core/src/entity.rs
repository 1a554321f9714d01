//! EntityId - the account/user whose history is evaluated

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the entity (account or user) a transaction belongs to.
///
/// Upstream systems use either integer ids or opaque strings; both are
/// stored in their canonical string form so history lookups agree.
/// All-digit strings that fit a `u64` are numeric ids: `"042"` and `42`
/// name the same entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawEntityId", into = "String")]
pub struct EntityId(String);

/// Wire form: JSON integers and strings are both accepted
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntityId {
    Numeric(u64),
    Text(String),
}

impl From<RawEntityId> for EntityId {
    fn from(raw: RawEntityId) -> Self {
        match raw {
            RawEntityId::Numeric(id) => Self::from(id),
            RawEntityId::Text(id) => Self::new(id),
        }
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = id.trim();
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(numeric) = id.parse::<u64>() {
                return Self::from(numeric);
            }
        }
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value of the id, if it is an integer id
    pub fn as_numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
