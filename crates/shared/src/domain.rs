use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque item identifier. Ids minted by this client are UUID v4 strings;
/// ids coming back from the store are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub uid: ItemId,
    pub desc: String,
    #[serde(default)]
    pub done: bool,
}

impl Item {
    pub fn new(uid: impl Into<ItemId>, desc: impl Into<String>, done: bool) -> Self {
        Self {
            uid: uid.into(),
            desc: desc.into(),
            done,
        }
    }

    /// Fresh, not-yet-done item with a newly generated id.
    pub fn draft(desc: impl Into<String>) -> Self {
        Self::new(ItemId::generate(), desc, false)
    }

    pub fn with_desc(&self, desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            ..self.clone()
        }
    }

    pub fn toggled(&self) -> Self {
        Self {
            done: !self.done,
            ..self.clone()
        }
    }
}
