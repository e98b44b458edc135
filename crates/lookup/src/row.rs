use crate::key::LookupKey;
use serde::{Deserialize, Serialize};

/// One row answered by a lookup source: a key, its display text and
/// auxiliary presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRow<K> {
    pub key: K,
    pub text: String,
    #[serde(default)]
    pub icon_id: Option<String>,
    #[serde(default)]
    pub tooltip_text: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Inactive rows are kept resolvable by key but excluded from browsing.
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub parent_key: Option<K>,
    /// Opaque payload carried through to the presentation layer.
    #[serde(default)]
    pub aux: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

impl<K: LookupKey> LookupRow<K> {
    pub fn new(key: K, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
            icon_id: None,
            tooltip_text: None,
            enabled: true,
            active: true,
            parent_key: None,
            aux: None,
        }
    }

    #[must_use]
    pub fn icon_id(mut self, icon_id: impl Into<String>) -> Self {
        self.icon_id = Some(icon_id.into());
        self
    }

    #[must_use]
    pub fn tooltip_text(mut self, tooltip_text: impl Into<String>) -> Self {
        self.tooltip_text = Some(tooltip_text.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn parent_key(mut self, parent_key: K) -> Self {
        self.parent_key = Some(parent_key);
        self
    }

    #[must_use]
    pub fn aux(mut self, aux: serde_json::Value) -> Self {
        self.aux = Some(aux);
        self
    }
}
