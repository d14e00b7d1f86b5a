//! Column types

/// Column metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct Column {
    /// Stable column identifier
    pub key: String,
    /// Header text
    pub label: String,
}

impl Column {
    /// Create a new column
    pub fn new<K: Into<String>, L: Into<String>>(key: K, label: L) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}
