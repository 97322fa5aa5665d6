//! Label names and the current selection.

use serde::{Deserialize, Serialize};

/// A label as the store serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "labelName")]
    pub label_name: String,
}

impl LabelEntry {
    /// A label not yet stored.
    pub fn named(label_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            label_name: label_name.into(),
        }
    }
}

/// Why a label could not be added.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    #[error("Label name is empty")]
    Empty,

    #[error("Label '{0}' already exists")]
    Duplicate(String),
}

/// Ordered label names. An annotation's `label_index` points into this list,
/// so entries are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
    selected: Option<usize>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self {
            names,
            selected: None,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Append a label. The name is trimmed; empty and duplicate names are
    /// rejected. Returns the stored name.
    pub fn add(&mut self, name: &str) -> Result<&str, LabelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LabelError::Empty);
        }
        if self.names.iter().any(|n| n == name) {
            return Err(LabelError::Duplicate(name.to_string()));
        }
        self.names.push(name.to_string());
        Ok(&self.names[self.names.len() - 1])
    }

    /// Replace all names. A selection that is still in range survives.
    pub fn replace(&mut self, names: Vec<String>) {
        self.names = names;
        if self.selected.is_some_and(|i| i >= self.names.len()) {
            self.selected = None;
        }
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.selected = None;
    }

    /// Select a label by index. Out-of-range indices leave the selection
    /// unchanged and return `false`.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.names.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.and_then(|i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_and_rejects_duplicates() {
        let mut labels = LabelSet::new();
        assert_eq!(labels.add("  cat "), Ok("cat"));
        assert_eq!(labels.add("cat"), Err(LabelError::Duplicate("cat".to_string())));
        assert_eq!(labels.add("   "), Err(LabelError::Empty));
        assert_eq!(labels.add("dog"), Ok("dog"));
        assert_eq!(labels.names(), ["cat", "dog"]);
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut labels = LabelSet::from_names(vec!["cat".into()]);
        assert!(!labels.select(3));
        assert_eq!(labels.selected(), None);
        assert!(labels.select(0));
        assert_eq!(labels.selected_name(), Some("cat"));
    }

    #[test]
    fn test_replace_drops_stale_selection() {
        let mut labels = LabelSet::from_names(vec!["a".into(), "b".into()]);
        labels.select(1);
        labels.replace(vec!["x".into(), "y".into(), "z".into()]);
        assert_eq!(labels.selected(), Some(1));
        labels.replace(vec!["only".into()]);
        assert_eq!(labels.selected(), None);
    }

    #[test]
    fn test_label_entry_json() {
        let json = serde_json::to_string(&LabelEntry::named("cat")).unwrap();
        assert_eq!(json, r#"{"labelName":"cat"}"#);
        let e: LabelEntry = serde_json::from_str(r#"{"id":"9","labelName":"dog"}"#).unwrap();
        assert_eq!(e.label_name, "dog");
    }
}
