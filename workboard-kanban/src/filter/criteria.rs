//! The aggregated filter selection

use crate::types::{EntityTypeId, SprintId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whose items to show
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsibleMode {
    /// Items assigned to the session user
    CurrentUser,
    /// Items assigned to a specific user
    User(UserId),
}

/// A concrete filter selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    EntityType(EntityTypeId),
    Responsible(ResponsibleMode),
    Sprint(SprintId),
    Text(String),
}

/// Filter key to selected value.
///
/// A key mapped to `None` is known but unfiltered. Only the toolbar writes
/// criteria, in response to component changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    values: HashMap<String, Option<FilterValue>>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: Option<FilterValue>) {
        self.values.insert(key.into(), value);
    }

    pub fn value(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key).and_then(Option::as_ref)
    }

    /// Whether `key` holds a real selection
    pub fn has_filter(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    pub fn has_any_filter(&self) -> bool {
        self.values.values().any(Option::is_some)
    }

    /// Bulk set; later entries win
    pub fn set_all<K: Into<String>>(&mut self, values: impl IntoIterator<Item = (K, Option<FilterValue>)>) {
        for (key, value) in values {
            self.set_value(key, value);
        }
    }

    /// Known keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// All real selections
    pub fn active_values(&self) -> impl Iterator<Item = &FilterValue> {
        self.values.values().filter_map(Option::as_ref)
    }
}
