//! Configuration value types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the reserved unassigned column is rendered on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedPlacement {
    /// Before every status column
    #[default]
    First,
    /// After every status column
    Last,
}

/// Presentation and persistence settings for kanban boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Position of the column holding items without a recognized status
    pub unassigned_placement: UnassignedPlacement,
    /// Title of the unassigned column
    pub unassigned_label: String,
    /// Section label for items whose subtype is unknown
    pub no_type_label: String,
    /// Placeholder shown by a column with no cards
    pub empty_column_message: String,
    /// Optional prefix inserted into filter storage keys
    pub storage_prefix: String,
    /// JSON file backing persisted filter values; session memory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_store_path: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            unassigned_placement: UnassignedPlacement::First,
            unassigned_label: "Unassigned".into(),
            no_type_label: "No Type".into(),
            empty_column_message: "No items".into(),
            storage_prefix: String::new(),
            filter_store_path: None,
        }
    }
}

impl BoardConfig {
    /// Set the unassigned column placement
    pub fn with_unassigned_placement(mut self, placement: UnassignedPlacement) -> Self {
        self.unassigned_placement = placement;
        self
    }

    /// Set the filter storage prefix
    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    /// Set the JSON file used to persist filter values
    pub fn with_filter_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.filter_store_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.unassigned_placement, UnassignedPlacement::First);
        assert_eq!(config.no_type_label, "No Type");
        assert!(config.filter_store_path.is_none());
    }

    #[test]
    fn test_builder_helpers() {
        let config = BoardConfig::default()
            .with_unassigned_placement(UnassignedPlacement::Last)
            .with_storage_prefix("kanban_");
        assert_eq!(config.unassigned_placement, UnassignedPlacement::Last);
        assert_eq!(config.storage_prefix, "kanban_");
    }
}
