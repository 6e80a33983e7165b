//! Board configuration loading

use crate::error::Result;
use std::path::Path;
use workboard_common::Pretty;
use workboard_config::{BoardConfig, ConfigProvider};

/// Load board settings: defaults, then `file` if given, then `WORKBOARD_*`
/// environment variables.
pub fn load_board_config(file: Option<&Path>) -> Result<BoardConfig> {
    let provider = match file {
        Some(path) => ConfigProvider::new().with_file(path),
        None => ConfigProvider::new(),
    };
    let config = provider.load()?;
    tracing::debug!(config = %Pretty(&config), "board configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KanbanError;
    use tempfile::TempDir;
    use workboard_config::UnassignedPlacement;

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("board.toml");
        std::fs::write(
            &path,
            "unassigned_placement = \"last\"\nempty_column_message = \"Nothing here\"\n",
        )
        .unwrap();

        let config = load_board_config(Some(path.as_path())).unwrap();
        assert_eq!(config.unassigned_placement, UnassignedPlacement::Last);
        assert_eq!(config.empty_column_message, "Nothing here");
        assert_eq!(config.no_type_label, "No Type");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.yaml");
        let err = load_board_config(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, KanbanError::Config(_)));
    }
}
