//! Workflow status nodes

use super::ids::StatusId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A named node in a workflow.
///
/// Statuses are configuration data: created by an administrator, shared
/// read-only by every session. Ascending `sort_order` means earlier in the
/// workflow. Entering a final status completes the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub name: String,
    pub sort_order: i32,
    #[serde(default)]
    pub is_final: bool,
    /// Presentation color (CSS color string)
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_color() -> String {
    "#808080".into()
}

impl Status {
    /// Create a non-final status
    pub fn new(id: impl Into<StatusId>, name: impl Into<String>, sort_order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sort_order,
            is_final: false,
            color: default_color(),
            description: None,
        }
    }

    /// Mark this status as terminal
    pub fn final_status(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Set the presentation color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Board and menu ordering: sort order, then name.
    pub fn display_cmp(&self, other: &Status) -> Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Sort statuses in display order
pub(crate) fn sort_for_display(statuses: &mut [Status]) {
    statuses.sort_by(Status::display_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_ordering_uses_sort_order_then_name() {
        let mut statuses = vec![
            Status::new("done", "Done", 3),
            Status::new("b", "Beta", 1),
            Status::new("a", "Alpha", 1),
        ];
        sort_for_display(&mut statuses);
        let names: Vec<_> = statuses.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Done"]);
    }

    #[test]
    fn test_final_flag() {
        let status = Status::new("done", "Done", 9).final_status().with_color("#00AA00");
        assert!(status.is_final);
        assert_eq!(status.color, "#00AA00");
    }

    #[test]
    fn test_deserialize_defaults() {
        let status: Status =
            serde_json::from_str(r#"{"id":"todo","name":"To Do","sort_order":0}"#).unwrap();
        assert!(!status.is_final);
        assert_eq!(status.color, "#808080");
    }
}
