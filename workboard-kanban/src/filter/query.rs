//! In-process evaluation of filter criteria

use super::criteria::{FilterCriteria, FilterValue, ResponsibleMode};
use crate::services::SessionContext;
use crate::types::{BoardItem, EntityType};
use std::collections::HashSet;

/// Items matching every active filter, in input order.
///
/// "Current user" matches nothing when the session has no user.
pub fn apply_criteria<T: BoardItem>(
    items: &[T],
    criteria: &FilterCriteria,
    session: &SessionContext,
) -> Vec<T> {
    let filters: Vec<&FilterValue> = criteria.active_values().collect();
    items
        .iter()
        .filter(|item| filters.iter().all(|f| item_matches(*item, f, session)))
        .cloned()
        .collect()
}

fn item_matches<T: BoardItem>(item: &T, filter: &FilterValue, session: &SessionContext) -> bool {
    match filter {
        FilterValue::EntityType(id) => item.entity_type().map(|t| &t.id) == Some(id),
        FilterValue::Responsible(ResponsibleMode::CurrentUser) => {
            session.user.is_some() && item.assignee() == session.user.as_ref()
        }
        FilterValue::Responsible(ResponsibleMode::User(user)) => item.assignee() == Some(user),
        FilterValue::Sprint(id) => item.sprint() == Some(id),
        FilterValue::Text(text) => item
            .name()
            .to_lowercase()
            .contains(&text.to_lowercase()),
    }
}

/// Distinct entity types of `items`, first occurrence wins
pub fn distinct_entity_types<T: BoardItem>(items: &[T]) -> Vec<EntityType> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| item.entity_type())
        .filter(|t| seen.insert(t.id.clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::components::{ENTITY_TYPE_KEY, RESPONSIBLE_KEY, SPRINT_KEY, TEXT_KEY};
    use crate::types::{ItemKind, WorkItem};

    fn items() -> Vec<WorkItem> {
        let bug = EntityType::new("bug", "Bug");
        let story = EntityType::new("story", "Story");
        vec![
            WorkItem::new(ItemKind::Activity, "Fix login")
                .with_id("1")
                .with_type(bug.clone())
                .with_assignee("ana")
                .with_sprint("s1"),
            WorkItem::new(ItemKind::Activity, "Login page")
                .with_id("2")
                .with_type(story.clone())
                .with_assignee("ben")
                .with_sprint("s1"),
            WorkItem::new(ItemKind::Meeting, "Retro")
                .with_id("3")
                .with_type(story)
                .with_sprint("s2"),
            WorkItem::new(ItemKind::Risk, "Untyped").with_id("4"),
        ]
    }

    fn ids(items: &[WorkItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_empty_criteria_keeps_everything() {
        let mut criteria = FilterCriteria::new();
        criteria.set_value(ENTITY_TYPE_KEY, None);
        let out = apply_criteria(&items(), &criteria, &SessionContext::default());
        assert_eq!(ids(&out), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_filters_combine() {
        let mut criteria = FilterCriteria::new();
        criteria.set_value(SPRINT_KEY, Some(FilterValue::Sprint("s1".into())));
        criteria.set_value(TEXT_KEY, Some(FilterValue::Text("LOGIN".into())));
        let out = apply_criteria(&items(), &criteria, &SessionContext::default());
        assert_eq!(ids(&out), vec!["1", "2"]);

        criteria.set_value(ENTITY_TYPE_KEY, Some(FilterValue::EntityType("story".into())));
        let out = apply_criteria(&items(), &criteria, &SessionContext::default());
        assert_eq!(ids(&out), vec!["2"]);
    }

    #[test]
    fn test_current_user() {
        let mut criteria = FilterCriteria::new();
        criteria.set_value(
            RESPONSIBLE_KEY,
            Some(FilterValue::Responsible(ResponsibleMode::CurrentUser)),
        );
        let out = apply_criteria(&items(), &criteria, &SessionContext::for_user("ben"));
        assert_eq!(ids(&out), vec!["2"]);

        let anonymous = apply_criteria(&items(), &criteria, &SessionContext::default());
        assert!(anonymous.is_empty());
    }

    #[test]
    fn test_distinct_entity_types() {
        let types = distinct_entity_types(&items());
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Bug", "Story"]);
    }
}
