//! One status column of the board

use super::view::ColumnView;
use crate::types::{BoardItem, EntityId, Status, StatusId};
use std::sync::Arc;
use workboard_config::BoardConfig;

/// Identifies a column on a board
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Status(StatusId),
    /// Reserved column for items without a known status
    Unassigned,
}

impl std::fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(id) => write!(f, "{id}"),
            Self::Unassigned => f.write_str("<unassigned>"),
        }
    }
}

/// Called with `(entity, target status)` when a card is dropped on a column
pub type TransitionRequestHandler<T> = Arc<dyn Fn(&T, &Status) + Send + Sync>;

/// Text used when rendering columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabels {
    pub no_type: String,
    pub empty_message: String,
}

impl From<&BoardConfig> for ColumnLabels {
    fn from(config: &BoardConfig) -> Self {
        Self {
            no_type: config.no_type_label.clone(),
            empty_message: config.empty_column_message.clone(),
        }
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self::from(&BoardConfig::default())
    }
}

/// A status column: holds its entities, groups them by type for display and
/// turns drops into transition requests. It never changes an entity.
pub struct KanbanColumn<T: BoardItem> {
    key: ColumnKey,
    status: Option<Status>,
    title: String,
    entities: Vec<T>,
    labels: ColumnLabels,
    handler: Option<TransitionRequestHandler<T>>,
    view: ColumnView,
}

impl<T: BoardItem> KanbanColumn<T> {
    pub fn new(status: Status, entities: Vec<T>, labels: ColumnLabels) -> Self {
        let mut column = Self {
            key: ColumnKey::Status(status.id.clone()),
            title: status.name.clone(),
            status: Some(status),
            entities,
            labels,
            handler: None,
            view: ColumnView::default(),
        };
        column.refresh();
        column
    }

    /// The reserved column for items whose status is missing or unknown
    pub fn unassigned(title: impl Into<String>, entities: Vec<T>, labels: ColumnLabels) -> Self {
        let mut column = Self {
            key: ColumnKey::Unassigned,
            title: title.into(),
            status: None,
            entities,
            labels,
            handler: None,
            view: ColumnView::default(),
        };
        column.refresh();
        column
    }

    pub fn key(&self) -> &ColumnKey {
        &self.key
    }

    /// Status of this column, `None` for the unassigned column
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entities(&self) -> &[T] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.iter().any(|e| e.id() == id)
    }

    pub fn view(&self) -> &ColumnView {
        &self.view
    }

    /// Re-render the view from the current entity list
    pub fn refresh(&mut self) {
        self.view = ColumnView::render(
            &self.title,
            self.status.as_ref().map(|s| s.color.as_str()),
            &self.entities,
            &self.labels.no_type,
            &self.labels.empty_message,
        );
        tracing::trace!(column = %self.key, count = self.view.count, "column refreshed");
    }

    /// Replace the entity list and re-render
    pub fn update_entities(&mut self, entities: Vec<T>) {
        self.entities = entities;
        self.refresh();
    }

    /// Install the drop callback, replacing any previous one
    pub fn set_transition_request_handler(&mut self, handler: TransitionRequestHandler<T>) {
        self.handler = Some(handler);
    }

    /// Handle a card dropped on this column.
    ///
    /// Returns `true` when a transition was requested. Drops onto the
    /// entity's own column and onto the unassigned column are ignored.
    pub fn receive_drop(&self, entity: &T) -> bool {
        let Some(status) = &self.status else {
            tracing::debug!(entity = %entity.id(), "drop on unassigned column ignored");
            return false;
        };
        if entity.status() == Some(&status.id) {
            return false;
        }
        match &self.handler {
            Some(handler) => {
                tracing::debug!(entity = %entity.id(), target = %status.id, "transition requested");
                handler(entity, status);
                true
            }
            None => {
                tracing::debug!(column = %self.key, "drop ignored, no transition handler");
                false
            }
        }
    }

    pub(crate) fn take(&mut self, id: &EntityId) -> Option<T> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    pub(crate) fn put(&mut self, entity: T) {
        self.entities.push(entity);
    }

    /// Swap in a newer copy of an entity already in this column
    pub(crate) fn replace(&mut self, entity: T) -> bool {
        match self.entities.iter_mut().find(|e| e.id() == entity.id()) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }
}

impl<T: BoardItem> std::fmt::Debug for KanbanColumn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KanbanColumn")
            .field("key", &self.key)
            .field("count", &self.entities.len())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityType, ItemKind, WorkItem};
    use std::sync::Mutex;

    fn doing() -> Status {
        Status::new("doing", "In Progress", 1).with_color("#3366FF")
    }

    fn items() -> Vec<WorkItem> {
        let bug = EntityType::new("bug", "Bug");
        let story = EntityType::new("story", "Story");
        vec![
            WorkItem::new(ItemKind::Activity, "A").with_type(bug.clone()).with_status("doing"),
            WorkItem::new(ItemKind::Activity, "B").with_type(story).with_status("doing"),
            WorkItem::new(ItemKind::Activity, "C").with_type(bug).with_status("doing"),
            WorkItem::new(ItemKind::Meeting, "D").with_status("doing"),
        ]
    }

    fn recording_handler() -> (TransitionRequestHandler<WorkItem>, Arc<Mutex<Vec<(String, String)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let handler: TransitionRequestHandler<WorkItem> = Arc::new(move |entity, status| {
            sink.lock()
                .unwrap()
                .push((entity.name.clone(), status.id.to_string()));
        });
        (handler, calls)
    }

    #[test]
    fn test_groups_by_type_with_no_type_fallback() {
        let column = KanbanColumn::new(doing(), items(), ColumnLabels::default());
        let view = column.view();

        assert_eq!(view.title, "In Progress");
        assert_eq!(view.color.as_deref(), Some("#3366FF"));
        assert_eq!(view.count, 4);
        let sections: Vec<_> = view
            .sections
            .iter()
            .map(|s| (s.label.as_str(), s.count))
            .collect();
        assert_eq!(sections, vec![("Bug", 2), ("Story", 1), ("No Type", 1)]);
        assert_eq!(view.sections[0].cards[1].name, "C");
        assert!(view.empty_message.is_none());
    }

    #[test]
    fn test_empty_column_shows_message() {
        let column: KanbanColumn<WorkItem> =
            KanbanColumn::new(doing(), Vec::new(), ColumnLabels::default());
        assert_eq!(column.view().empty_message.as_deref(), Some("No items"));
        assert!(column.view().sections.is_empty());
    }

    #[test]
    fn test_drop_on_own_column_is_noop() {
        let (handler, calls) = recording_handler();
        let mut column = KanbanColumn::new(doing(), items(), ColumnLabels::default());
        column.set_transition_request_handler(handler);

        assert!(!column.receive_drop(&items()[0]));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_drop_requests_transition_without_mutating() {
        let (handler, calls) = recording_handler();
        let mut column = KanbanColumn::new(doing(), Vec::new(), ColumnLabels::default());
        column.set_transition_request_handler(handler);

        let dragged = WorkItem::new(ItemKind::Activity, "E").with_status("todo");
        assert!(column.receive_drop(&dragged));

        assert_eq!(
            *calls.lock().unwrap(),
            vec![("E".to_string(), "doing".to_string())]
        );
        assert!(column.is_empty());
        assert_eq!(dragged.status, Some(StatusId::from("todo")));
    }

    #[test]
    fn test_unassigned_column_refuses_drops() {
        let (handler, calls) = recording_handler();
        let mut column = KanbanColumn::unassigned("Unassigned", Vec::new(), ColumnLabels::default());
        column.set_transition_request_handler(handler);
        assert!(!column.receive_drop(&items()[0]));
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(column.key(), &ColumnKey::Unassigned);
    }

    #[test]
    fn test_update_entities_is_idempotent() {
        let (handler, calls) = recording_handler();
        let mut column = KanbanColumn::new(doing(), Vec::new(), ColumnLabels::default());
        column.set_transition_request_handler(handler.clone());

        column.update_entities(items());
        let first = column.view().clone();
        column.set_transition_request_handler(handler);
        column.update_entities(items()[..].to_vec());
        assert_eq!(column.view().count, first.count);
        assert_eq!(column.view().sections.len(), first.sections.len());

        let dragged = WorkItem::new(ItemKind::Activity, "E");
        column.receive_drop(&dragged);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_update_with_same_list_renders_identically() {
        let list = items();
        let mut column = KanbanColumn::new(doing(), Vec::new(), ColumnLabels::default());
        column.update_entities(list.clone());
        let first = column.view().clone();
        column.update_entities(list);
        assert_eq!(column.view(), &first);
    }
}
