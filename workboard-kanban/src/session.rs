//! Per-user board session: routes drops, filter changes and external
//! notifications to the board one event at a time.

use crate::board::KanbanBoard;
use crate::coordinator::{StatusUpdateCoordinator, TransitionOutcome};
use crate::filter::{CriteriaListener, FilterCriteria};
use crate::services::{
    EntityQuery, EntityService, ListenerId, NotificationSink, ProjectChangeRegistry,
    SessionProvider,
};
use crate::types::{BoardItem, EntityId, ProjectId, StatusId};
use crate::workflow::StatusTransitionValidator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use workboard_common::Pretty;

/// A card dropped on a status column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub entity_id: EntityId,
    pub target: StatusId,
}

/// Work for the session, possibly raised from another thread
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TransitionRequested(DropEvent),
    FilterChanged(FilterCriteria),
    /// An entity was changed outside this session
    ExternalChange(EntityId),
    ProjectChanged(ProjectId),
}

/// Owns one user's board and everything that mutates it.
///
/// All mutation goes through `&mut self`, so drops and filter changes are
/// handled strictly one after another. Other threads talk to the session
/// through [`event_sender`](Self::event_sender); queued events run when the
/// owner calls [`process_pending_events`](Self::process_pending_events).
pub struct BoardSession<T: BoardItem> {
    board: KanbanBoard<T>,
    coordinator: StatusUpdateCoordinator<T>,
    service: Arc<dyn EntityService<T>>,
    query: Arc<dyn EntityQuery<T>>,
    notifier: Arc<dyn NotificationSink>,
    session: Arc<dyn SessionProvider>,
    criteria: FilterCriteria,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<T: BoardItem> BoardSession<T> {
    pub fn new(
        mut board: KanbanBoard<T>,
        validator: StatusTransitionValidator,
        service: Arc<dyn EntityService<T>>,
        query: Arc<dyn EntityQuery<T>>,
        notifier: Arc<dyn NotificationSink>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let tx = events_tx.clone();
        board.set_transition_request_handler(Arc::new(move |entity: &T, status| {
            let event = SessionEvent::TransitionRequested(DropEvent {
                entity_id: entity.id().clone(),
                target: status.id.clone(),
            });
            if tx.send(event).is_err() {
                tracing::warn!("board session closed, drop discarded");
            }
        }));

        if let Some(message) = board.configuration_error() {
            notifier.show_error(&format!("Board configuration error: {message}"));
        }

        let coordinator = StatusUpdateCoordinator::new(validator, service.clone())
            .with_role(session.current().role);

        Self {
            board,
            coordinator,
            service,
            query,
            notifier,
            session,
            criteria: FilterCriteria::new(),
            events_tx,
            events_rx,
        }
    }

    /// Replace the clock used for completion dates
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.coordinator = self.coordinator.with_clock(clock);
        self
    }

    pub fn board(&self) -> &KanbanBoard<T> {
        &self.board
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Sender for events raised outside the session's own context
    pub fn event_sender(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.events_tx.clone()
    }

    /// Toolbar listener that queues a reload with the new criteria
    pub fn filter_listener(&self) -> CriteriaListener {
        let tx = self.events_tx.clone();
        Box::new(move |criteria: &FilterCriteria| {
            tx.send(SessionEvent::FilterChanged(criteria.clone()))
                .map_err(|_| anyhow::anyhow!("board session closed"))
        })
    }

    /// Queue a reload whenever the active project changes
    pub fn attach_project_changes(&self, registry: &mut ProjectChangeRegistry) -> ListenerId {
        let tx = self.events_tx.clone();
        registry.register(move |project| {
            if tx.send(SessionEvent::ProjectChanged(project.clone())).is_err() {
                tracing::warn!(%project, "board session closed, project change discarded");
            }
        })
    }

    /// Re-query with the current criteria and rebuild the board.
    ///
    /// Returns `false` when the query failed; the board keeps its content.
    pub async fn reload(&mut self) -> bool {
        let context = self.session.current();
        match self.query.find(&self.criteria, &context).await {
            Ok(items) => {
                self.board.rebuild(items);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "board reload failed");
                self.notifier.show_exception("Failed to load board items", &e);
                false
            }
        }
    }

    /// Set new criteria and reload
    pub async fn apply_filter(&mut self, criteria: FilterCriteria) -> bool {
        tracing::debug!(criteria = %Pretty(&criteria), "filter changed");
        self.criteria = criteria;
        self.reload().await
    }

    /// Validate, persist and apply one drop. The card moves only after the
    /// save succeeded.
    pub async fn handle_drop(&mut self, event: DropEvent) -> TransitionOutcome<T> {
        let Some(entity) = self.board.entity(&event.entity_id).cloned() else {
            tracing::warn!(entity = %event.entity_id, "dropped entity is not on the board");
            return TransitionOutcome::Missing {
                reason: "entity is no longer on the board".to_string(),
            };
        };

        let outcome = self
            .coordinator
            .attempt_transition(&entity, &event.target)
            .await;

        match &outcome {
            TransitionOutcome::Applied { entity: saved, from, to } => {
                if let Err(e) = self.board.apply_transition(saved.clone(), from.as_ref(), &to.id) {
                    tracing::warn!(error = %e, "target column missing, reloading board");
                    self.reload().await;
                }
            }
            TransitionOutcome::Unchanged => {}
            TransitionOutcome::Rejected { reason } => {
                self.notifier
                    .show_warning(&format!("Cannot move \"{}\": {reason}", entity.name()));
            }
            TransitionOutcome::Conflict { reason } => {
                self.notifier.show_error(&format!(
                    "\"{}\" was changed by someone else: {reason}",
                    entity.name()
                ));
                self.refresh_entity(entity.id()).await;
            }
            TransitionOutcome::Missing { reason } => {
                self.notifier
                    .show_error(&format!("\"{}\" no longer exists: {reason}", entity.name()));
                self.board.remove_entity(entity.id());
            }
            TransitionOutcome::Failed { reason } => {
                self.notifier
                    .show_error(&format!("Saving \"{}\" failed: {reason}", entity.name()));
            }
        }
        outcome
    }

    /// Reload one entity from the store into its current column
    pub async fn refresh_entity(&mut self, id: &EntityId) {
        match self.service.get_by_id(id).await {
            Ok(Some(entity)) => self.board.replace_entity(entity),
            Ok(None) => {
                self.board.remove_entity(id);
            }
            Err(e) => {
                tracing::error!(entity = %id, error = %e, "entity reload failed");
                self.notifier.show_exception("Failed to reload item", &e);
            }
        }
    }

    /// Handle one event
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TransitionRequested(drop) => {
                self.handle_drop(drop).await;
            }
            SessionEvent::FilterChanged(criteria) => {
                self.apply_filter(criteria).await;
            }
            SessionEvent::ExternalChange(id) => {
                tracing::debug!(entity = %id, "external change, reloading board");
                self.reload().await;
            }
            SessionEvent::ProjectChanged(project) => {
                tracing::info!(%project, "active project changed, reloading board");
                self.reload().await;
            }
        }
    }

    /// Handle every queued event in arrival order. Returns how many ran.
    pub async fn process_pending_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await;
            processed += 1;
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ColumnKey;
    use crate::error::PersistenceError;
    use crate::filter::{FilterValue, TEXT_KEY};
    use crate::services::SessionContext;
    use crate::test_support::{
        fixed_today, linear_registry, task_item, InMemoryEntityService, Notice, RecordingNotifier,
    };
    use crate::types::WorkItem;
    use workboard_config::BoardConfig;

    struct Harness {
        service: Arc<InMemoryEntityService<WorkItem>>,
        notifier: Arc<RecordingNotifier>,
        session: BoardSession<WorkItem>,
    }

    async fn harness(items: Vec<WorkItem>) -> Harness {
        let service = Arc::new(InMemoryEntityService::new());
        for item in items {
            service.insert(item).await;
        }
        let registry = Arc::new(linear_registry());
        let notifier = Arc::new(RecordingNotifier::new());
        let board = KanbanBoard::build(
            registry.sorted_statuses(),
            service.all().await,
            BoardConfig::default(),
        );
        let session = BoardSession::new(
            board,
            StatusTransitionValidator::new(registry),
            service.clone(),
            service.clone(),
            notifier.clone(),
            Arc::new(SessionContext::for_user("ana")),
        )
        .with_clock(fixed_today);
        Harness {
            service,
            notifier,
            session,
        }
    }

    fn column_title(session: &BoardSession<WorkItem>, id: &EntityId) -> String {
        session.board().column_of(id).unwrap().title().to_string()
    }

    #[tokio::test]
    async fn test_rejected_drop_warns_and_keeps_card() {
        let item = task_item("Spec review", "todo");
        let id = item.id.clone();
        let mut h = harness(vec![item]).await;

        let outcome = h
            .session
            .handle_drop(DropEvent {
                entity_id: id.clone(),
                target: "done".into(),
            })
            .await;

        assert!(!outcome.applied());
        assert_eq!(column_title(&h.session, &id), "To Do");
        assert_eq!(h.service.save_count(), 0);
        assert!(h.notifier.warnings()[0].contains("illegal transition"));
    }

    #[tokio::test]
    async fn test_column_drop_flows_through_event_queue() {
        let item = task_item("Spec review", "todo");
        let id = item.id.clone();
        let mut h = harness(vec![item]).await;

        let entity = h.session.board().entity(&id).unwrap().clone();
        let requested = h
            .session
            .board()
            .column(&ColumnKey::Status("doing".into()))
            .unwrap()
            .receive_drop(&entity);
        assert!(requested);
        assert_eq!(column_title(&h.session, &id), "To Do");

        assert_eq!(h.session.process_pending_events().await, 1);
        assert_eq!(column_title(&h.session, &id), "In Progress");
        assert_eq!(h.session.board().entity(&id).unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_conflict_reloads_entity_from_store() {
        let item = task_item("Spec review", "todo");
        let id = item.id.clone();
        let mut h = harness(vec![item.clone()]).await;

        let mut elsewhere = item;
        elsewhere.name = "Spec review (edited)".into();
        h.service.save(elsewhere).await.unwrap();

        let outcome = h
            .session
            .handle_drop(DropEvent {
                entity_id: id.clone(),
                target: "doing".into(),
            })
            .await;

        assert!(matches!(outcome, TransitionOutcome::Conflict { .. }));
        assert_eq!(h.notifier.errors().len(), 1);
        let reloaded = h.session.board().entity(&id).unwrap();
        assert_eq!(reloaded.name, "Spec review (edited)");
        assert_eq!(column_title(&h.session, &id), "To Do");
    }

    #[tokio::test]
    async fn test_missing_entity_is_removed() {
        let item = task_item("Spec review", "todo");
        let id = item.id.clone();
        let mut h = harness(vec![item]).await;
        h.service.delete(&id).await.unwrap();

        let outcome = h
            .session
            .handle_drop(DropEvent {
                entity_id: id.clone(),
                target: "doing".into(),
            })
            .await;

        assert!(matches!(outcome, TransitionOutcome::Missing { .. }));
        assert!(h.session.board().entity(&id).is_none());
        assert_eq!(h.session.board().total_count(), 0);
    }

    #[tokio::test]
    async fn test_filter_change_reloads_with_criteria() {
        let mut h = harness(vec![
            task_item("Spec review", "todo"),
            task_item("Release notes", "doing"),
        ])
        .await;

        let mut listener = h.session.filter_listener();
        let mut criteria = FilterCriteria::new();
        criteria.set_value(TEXT_KEY, Some(FilterValue::Text("release".into())));
        listener(&criteria).unwrap();

        h.session.process_pending_events().await;
        assert_eq!(h.session.board().total_count(), 1);
        assert_eq!(h.session.criteria(), &criteria);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_board_and_reports() {
        let mut h = harness(vec![task_item("Spec review", "todo")]).await;
        h.service.fail_next_find(PersistenceError::other("database offline"));

        assert!(!h.session.reload().await);
        assert_eq!(h.session.board().total_count(), 1);
        assert!(matches!(
            h.notifier.notices().last(),
            Some(Notice::Exception { error, .. }) if error.contains("database offline")
        ));
    }

    #[tokio::test]
    async fn test_project_change_and_external_change_reload() {
        let mut h = harness(Vec::new()).await;
        let mut registry = ProjectChangeRegistry::new();
        h.session.attach_project_changes(&mut registry);

        let added = h.service.insert(task_item("Late arrival", "doing")).await;
        registry.notify(&ProjectId::from("apollo"));
        assert_eq!(h.session.process_pending_events().await, 1);
        assert!(h.session.board().entity(&added.id).is_some());

        let another = h.service.insert(task_item("Pushed from elsewhere", "todo")).await;
        let tx = h.session.event_sender();
        std::thread::spawn(move || tx.send(SessionEvent::ExternalChange(another.id)).unwrap())
            .join()
            .unwrap();
        h.session.process_pending_events().await;
        assert_eq!(h.session.board().total_count(), 2);
    }

    #[tokio::test]
    async fn test_configuration_error_is_reported() {
        let notifier = Arc::new(RecordingNotifier::new());
        let service = Arc::new(InMemoryEntityService::<WorkItem>::new());
        let board = KanbanBoard::build(Vec::new(), Vec::new(), BoardConfig::default());
        let _session = BoardSession::new(
            board,
            StatusTransitionValidator::new(Arc::new(linear_registry())),
            service.clone(),
            service,
            notifier.clone(),
            Arc::new(SessionContext::default()),
        );
        assert!(notifier.errors()[0].contains("no statuses configured"));
    }
}
