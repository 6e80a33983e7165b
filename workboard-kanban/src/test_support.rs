//! In-memory collaborators and fixtures for tests.
//!
//! Compiled for this crate's own tests and for anyone enabling the
//! `test-support` feature.

use crate::error::PersistenceError;
use crate::filter::{apply_criteria, FilterCriteria};
use crate::services::{EntityQuery, EntityService, NotificationSink, SessionContext};
use crate::types::{BoardItem, EntityId, EntityType, ItemKind, Status, WorkItem};
use crate::workflow::{WorkflowGraph, WorkflowRegistry};
use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;

/// Entity store with optimistic versioning and injectable failures.
///
/// `save` refuses unknown ids (`NotFound`) and stale versions
/// (`Concurrency`). Queued failures are returned before any check.
pub struct InMemoryEntityService<T: BoardItem> {
    items: RwLock<IndexMap<EntityId, T>>,
    save_failures: Mutex<VecDeque<PersistenceError>>,
    find_failures: Mutex<VecDeque<PersistenceError>>,
    saves: AtomicUsize,
}

impl<T: BoardItem> Default for InMemoryEntityService<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(IndexMap::new()),
            save_failures: Mutex::new(VecDeque::new()),
            find_failures: Mutex::new(VecDeque::new()),
            saves: AtomicUsize::new(0),
        }
    }
}

impl<T: BoardItem> InMemoryEntityService<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity as-is, bypassing checks
    pub async fn insert(&self, entity: T) -> T {
        self.items
            .write()
            .await
            .insert(entity.id().clone(), entity.clone());
        entity
    }

    /// Stored entities in insertion order
    pub async fn all(&self) -> Vec<T> {
        self.items.read().await.values().cloned().collect()
    }

    /// Make the next `save` fail with `error`
    pub fn fail_next_save(&self, error: PersistenceError) {
        self.save_failures.lock().unwrap().push_back(error);
    }

    /// Make the next `find` fail with `error`
    pub fn fail_next_find(&self, error: PersistenceError) {
        self.find_failures.lock().unwrap().push_back(error);
    }

    /// Number of `save` calls, failed ones included
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: BoardItem> EntityService<T> for InMemoryEntityService<T> {
    async fn save(&self, mut entity: T) -> Result<T, PersistenceError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let queued = self.save_failures.lock().unwrap().pop_front();
        if let Some(error) = queued {
            return Err(error);
        }

        let mut items = self.items.write().await;
        let Some(stored) = items.get(entity.id()) else {
            return Err(PersistenceError::NotFound {
                id: entity.id().to_string(),
            });
        };
        if stored.version() != entity.version() {
            return Err(PersistenceError::Concurrency {
                id: entity.id().to_string(),
            });
        }
        entity.set_version(entity.version() + 1);
        items.insert(entity.id().clone(), entity.clone());
        Ok(entity)
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<Option<T>, PersistenceError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &EntityId) -> Result<(), PersistenceError> {
        match self.items.write().await.shift_remove(id) {
            Some(_) => Ok(()),
            None => Err(PersistenceError::NotFound { id: id.to_string() }),
        }
    }
}

#[async_trait]
impl<T: BoardItem> EntityQuery<T> for InMemoryEntityService<T> {
    async fn find(
        &self,
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> Result<Vec<T>, PersistenceError> {
        let queued = self.find_failures.lock().unwrap().pop_front();
        if let Some(error) = queued {
            return Err(error);
        }
        let items: Vec<T> = self.items.read().await.values().cloned().collect();
        Ok(apply_criteria(&items, criteria, session))
    }
}

/// A notification the board raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Error(String),
    Exception { text: String, error: String },
    Confirmation(String),
}

/// Records notifications; confirms dialogs unless told otherwise
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
    confirm: AtomicBool,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            confirm: AtomicBool::new(true),
        }
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_confirm(&self, confirm: bool) {
        self.confirm.store(confirm, Ordering::SeqCst);
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Warning(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Error(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn show_warning(&self, text: &str) {
        self.notices.lock().unwrap().push(Notice::Warning(text.to_string()));
    }

    fn show_error(&self, text: &str) {
        self.notices.lock().unwrap().push(Notice::Error(text.to_string()));
    }

    fn show_exception(&self, text: &str, error: &(dyn std::error::Error + 'static)) {
        self.notices.lock().unwrap().push(Notice::Exception {
            text: text.to_string(),
            error: error.to_string(),
        });
    }

    fn show_confirmation_dialog(&self, text: &str, on_confirm: Box<dyn FnOnce() + Send>) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::Confirmation(text.to_string()));
        if self.confirm.load(Ordering::SeqCst) {
            on_confirm();
        }
    }
}

/// The "today" used by fixtures
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap_or_default()
}

/// To Do -> In Progress -> Done (final), workflow id `linear`
pub fn linear_registry() -> WorkflowRegistry {
    let mut registry = WorkflowRegistry::new();
    registry
        .add_status(Status::new("todo", "To Do", 0).with_color("#9E9E9E"))
        .add_status(Status::new("doing", "In Progress", 1).with_color("#2196F3"))
        .add_status(Status::new("done", "Done", 2).final_status().with_color("#4CAF50"));

    let mut graph = WorkflowGraph::new("linear", "Linear");
    for (from, to) in [("todo", "doing"), ("doing", "done")] {
        if let Err(e) = graph.add_transition(from, to, Vec::new()) {
            panic!("fixture workflow is invalid: {e}");
        }
    }
    if let Err(e) = registry.add_workflow(graph) {
        panic!("fixture workflow is invalid: {e}");
    }
    registry
}

/// Entity type bound to the `linear` workflow
pub fn task_type() -> EntityType {
    EntityType::new("task", "Task").with_workflow("linear")
}

/// An activity of type [`task_type`] in `status`
pub fn task_item(name: &str, status: &str) -> WorkItem {
    WorkItem::new(ItemKind::Activity, name)
        .with_type(task_type())
        .with_status(status)
}
