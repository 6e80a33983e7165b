//! Collaborators the board consumes but does not implement

use crate::error::PersistenceError;
use crate::filter::FilterCriteria;
use crate::types::{BoardItem, EntityId, ProjectId, RoleId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Entity persistence boundary.
///
/// `save` returns the stored entity (new version, server-side fields) or
/// the reason it refused.
#[async_trait]
pub trait EntityService<T: BoardItem>: Send + Sync {
    async fn save(&self, entity: T) -> std::result::Result<T, PersistenceError>;

    async fn get_by_id(&self, id: &EntityId) -> std::result::Result<Option<T>, PersistenceError>;

    async fn delete(&self, id: &EntityId) -> std::result::Result<(), PersistenceError>;
}

/// Returns the entities matching the toolbar criteria
#[async_trait]
pub trait EntityQuery<T: BoardItem>: Send + Sync {
    async fn find(
        &self,
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> std::result::Result<Vec<T>, PersistenceError>;
}

/// User-facing notifications
pub trait NotificationSink: Send + Sync {
    fn show_warning(&self, text: &str);

    fn show_error(&self, text: &str);

    fn show_exception(&self, text: &str, error: &(dyn std::error::Error + 'static));

    /// Ask the user to confirm; `on_confirm` runs only on confirmation.
    fn show_confirmation_dialog(&self, text: &str, on_confirm: Box<dyn FnOnce() + Send>);
}

/// Who is looking at the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user: Option<UserId>,
    pub project: Option<ProjectId>,
    pub role: Option<RoleId>,
}

impl SessionContext {
    pub fn for_user(user: impl Into<UserId>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }

    pub fn with_project(mut self, project: impl Into<ProjectId>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Supplies the active session context
pub trait SessionProvider: Send + Sync {
    fn current(&self) -> SessionContext;
}

impl SessionProvider for SessionContext {
    fn current(&self) -> SessionContext {
        self.clone()
    }
}

/// Handle returned by [`ProjectChangeRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ProjectListener = Box<dyn FnMut(&ProjectId) + Send>;

/// Per-session registry of "active project changed" listeners.
///
/// One registry per user session, handed to components at construction.
#[derive(Default)]
pub struct ProjectChangeRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, ProjectListener)>,
}

impl ProjectChangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: impl FnMut(&ProjectId) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when the listener was not registered
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, project: &ProjectId) {
        tracing::debug!(%project, listeners = self.listeners.len(), "project changed");
        for (_, listener) in self.listeners.iter_mut() {
            listener(project);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ProjectChangeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectChangeRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
