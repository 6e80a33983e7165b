//! Workflow-constrained kanban boards
//!
//! Work items (activities, meetings, orders, risks, decisions) move through
//! per-type workflows and are shown on status boards. This crate holds the
//! engine behind such a board:
//!
//! - **Workflows** - a [`WorkflowGraph`] per entity type, shared read-only
//!   through a [`WorkflowRegistry`]; the [`StatusTransitionValidator`]
//!   answers which statuses an item may move to.
//! - **Board** - a [`KanbanBoard`] lays out one [`KanbanColumn`] per status
//!   plus a reserved unassigned column, grouping cards by entity type.
//! - **Transitions** - the [`StatusUpdateCoordinator`] validates a move,
//!   saves it through an [`EntityService`] and reports a
//!   [`TransitionOutcome`]. The card moves only after the save succeeded.
//! - **Filters** - a [`FilterToolbar`] composes independent filter
//!   components into [`FilterCriteria`], optionally persisting each
//!   selection.
//! - **Session** - a [`BoardSession`] owns one user's board and handles
//!   drops, filter changes and external notifications one at a time.
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use workboard_kanban::*;
//!
//! let registry = Arc::new(WorkflowRegistry::from_json_file(path)?);
//! let board = KanbanBoard::from_registry(&registry, Some(&task_type), items, config.clone());
//! let mut session = BoardSession::new(
//!     board,
//!     StatusTransitionValidator::new(registry),
//!     service.clone(),
//!     service,
//!     notifier,
//!     Arc::new(SessionContext::for_user("ana")),
//! );
//!
//! let mut toolbar = FilterToolbar::kanban("sprintBoard", &config);
//! toolbar.add_filter_change_listener(session.filter_listener());
//! toolbar.enable_value_persistence(value_store_for(&config)?)?;
//!
//! // later, on the session's own context
//! session.process_pending_events().await;
//! ```

pub mod board;
mod config;
mod coordinator;
mod error;
pub mod filter;
mod services;
mod session;
pub mod types;
pub mod workflow;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use board::{ColumnKey, ColumnView, KanbanBoard, KanbanColumn, TransitionRequestHandler};
pub use config::load_board_config;
pub use coordinator::{StatusUpdateCoordinator, TransitionOutcome, CONFLICT_RELOAD, ILLEGAL_TRANSITION};
pub use error::{KanbanError, PersistenceError, Result};
pub use filter::{
    apply_criteria, value_store_for, ChoiceFilter, FilterComponent, FilterCriteria, FilterToolbar,
    FilterValue, Selection, TextFilter, ValueStore,
};
pub use services::{
    EntityQuery, EntityService, ListenerId, NotificationSink, ProjectChangeRegistry,
    SessionContext, SessionProvider,
};
pub use session::{BoardSession, DropEvent, SessionEvent};
pub use types::{BoardItem, EntityType, ItemKind, Status, WorkItem};
pub use workflow::{StatusTransitionValidator, WorkflowGraph, WorkflowRegistry};

// Configuration lives in its own crate; re-exported for hosts
pub use workboard_config::{BoardConfig, ConfigProvider, UnassignedPlacement};
