//! Core types for the kanban engine

mod ids;
mod item;
mod status;

pub use ids::{EntityId, EntityTypeId, ProjectId, RoleId, SprintId, StatusId, UserId, WorkflowId};
pub use item::{BoardItem, EntityType, ItemKind, Sprint, WorkItem};
pub use status::Status;
pub(crate) use status::sort_for_display;
