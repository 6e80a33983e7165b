//! Kanban board and its status columns

#[allow(clippy::module_inception)]
mod board;
mod column;
mod view;

pub use board::KanbanBoard;
pub use column::{ColumnKey, ColumnLabels, KanbanColumn, TransitionRequestHandler};
pub use view::{CardView, ColumnView, TypeSection};
