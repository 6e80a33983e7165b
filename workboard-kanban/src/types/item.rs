//! Work items shown on the board

use super::ids::{EntityId, EntityTypeId, SprintId, StatusId, UserId, WorkflowId};
use super::status::Status;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Subtype of a work item. Binds the item to a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub id: EntityTypeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowId>,
}

impl EntityType {
    pub fn new(id: impl Into<EntityTypeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            workflow: None,
        }
    }

    pub fn with_workflow(mut self, workflow: impl Into<WorkflowId>) -> Self {
        self.workflow = Some(workflow.into());
        self
    }
}

/// A planning period. Sprints sort newest first by start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub name: String,
    pub start_date: NaiveDate,
}

impl Sprint {
    pub fn new(id: impl Into<SprintId>, name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
        }
    }
}

/// The kinds of item a board can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Activity,
    Meeting,
    Order,
    Risk,
    Decision,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Meeting => "meeting",
            Self::Order => "order",
            Self::Risk => "risk",
            Self::Decision => "decision",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities the board needs from anything it displays.
///
/// The board never knows the concrete type. Anything that has an id, a
/// name, a type, a status and an assignee can be placed on a column.
pub trait BoardItem: Clone + Send + Sync + 'static {
    fn id(&self) -> &EntityId;
    fn name(&self) -> &str;
    fn kind(&self) -> ItemKind;
    fn entity_type(&self) -> Option<&EntityType>;
    fn status(&self) -> Option<&StatusId>;
    fn assignee(&self) -> Option<&UserId>;
    fn sprint(&self) -> Option<&SprintId>;

    /// Move the item into `status` and apply the side effects of entering it.
    fn apply_status(&mut self, status: &Status, today: NaiveDate);

    /// Workflow governing this item, taken from its type
    fn workflow(&self) -> Option<&WorkflowId> {
        self.entity_type().and_then(|t| t.workflow.as_ref())
    }

    /// Optimistic-concurrency version. Zero when the store does not track one.
    fn version(&self) -> u64 {
        0
    }

    fn set_version(&mut self, _version: u64) {}
}

/// A concrete work item: activity, meeting, order, risk or decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: EntityId,
    pub kind: ItemKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint: Option<SprintId>,
    /// Position within the sprint backlog
    #[serde(default)]
    pub order_index: u32,
    /// Progress percentage, 0..=100
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl WorkItem {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            name: name.into(),
            entity_type: None,
            status: None,
            assignee: None,
            sprint: None,
            order_index: 0,
            progress: 0,
            completion_date: None,
            due_date: None,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn with_status(mut self, status: impl Into<StatusId>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_assignee(mut self, user: impl Into<UserId>) -> Self {
        self.assignee = Some(user.into());
        self
    }

    pub fn with_sprint(mut self, sprint: impl Into<SprintId>) -> Self {
        self.sprint = Some(sprint.into());
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Set progress, clamped to 100. Reaching 100 stamps the completion date.
    pub fn set_progress(&mut self, progress: u8, today: NaiveDate) {
        self.progress = progress.min(100);
        if self.progress == 100 && self.completion_date.is_none() {
            self.completion_date = Some(today);
        }
    }

    pub fn is_completed(&self) -> bool {
        self.progress >= 100 || self.completion_date.is_some()
    }

    /// Like [`Self::is_completed`], but also true while `status` is final
    pub fn is_completed_in(&self, status: &Status) -> bool {
        status.is_final || self.is_completed()
    }

    /// Past its due date and not completed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => !self.is_completed() && due < today,
            None => false,
        }
    }
}

impl BoardItem for WorkItem {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ItemKind {
        self.kind
    }

    fn entity_type(&self) -> Option<&EntityType> {
        self.entity_type.as_ref()
    }

    fn status(&self) -> Option<&StatusId> {
        self.status.as_ref()
    }

    fn assignee(&self) -> Option<&UserId> {
        self.assignee.as_ref()
    }

    fn sprint(&self) -> Option<&SprintId> {
        self.sprint.as_ref()
    }

    fn apply_status(&mut self, status: &Status, today: NaiveDate) {
        self.status = Some(status.id.clone());
        if status.is_final {
            self.set_progress(100, today);
        }
        self.updated_at = Utc::now();
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
