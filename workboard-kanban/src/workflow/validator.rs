//! Which statuses an entity may legally move to

use super::graph::WorkflowGraph;
use super::registry::WorkflowRegistry;
use crate::error::{KanbanError, Result};
use crate::types::{BoardItem, EntityType, RoleId, Status, StatusId};
use std::sync::Arc;

/// Pure transition logic over the shared workflow registry.
///
/// `valid_next_statuses` never contains the entity's current status. Staying
/// put is always allowed by `is_transition_allowed` and costs no save.
#[derive(Debug, Clone)]
pub struct StatusTransitionValidator {
    registry: Arc<WorkflowRegistry>,
}

impl StatusTransitionValidator {
    pub fn new(registry: Arc<WorkflowRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<WorkflowRegistry> {
        &self.registry
    }

    /// Statuses `entity` may move to, in display order
    pub fn valid_next_statuses<T: BoardItem>(&self, entity: &T) -> Result<Vec<Status>> {
        self.valid_next_statuses_for_role(entity, None)
    }

    /// Like [`valid_next_statuses`](Self::valid_next_statuses) but honours
    /// role restrictions on edges.
    pub fn valid_next_statuses_for_role<T: BoardItem>(
        &self,
        entity: &T,
        role: Option<&RoleId>,
    ) -> Result<Vec<Status>> {
        let Some(workflow) = self.workflow_for(entity.entity_type())? else {
            // Unconstrained: every catalogued status except the current one
            let mut statuses = self.registry.sorted_statuses();
            if let Some(current) = entity.status() {
                statuses.retain(|s| &s.id != current);
            }
            return Ok(statuses);
        };

        let Some(current) = entity.status() else {
            return self.initial_statuses(entity.entity_type());
        };
        if !workflow.contains(current) {
            tracing::warn!(
                entity = %entity.id(),
                status = %current,
                workflow = %workflow.id(),
                "entity status is outside its workflow, offering initial statuses"
            );
            return self.initial_statuses(entity.entity_type());
        }

        let targets = workflow
            .successors(current)
            .iter()
            .filter(|edge| edge.permits(role))
            .map(|edge| &edge.to);
        Ok(self.registry.resolve(targets))
    }

    /// Whether `entity` may move to `target`. Staying put is always allowed.
    pub fn is_transition_allowed<T: BoardItem>(&self, entity: &T, target: &StatusId) -> Result<bool> {
        self.is_transition_allowed_for_role(entity, target, None)
    }

    pub fn is_transition_allowed_for_role<T: BoardItem>(
        &self,
        entity: &T,
        target: &StatusId,
        role: Option<&RoleId>,
    ) -> Result<bool> {
        if entity.status() == Some(target) {
            return Ok(true);
        }
        Ok(self
            .valid_next_statuses_for_role(entity, role)?
            .iter()
            .any(|s| &s.id == target))
    }

    /// Entry statuses for a new entity of `entity_type`, in display order.
    ///
    /// Flagged or source statuses of the workflow; when the workflow has
    /// neither (every status has an incoming edge), all of its statuses.
    pub fn initial_statuses(&self, entity_type: Option<&EntityType>) -> Result<Vec<Status>> {
        let Some(workflow) = self.workflow_for(entity_type)? else {
            return Ok(self.registry.sorted_statuses());
        };
        let initial = self.registry.resolve(workflow.initial_statuses());
        if initial.is_empty() {
            return Ok(self.registry.resolve(workflow.statuses()));
        }
        Ok(initial)
    }

    /// Status assigned to a freshly created entity: the first entry status
    pub fn initial_status(&self, entity_type: Option<&EntityType>) -> Result<Status> {
        self.initial_statuses(entity_type)?
            .into_iter()
            .next()
            .ok_or_else(|| KanbanError::configuration("no statuses configured"))
    }

    /// Resolve the workflow governing a type, `None` when unconstrained
    fn workflow_for(&self, entity_type: Option<&EntityType>) -> Result<Option<&WorkflowGraph>> {
        let Some(workflow_id) = entity_type.and_then(|t| t.workflow.as_ref()) else {
            return Ok(None);
        };
        let workflow = self.registry.require_workflow(workflow_id)?;
        if workflow.is_empty() {
            return Err(KanbanError::configuration(format!(
                "workflow '{workflow_id}' has no statuses"
            )));
        }
        Ok(Some(workflow))
    }
}
