//! Shared status catalogue and workflow definitions

use super::graph::WorkflowGraph;
use crate::error::{KanbanError, Result};
use crate::types::{sort_for_display, EntityType, RoleId, Status, StatusId, WorkflowId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Read-only workflow configuration shared by every session.
///
/// Build it once at startup, then wrap it in an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowRegistry {
    #[serde(default)]
    statuses: IndexMap<StatusId, Status>,
    #[serde(default)]
    workflows: HashMap<WorkflowId, WorkflowGraph>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON document
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let registry: Self = serde_json::from_str(&content)?;
        registry.validate()?;
        tracing::info!(
            path = %path.display(),
            statuses = registry.statuses.len(),
            workflows = registry.workflows.len(),
            "loaded workflow registry"
        );
        Ok(registry)
    }

    /// Add or replace a status in the catalogue
    pub fn add_status(&mut self, status: Status) -> &mut Self {
        self.statuses.insert(status.id.clone(), status);
        self
    }

    /// Register a workflow. Every status it references must be catalogued.
    pub fn add_workflow(&mut self, workflow: WorkflowGraph) -> Result<()> {
        self.check_statuses(&workflow)?;
        self.workflows.insert(workflow.id().clone(), workflow);
        Ok(())
    }

    pub fn status(&self, id: &StatusId) -> Option<&Status> {
        self.statuses.get(id)
    }

    pub fn workflow(&self, id: &WorkflowId) -> Option<&WorkflowGraph> {
        self.workflows.get(id)
    }

    /// Resolve a workflow, failing when it is not registered
    pub fn require_workflow(&self, id: &WorkflowId) -> Result<&WorkflowGraph> {
        self.workflows.get(id).ok_or_else(|| KanbanError::WorkflowNotFound {
            id: id.to_string(),
        })
    }

    /// Every catalogued status in display order
    pub fn sorted_statuses(&self) -> Vec<Status> {
        let mut statuses: Vec<Status> = self.statuses.values().cloned().collect();
        sort_for_display(&mut statuses);
        statuses
    }

    /// Resolve ids to catalogued statuses in display order, skipping unknown ids
    pub fn resolve<'a>(&self, ids: impl IntoIterator<Item = &'a StatusId>) -> Vec<Status> {
        let mut statuses: Vec<Status> = ids
            .into_iter()
            .filter_map(|id| self.statuses.get(id).cloned())
            .collect();
        sort_for_display(&mut statuses);
        statuses
    }

    /// Statuses offered for an entity type, in display order.
    ///
    /// An untyped entity or a type without a workflow sees the whole
    /// catalogue. A type whose workflow is not registered fails with
    /// `WorkflowNotFound`; a workflow without statuses is a configuration
    /// error.
    pub fn statuses_for_type(&self, entity_type: Option<&EntityType>) -> Result<Vec<Status>> {
        let Some(workflow_id) = entity_type.and_then(|t| t.workflow.as_ref()) else {
            return Ok(self.sorted_statuses());
        };
        let workflow = self.require_workflow(workflow_id)?;
        if workflow.is_empty() {
            return Err(KanbanError::configuration(format!(
                "workflow '{workflow_id}' has no statuses"
            )));
        }
        Ok(self.resolve(workflow.statuses()))
    }

    /// Build the seed workflow shape used for new projects.
    ///
    /// Statuses are taken in display order; the first is the entry point
    /// and the last is the terminal status. Produces forward edges for the
    /// first three steps (first role), backward edges for those steps except
    /// the first (second role), a restart edge from the last status back to
    /// the first, and cancel edges from every intermediate status to the
    /// last (all roles).
    pub fn sample_workflow(
        id: impl Into<WorkflowId>,
        name: impl Into<String>,
        statuses: &[Status],
        roles: &[RoleId],
    ) -> Result<WorkflowGraph> {
        let mut ordered = statuses.to_vec();
        sort_for_display(&mut ordered);
        let mut graph = WorkflowGraph::new(id, name);
        for status in &ordered {
            graph.add_status(status.id.clone());
        }
        if ordered.len() < 2 {
            return Ok(graph);
        }

        let first = ordered[0].id.clone();
        let last = ordered[ordered.len() - 1].id.clone();
        let forward_roles: Vec<RoleId> = roles.iter().take(1).cloned().collect();
        let backward_roles: Vec<RoleId> = match roles.get(1) {
            Some(role) => vec![role.clone()],
            None => roles.to_vec(),
        };

        for i in 0..(ordered.len() - 1).min(3) {
            let from = &ordered[i].id;
            let to = &ordered[i + 1].id;
            add_if_absent(&mut graph, from, to, forward_roles.clone())?;
            if i > 0 {
                add_if_absent(&mut graph, to, from, backward_roles.clone())?;
            }
        }
        graph.mark_initial(&first)?;
        add_if_absent(&mut graph, &last, &first, roles.to_vec())?;
        for status in &ordered[1..ordered.len() - 1] {
            add_if_absent(&mut graph, &status.id, &last, roles.to_vec())?;
        }
        Ok(graph)
    }

    fn validate(&self) -> Result<()> {
        self.workflows
            .values()
            .try_for_each(|workflow| self.check_statuses(workflow))
    }

    fn check_statuses(&self, workflow: &WorkflowGraph) -> Result<()> {
        match workflow.statuses().find(|id| !self.statuses.contains_key(*id)) {
            Some(missing) => Err(KanbanError::status_not_found(missing.as_str())),
            None => Ok(()),
        }
    }
}

fn add_if_absent(
    graph: &mut WorkflowGraph,
    from: &StatusId,
    to: &StatusId,
    roles: Vec<RoleId>,
) -> Result<()> {
    match graph.add_transition(from.clone(), to.clone(), roles) {
        Ok(()) | Err(KanbanError::DuplicateTransition { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
