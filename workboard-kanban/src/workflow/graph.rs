//! Workflow graph: statuses as arena nodes with outgoing adjacency lists.

use crate::error::{KanbanError, Result};
use crate::types::{RoleId, StatusId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A legal move to another status, optionally restricted to roles.
///
/// An empty role list means the edge is open to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub to: StatusId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleId>,
}

impl TransitionEdge {
    /// Whether `role` may use this edge. `None` ignores restrictions.
    pub fn permits(&self, role: Option<&RoleId>) -> bool {
        match role {
            Some(role) => self.roles.is_empty() || self.roles.contains(role),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StatusNode {
    status: StatusId,
    #[serde(default)]
    initial: bool,
    #[serde(default)]
    outgoing: Vec<TransitionEdge>,
}

/// Directed graph of statuses for one entity type.
///
/// Cycles are allowed. Nodes live in insertion order in an arena, edges
/// refer to statuses by id, so the graph serializes as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WorkflowData", into = "WorkflowData")]
pub struct WorkflowGraph {
    id: WorkflowId,
    name: String,
    nodes: Vec<StatusNode>,
    index: HashMap<StatusId, usize>,
}

/// Serialized form: the arena without the derived index
#[derive(Serialize, Deserialize)]
struct WorkflowData {
    id: WorkflowId,
    name: String,
    #[serde(default)]
    statuses: Vec<StatusNode>,
}

impl From<WorkflowData> for WorkflowGraph {
    fn from(data: WorkflowData) -> Self {
        let mut graph = WorkflowGraph::new(data.id, data.name);
        // Listed nodes first so edge targets cannot jump ahead in the arena
        for node in &data.statuses {
            graph.ensure_node(&node.status);
        }
        for node in data.statuses {
            let idx = graph.ensure_node(&node.status);
            graph.nodes[idx].initial |= node.initial;
            for edge in node.outgoing {
                graph.ensure_node(&edge.to);
                if edge.to != node.status && !graph.nodes[idx].outgoing.iter().any(|e| e.to == edge.to) {
                    graph.nodes[idx].outgoing.push(edge);
                }
            }
        }
        graph
    }
}

impl From<WorkflowGraph> for WorkflowData {
    fn from(graph: WorkflowGraph) -> Self {
        Self {
            id: graph.id,
            name: graph.name,
            statuses: graph.nodes,
        }
    }
}

impl WorkflowGraph {
    pub fn new(id: impl Into<WorkflowId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> &WorkflowId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, status: &StatusId) -> bool {
        self.index.contains_key(status)
    }

    /// Statuses in insertion order
    pub fn statuses(&self) -> impl Iterator<Item = &StatusId> {
        self.nodes.iter().map(|n| &n.status)
    }

    /// Add a status node. Adding an existing status is a no-op.
    pub fn add_status(&mut self, status: impl Into<StatusId>) -> &mut Self {
        let status = status.into();
        self.ensure_node(&status);
        self
    }

    /// Flag a status as an explicit entry point of the workflow
    pub fn mark_initial(&mut self, status: &StatusId) -> Result<()> {
        let idx = self.node_index(status)?;
        self.nodes[idx].initial = true;
        Ok(())
    }

    /// Add a legal transition. Unknown statuses are added as nodes.
    ///
    /// Self-edges and duplicate edges are rejected.
    pub fn add_transition(
        &mut self,
        from: impl Into<StatusId>,
        to: impl Into<StatusId>,
        roles: Vec<RoleId>,
    ) -> Result<()> {
        let from = from.into();
        let to = to.into();
        if from == to {
            return Err(KanbanError::invalid_edge(
                from.as_str(),
                to.as_str(),
                "source and target status must differ",
            ));
        }

        let from_idx = self.ensure_node(&from);
        self.ensure_node(&to);
        if self.nodes[from_idx].outgoing.iter().any(|e| e.to == to) {
            return Err(KanbanError::DuplicateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        tracing::debug!(workflow = %self.id, %from, %to, roles = roles.len(), "added transition");
        self.nodes[from_idx].outgoing.push(TransitionEdge { to, roles });
        Ok(())
    }

    /// Replace the role restriction of an existing edge
    pub fn update_transition_roles(
        &mut self,
        from: &StatusId,
        to: &StatusId,
        roles: Vec<RoleId>,
    ) -> Result<()> {
        let edge = self.edge_mut(from, to)?;
        edge.roles = roles;
        Ok(())
    }

    /// Delete an existing edge
    pub fn remove_transition(&mut self, from: &StatusId, to: &StatusId) -> Result<()> {
        let idx = self.node_index(from)?;
        let outgoing = &mut self.nodes[idx].outgoing;
        let before = outgoing.len();
        outgoing.retain(|e| &e.to != to);
        if outgoing.len() == before {
            return Err(KanbanError::invalid_edge(
                from.as_str(),
                to.as_str(),
                "no such transition",
            ));
        }
        tracing::debug!(workflow = %self.id, %from, %to, "removed transition");
        Ok(())
    }

    /// Whether an edge `from -> to` exists and admits `role`
    pub fn has_transition(&self, from: &StatusId, to: &StatusId, role: Option<&RoleId>) -> bool {
        self.successors(from)
            .iter()
            .any(|e| &e.to == to && e.permits(role))
    }

    /// Outgoing edges of `from`, empty for unknown statuses
    pub fn successors(&self, from: &StatusId) -> &[TransitionEdge] {
        match self.index.get(from) {
            Some(&idx) => &self.nodes[idx].outgoing,
            None => &[],
        }
    }

    /// Statuses with an edge into `to`
    pub fn predecessors(&self, to: &StatusId) -> Vec<&StatusId> {
        self.nodes
            .iter()
            .filter(|n| n.outgoing.iter().any(|e| &e.to == to))
            .map(|n| &n.status)
            .collect()
    }

    /// Entry points of the workflow, in insertion order.
    ///
    /// Explicitly flagged statuses win; otherwise statuses without incoming
    /// edges. Empty when neither exists.
    pub fn initial_statuses(&self) -> Vec<&StatusId> {
        let flagged: Vec<_> = self
            .nodes
            .iter()
            .filter(|n| n.initial)
            .map(|n| &n.status)
            .collect();
        if !flagged.is_empty() {
            return flagged;
        }

        self.nodes
            .iter()
            .filter(|n| self.predecessors(&n.status).is_empty())
            .map(|n| &n.status)
            .collect()
    }

    fn ensure_node(&mut self, status: &StatusId) -> usize {
        if let Some(&idx) = self.index.get(status) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(StatusNode {
            status: status.clone(),
            initial: false,
            outgoing: Vec::new(),
        });
        self.index.insert(status.clone(), idx);
        idx
    }

    fn node_index(&self, status: &StatusId) -> Result<usize> {
        self.index
            .get(status)
            .copied()
            .ok_or_else(|| KanbanError::status_not_found(status.as_str()))
    }

    fn edge_mut(&mut self, from: &StatusId, to: &StatusId) -> Result<&mut TransitionEdge> {
        let idx = self.node_index(from)?;
        self.nodes[idx]
            .outgoing
            .iter_mut()
            .find(|e| &e.to == to)
            .ok_or_else(|| KanbanError::invalid_edge(from.as_str(), to.as_str(), "no such transition"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> StatusId {
        StatusId::from(s)
    }

    fn linear() -> WorkflowGraph {
        let mut graph = WorkflowGraph::new("wf", "Linear");
        graph.add_transition("todo", "doing", vec![]).unwrap();
        graph.add_transition("doing", "done", vec![]).unwrap();
        graph
    }

    #[test]
    fn test_add_transition_adds_nodes() {
        let graph = linear();
        assert_eq!(graph.len(), 3);
        let order: Vec<_> = graph.statuses().map(|s| s.as_str()).collect();
        assert_eq!(order, vec!["todo", "doing", "done"]);
        assert!(graph.has_transition(&sid("todo"), &sid("doing"), None));
        assert!(!graph.has_transition(&sid("todo"), &sid("done"), None));
    }

    #[test]
    fn test_self_and_duplicate_edges_rejected() {
        let mut graph = linear();
        let err = graph.add_transition("todo", "todo", vec![]).unwrap_err();
        assert!(matches!(err, KanbanError::InvalidTransitionEdge { .. }));

        let err = graph.add_transition("todo", "doing", vec![]).unwrap_err();
        assert!(matches!(err, KanbanError::DuplicateTransition { .. }));
        assert_eq!(graph.successors(&sid("todo")).len(), 1);
    }

    #[test]
    fn test_initial_statuses_without_flags_use_sources() {
        let graph = linear();
        assert_eq!(graph.initial_statuses(), vec![&sid("todo")]);
    }

    #[test]
    fn test_flagged_initial_statuses_win() {
        let mut graph = linear();
        graph.add_transition("done", "todo", vec![]).unwrap();
        assert!(graph.initial_statuses().is_empty());

        graph.mark_initial(&sid("todo")).unwrap();
        graph.mark_initial(&sid("doing")).unwrap();
        assert_eq!(graph.initial_statuses(), vec![&sid("todo"), &sid("doing")]);
    }

    #[test]
    fn test_mark_initial_unknown_status() {
        let mut graph = linear();
        assert!(matches!(
            graph.mark_initial(&sid("nope")),
            Err(KanbanError::StatusNotFound { .. })
        ));
    }

    #[test]
    fn test_role_restricted_edges() {
        let mut graph = linear();
        let manager = RoleId::from("manager");
        let dev = RoleId::from("dev");
        graph
            .update_transition_roles(&sid("doing"), &sid("done"), vec![manager.clone()])
            .unwrap();

        assert!(graph.has_transition(&sid("doing"), &sid("done"), Some(&manager)));
        assert!(!graph.has_transition(&sid("doing"), &sid("done"), Some(&dev)));
        assert!(graph.has_transition(&sid("doing"), &sid("done"), None));
        assert!(graph.has_transition(&sid("todo"), &sid("doing"), Some(&dev)));
    }

    #[test]
    fn test_remove_transition() {
        let mut graph = linear();
        graph.remove_transition(&sid("todo"), &sid("doing")).unwrap();
        assert!(graph.successors(&sid("todo")).is_empty());
        assert!(graph.remove_transition(&sid("todo"), &sid("doing")).is_err());
    }

    #[test]
    fn test_predecessors() {
        let mut graph = linear();
        graph.add_transition("todo", "done", vec![]).unwrap();
        assert_eq!(graph.predecessors(&sid("done")), vec![&sid("todo"), &sid("doing")]);
    }

    #[test]
    fn test_serde_round_trip_rebuilds_index() {
        let mut graph = linear();
        graph.mark_initial(&sid("todo")).unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        let restored: WorkflowGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, graph);
        assert!(restored.has_transition(&sid("doing"), &sid("done"), None));
    }

    #[test]
    fn test_serde_round_trip_keeps_status_order() {
        let mut graph = WorkflowGraph::new("wf", "Skipping");
        graph.add_status("a").add_status("b").add_status("c").add_status("d");
        graph.add_transition("a", "d", vec![]).unwrap();
        let before: Vec<_> = graph.statuses().cloned().collect();

        let json = serde_json::to_string(&graph).unwrap();
        let restored: WorkflowGraph = serde_json::from_str(&json).unwrap();

        let after: Vec<_> = restored.statuses().cloned().collect();
        assert_eq!(after, before);
        assert_eq!(restored, graph);
    }
}
