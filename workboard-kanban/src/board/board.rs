//! The board: one column per status plus the reserved unassigned column

use super::column::{ColumnKey, ColumnLabels, KanbanColumn, TransitionRequestHandler};
use crate::error::{KanbanError, Result};
use crate::types::{sort_for_display, BoardItem, EntityId, EntityType, Status, StatusId};
use crate::workflow::WorkflowRegistry;
use std::collections::HashSet;
use workboard_config::{BoardConfig, UnassignedPlacement};

/// Columns for a set of statuses, filled from a filtered entity list.
///
/// Every entity sits in exactly one column: its status column, or the
/// unassigned column when its status is missing or not on this board.
pub struct KanbanBoard<T: BoardItem> {
    config: BoardConfig,
    statuses: Vec<Status>,
    columns: Vec<KanbanColumn<T>>,
    handler: Option<TransitionRequestHandler<T>>,
    configuration_error: Option<String>,
}

impl<T: BoardItem> KanbanBoard<T> {
    /// Lay out one column per status in display order, empty ones included
    pub fn build(statuses: Vec<Status>, entities: Vec<T>, config: BoardConfig) -> Self {
        let mut seen = HashSet::new();
        let mut statuses: Vec<Status> = statuses
            .into_iter()
            .filter(|s| seen.insert(s.id.clone()))
            .collect();
        sort_for_display(&mut statuses);

        let configuration_error = statuses.is_empty().then(|| {
            tracing::warn!("board has no statuses, showing the unassigned column only");
            "no statuses configured".to_string()
        });

        let labels = ColumnLabels::from(&config);
        let mut columns: Vec<KanbanColumn<T>> = statuses
            .iter()
            .map(|s| KanbanColumn::new(s.clone(), Vec::new(), labels.clone()))
            .collect();
        let unassigned =
            KanbanColumn::unassigned(config.unassigned_label.clone(), Vec::new(), labels);
        match config.unassigned_placement {
            UnassignedPlacement::First => columns.insert(0, unassigned),
            UnassignedPlacement::Last => columns.push(unassigned),
        }

        let mut board = Self {
            config,
            statuses,
            columns,
            handler: None,
            configuration_error,
        };
        board.rebuild(entities);
        board
    }

    /// Build a board for the statuses of `entity_type`'s workflow.
    ///
    /// A configuration problem does not fail the build; the board degrades
    /// to the unassigned column and reports it via
    /// [`configuration_error`](Self::configuration_error).
    pub fn from_registry(
        registry: &WorkflowRegistry,
        entity_type: Option<&EntityType>,
        entities: Vec<T>,
        config: BoardConfig,
    ) -> Self {
        match registry.statuses_for_type(entity_type) {
            Ok(statuses) => Self::build(statuses, entities, config),
            Err(e) => {
                tracing::error!(error = %e, "cannot resolve board statuses");
                let mut board = Self::build(Vec::new(), entities, config);
                board.configuration_error = Some(e.to_string());
                board
            }
        }
    }

    /// Re-partition a freshly filtered entity list. Columns and handlers stay.
    pub fn rebuild(&mut self, entities: Vec<T>) {
        let total = entities.len();
        let mut buckets: Vec<Vec<T>> = self.columns.iter().map(|_| Vec::new()).collect();
        for entity in entities {
            let index = self.index_for_status(entity.status());
            buckets[index].push(entity);
        }
        for (column, bucket) in self.columns.iter_mut().zip(buckets) {
            column.update_entities(bucket);
        }
        tracing::info!(
            columns = self.columns.len(),
            entities = total,
            unassigned = self.unassigned().len(),
            "board rebuilt"
        );
    }

    /// Move an entity whose status change was persisted.
    ///
    /// Only the source and target columns are touched.
    pub fn apply_transition(
        &mut self,
        entity: T,
        from: Option<&StatusId>,
        to: &StatusId,
    ) -> Result<()> {
        let target = self
            .column_index(&ColumnKey::Status(to.clone()))
            .ok_or_else(|| KanbanError::status_not_found(to.as_str()))?;

        let expected = self.index_for_status(from);
        let source = if self.columns[expected].contains(entity.id()) {
            Some(expected)
        } else {
            self.index_of_entity(entity.id())
        };

        if let Some(source) = source {
            self.columns[source].take(entity.id());
        }
        tracing::debug!(entity = %entity.id(), from = ?from, %to, "card moved");
        self.columns[target].put(entity);

        if let Some(source) = source.filter(|s| *s != target) {
            self.columns[source].refresh();
        }
        self.columns[target].refresh();
        Ok(())
    }

    /// Swap in a reloaded entity, moving it if its status changed
    pub fn replace_entity(&mut self, entity: T) {
        let desired = self.index_for_status(entity.status());
        match self.index_of_entity(entity.id()) {
            Some(current) if current == desired => {
                self.columns[current].replace(entity);
                self.columns[current].refresh();
            }
            Some(current) => {
                self.columns[current].take(entity.id());
                self.columns[current].refresh();
                self.columns[desired].put(entity);
                self.columns[desired].refresh();
            }
            None => {
                self.columns[desired].put(entity);
                self.columns[desired].refresh();
            }
        }
    }

    /// Drop an entity from the board
    pub fn remove_entity(&mut self, id: &EntityId) -> Option<T> {
        let index = self.index_of_entity(id)?;
        let removed = self.columns[index].take(id);
        self.columns[index].refresh();
        removed
    }

    /// Install the drop callback on every column
    pub fn set_transition_request_handler(&mut self, handler: TransitionRequestHandler<T>) {
        for column in self.columns.iter_mut() {
            column.set_transition_request_handler(handler.clone());
        }
        self.handler = Some(handler);
    }

    pub fn has_transition_request_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn columns(&self) -> &[KanbanColumn<T>] {
        &self.columns
    }

    pub fn column(&self, key: &ColumnKey) -> Option<&KanbanColumn<T>> {
        self.columns.iter().find(|c| c.key() == key)
    }

    /// Column currently holding `id`
    pub fn column_of(&self, id: &EntityId) -> Option<&KanbanColumn<T>> {
        self.columns.iter().find(|c| c.contains(id))
    }

    pub fn entity(&self, id: &EntityId) -> Option<&T> {
        self.columns
            .iter()
            .flat_map(|c| c.entities())
            .find(|e| e.id() == id)
    }

    pub fn unassigned(&self) -> &KanbanColumn<T> {
        let index = self.unassigned_index();
        &self.columns[index]
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    pub fn status(&self, id: &StatusId) -> Option<&Status> {
        self.statuses.iter().find(|s| &s.id == id)
    }

    pub fn total_count(&self) -> usize {
        self.columns.iter().map(KanbanColumn::len).sum()
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Why the board could not show status columns, if it could not
    pub fn configuration_error(&self) -> Option<&str> {
        self.configuration_error.as_deref()
    }

    fn column_index(&self, key: &ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c.key() == key)
    }

    fn unassigned_index(&self) -> usize {
        match self.config.unassigned_placement {
            UnassignedPlacement::First => 0,
            UnassignedPlacement::Last => self.columns.len() - 1,
        }
    }

    fn index_for_status(&self, status: Option<&StatusId>) -> usize {
        status
            .and_then(|id| self.column_index(&ColumnKey::Status(id.clone())))
            .unwrap_or_else(|| self.unassigned_index())
    }

    fn index_of_entity(&self, id: &EntityId) -> Option<usize> {
        self.columns.iter().position(|c| c.contains(id))
    }
}

impl<T: BoardItem> std::fmt::Debug for KanbanBoard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KanbanBoard")
            .field("columns", &self.columns)
            .field("configuration_error", &self.configuration_error)
            .finish()
    }
}
