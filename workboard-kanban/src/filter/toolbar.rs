//! Composes filter components into one criteria stream

use super::component::{FilterComponent, FilterContext, Selection};
use super::components::{ChoiceFilter, TextFilter};
use super::criteria::{FilterCriteria, FilterValue};
use super::storage::ValueStore;
use crate::error::{KanbanError, Result};
use std::cell::RefCell;
use std::rc::Rc;
use workboard_common::Pretty;
use workboard_config::BoardConfig;

/// Receives the full criteria after every change
pub type CriteriaListener = Box<dyn FnMut(&FilterCriteria) -> anyhow::Result<()>>;

#[derive(Default)]
struct ToolbarState {
    criteria: FilterCriteria,
    listeners: Vec<CriteriaListener>,
    /// Suppresses per-component notifications while clearing
    batching: bool,
}

impl ToolbarState {
    /// Write one component value, then notify unless batching
    fn on_component_change(state: &Rc<RefCell<Self>>, key: &str, value: Option<&FilterValue>) {
        let batching = {
            let mut inner = state.borrow_mut();
            inner.criteria.set_value(key, value.cloned());
            inner.batching
        };
        if !batching {
            Self::notify(state);
        }
    }

    /// Call every listener with a snapshot of the criteria.
    ///
    /// Listeners are taken out of the cell while they run, so a listener may
    /// hold its own handle to the toolbar.
    fn notify(state: &Rc<RefCell<Self>>) {
        let (snapshot, mut listeners) = {
            let mut inner = state.borrow_mut();
            (inner.criteria.clone(), std::mem::take(&mut inner.listeners))
        };
        tracing::debug!(listeners = listeners.len(), "notifying filter listeners");
        for listener in listeners.iter_mut() {
            if let Err(e) = listener(&snapshot) {
                tracing::error!(error = %e, "filter listener failed");
            }
        }
        let mut inner = state.borrow_mut();
        listeners.append(&mut inner.listeners);
        inner.listeners = listeners;
    }
}

/// A row of independent filters feeding one [`FilterCriteria`].
///
/// ```ignore
/// let mut toolbar = FilterToolbar::new("sprintBoard");
/// toolbar.add_filter_component(Box::new(ChoiceFilter::sprint()));
/// toolbar.add_filter_component(Box::new(ChoiceFilter::entity_type()));
/// toolbar.add_filter_change_listener(Box::new(move |criteria| {
///     tx.send(SessionEvent::FilterChanged(criteria.clone()))?;
///     Ok(())
/// }));
/// ```
pub struct FilterToolbar {
    id: String,
    storage_prefix: String,
    components: Vec<Box<dyn FilterComponent>>,
    state: Rc<RefCell<ToolbarState>>,
}

impl FilterToolbar {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            storage_prefix: String::new(),
            components: Vec::new(),
            state: Rc::new(RefCell::new(ToolbarState::default())),
        }
    }

    /// Sprint, type and responsible filters plus text search, keyed with
    /// the configured storage prefix.
    pub fn kanban(id: impl Into<String>, config: &BoardConfig) -> Self {
        let mut toolbar = Self::new(id).with_storage_prefix(config.storage_prefix.clone());
        toolbar
            .add_filter_component(Box::new(ChoiceFilter::sprint()))
            .add_filter_component(Box::new(ChoiceFilter::entity_type()))
            .add_filter_component(Box::new(ChoiceFilter::responsible()))
            .add_filter_component(Box::new(TextFilter::new()));
        toolbar
    }

    /// Namespace for persisted values, e.g. per page
    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Base key for persisted component values
    pub fn storage_id(&self) -> Result<String> {
        if self.id.trim().is_empty() {
            return Err(KanbanError::configuration(
                "filter toolbar needs an id before value persistence can be enabled",
            ));
        }
        Ok(format!("filterToolbar_{}{}", self.storage_prefix, self.id))
    }

    /// Add a component; its current value is written into the criteria.
    pub fn add_filter_component(&mut self, mut component: Box<dyn FilterComponent>) -> &mut Self {
        let key = component.key().to_string();
        self.state
            .borrow_mut()
            .criteria
            .set_value(key.clone(), component.value());

        let state = Rc::clone(&self.state);
        let listener_key = key.clone();
        component.add_change_listener(Box::new(move |value| {
            ToolbarState::on_component_change(&state, &listener_key, value);
        }));

        tracing::debug!(%key, "added filter component");
        self.components.push(component);
        self
    }

    pub fn add_filter_change_listener(&mut self, listener: CriteriaListener) -> &mut Self {
        self.state.borrow_mut().listeners.push(listener);
        self
    }

    /// Reset every component to its own default, then notify once.
    ///
    /// The defaults just applied stay in the criteria.
    pub fn clear_filters(&mut self) {
        tracing::debug!(toolbar = %self.id, "clearing filters");
        self.state.borrow_mut().batching = true;
        for component in self.components.iter_mut() {
            component.clear_filter();
        }
        self.state.borrow_mut().batching = false;
        ToolbarState::notify(&self.state);
    }

    pub fn current_criteria(&self) -> FilterCriteria {
        self.state.borrow().criteria.clone()
    }

    pub fn component(&self, key: &str) -> Option<&dyn FilterComponent> {
        self.components
            .iter()
            .find(|c| c.key() == key)
            .map(|c| c.as_ref())
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn FilterComponent> {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Select a value on one component, as a user would
    pub fn select(&mut self, key: &str, selection: Selection<FilterValue>) -> Result<bool> {
        let component = self
            .components
            .iter_mut()
            .find(|c| c.key() == key)
            .ok_or_else(|| KanbanError::UnknownFilter {
                key: key.to_string(),
            })?;
        Ok(component.select(selection))
    }

    /// Hand current options (types, sprints, users) to every component
    pub fn refresh_options(&mut self, context: &FilterContext<'_>) {
        for component in self.components.iter_mut() {
            component.refresh_options(context);
        }
    }

    /// Persist component values under this toolbar's storage id and restore
    /// whatever was saved last time.
    pub fn enable_value_persistence(&mut self, store: Rc<dyn ValueStore>) -> Result<()> {
        let storage_id = self.storage_id()?;
        for component in self.components.iter_mut() {
            component.enable_value_persistence(&storage_id, Rc::clone(&store));
        }
        tracing::debug!(
            %storage_id,
            criteria = %Pretty(&self.current_criteria()),
            "filter value persistence enabled"
        );
        Ok(())
    }
}

impl std::fmt::Debug for FilterToolbar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterToolbar")
            .field("id", &self.id)
            .field("storage_prefix", &self.storage_prefix)
            .field(
                "components",
                &self.components.iter().map(|c| c.key()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
