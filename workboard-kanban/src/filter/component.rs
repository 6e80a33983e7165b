//! The filter component contract and shared plumbing

use super::criteria::FilterValue;
use super::storage::ValueStore;
use crate::types::{EntityType, Sprint, UserId};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// An option in a filter: the "all" sentinel or a real value.
///
/// The sentinel is its own variant, so it never compares equal to a real
/// option even when both carry the same label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T> {
    All,
    Item(T),
}

impl<T> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Item(value) => Some(value),
        }
    }
}

/// A labelled choice shown by a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: String,
    pub selection: Selection<FilterValue>,
}

impl FilterOption {
    pub fn all(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selection: Selection::All,
        }
    }

    pub fn item(label: impl Into<String>, value: FilterValue) -> Self {
        Self {
            label: label.into(),
            selection: Selection::Item(value),
        }
    }
}

/// The UI element a component owns: a labelled picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterElement {
    pub label: String,
    pub options: Vec<FilterOption>,
    /// Index into `options`, `None` when there is nothing to pick
    pub selected: Option<usize>,
    /// Free text for text inputs
    pub text: String,
}

impl FilterElement {
    pub fn picker(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            options: Vec::new(),
            selected: None,
            text: String::new(),
        }
    }

    pub fn selected_option(&self) -> Option<&FilterOption> {
        self.selected.and_then(|i| self.options.get(i))
    }

    pub fn position(&self, selection: &Selection<FilterValue>) -> Option<usize> {
        self.options.iter().position(|o| &o.selection == selection)
    }
}

/// Data the host supplies so components can offer current options
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterContext<'a> {
    pub entity_types: &'a [EntityType],
    pub sprints: &'a [Sprint],
    /// Known assignees with display names
    pub users: &'a [(UserId, String)],
}

/// Called with the component's new value after every change
pub type ValueListener = Box<dyn FnMut(Option<&FilterValue>)>;

/// One independent filter in a toolbar.
///
/// A component owns exactly one element and one value, and tells its
/// listeners whenever the value changes.
pub trait FilterComponent {
    /// Criteria key this component writes
    fn key(&self) -> &str;

    fn element(&self) -> &FilterElement;

    /// Current value; `None` when the sentinel is selected
    fn value(&self) -> Option<FilterValue>;

    /// Change the selection as a user would. Returns `false` when the
    /// selection is not currently offered.
    fn select(&mut self, selection: Selection<FilterValue>) -> bool;

    /// Reset to the documented default
    fn clear_filter(&mut self);

    fn add_change_listener(&mut self, listener: ValueListener);

    /// Rebuild offered options. A selection that is no longer offered
    /// falls back to the default.
    fn refresh_options(&mut self, _context: &FilterContext<'_>) {}

    /// Save every change under `storage_id + "_" + key` and restore the
    /// saved value now.
    fn enable_value_persistence(&mut self, storage_id: &str, store: Rc<dyn ValueStore>);
}

/// Listener fan-out and persistence shared by the concrete components
#[derive(Default)]
pub(crate) struct ComponentCore {
    listeners: Vec<ValueListener>,
    storage: Option<(String, Rc<dyn ValueStore>)>,
}

impl ComponentCore {
    pub fn add_listener(&mut self, listener: ValueListener) {
        self.listeners.push(listener);
    }

    pub fn notify(&mut self, value: Option<&FilterValue>) {
        for listener in self.listeners.iter_mut() {
            listener(value);
        }
    }

    pub fn attach_storage(&mut self, storage_id: &str, key: &str, store: Rc<dyn ValueStore>) {
        let storage_key = format!("{storage_id}_{key}");
        tracing::debug!(key = %storage_key, "filter value persistence enabled");
        self.storage = Some((storage_key, store));
    }

    /// Previously saved selection, if any and readable
    pub fn saved(&self) -> Option<Selection<FilterValue>> {
        let (key, store) = self.storage.as_ref()?;
        let raw = store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(selection) => Some(selection),
            Err(e) => {
                tracing::debug!(%key, error = %e, "ignoring unreadable saved filter value");
                None
            }
        }
    }

    pub fn persist(&self, selection: &Selection<FilterValue>) {
        let Some((key, store)) = self.storage.as_ref() else {
            return;
        };
        let result = serde_json::to_string(selection)
            .map_err(Into::into)
            .and_then(|raw| store.set(key, &raw));
        if let Err(e) = result {
            tracing::warn!(%key, error = %e, "failed to persist filter value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_never_equals_real_option() {
        let all = FilterOption::all("All types");
        let named_all = FilterOption::item("All types", FilterValue::EntityType("all".into()));
        assert_ne!(all.selection, named_all.selection);
        assert!(all.selection.is_all());
        assert!(named_all.selection.item().is_some());
    }

    #[test]
    fn test_selection_encoding_is_distinct() {
        let all: Selection<FilterValue> = Selection::All;
        let item = Selection::Item(FilterValue::Text("all".into()));
        assert_ne!(
            serde_json::to_string(&all).unwrap(),
            serde_json::to_string(&item).unwrap()
        );
    }
}
