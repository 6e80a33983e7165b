//! Concrete toolbar filters: type, responsible user, sprint and text search

use super::component::{
    ComponentCore, FilterComponent, FilterContext, FilterElement, FilterOption, Selection,
    ValueListener,
};
use super::criteria::{FilterValue, ResponsibleMode};
use super::storage::ValueStore;
use std::collections::HashSet;
use std::rc::Rc;

pub const ENTITY_TYPE_KEY: &str = "entity_type";
pub const RESPONSIBLE_KEY: &str = "responsible";
pub const SPRINT_KEY: &str = "sprint";
pub const TEXT_KEY: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChoiceSource {
    EntityTypes,
    Responsible,
    Sprints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultChoice {
    /// The "all" sentinel
    All,
    /// The first real option
    First,
}

/// A single-choice picker filter.
///
/// Build one with [`ChoiceFilter::entity_type`], [`ChoiceFilter::responsible`]
/// or [`ChoiceFilter::sprint`].
pub struct ChoiceFilter {
    key: String,
    source: ChoiceSource,
    default: DefaultChoice,
    element: FilterElement,
    core: ComponentCore,
    /// Saved selection not offered yet; applied on the next option refresh
    pending: Option<Selection<FilterValue>>,
}

impl ChoiceFilter {
    /// Entity type filter. Defaults to "All types"; real types are
    /// discovered from the available items.
    pub fn entity_type() -> Self {
        let mut element = FilterElement::picker("Type");
        element.options.push(FilterOption::all("All types"));
        element.selected = Some(0);
        Self::with_element(ENTITY_TYPE_KEY, ChoiceSource::EntityTypes, DefaultChoice::All, element)
    }

    /// Responsible user filter. Defaults to "All items".
    pub fn responsible() -> Self {
        let mut element = FilterElement::picker("Responsible");
        element.options = responsible_options(&[]);
        element.selected = Some(0);
        Self::with_element(RESPONSIBLE_KEY, ChoiceSource::Responsible, DefaultChoice::All, element)
    }

    /// Sprint filter. Defaults to the most recent sprint.
    pub fn sprint() -> Self {
        Self::with_element(
            SPRINT_KEY,
            ChoiceSource::Sprints,
            DefaultChoice::First,
            FilterElement::picker("Sprint"),
        )
    }

    fn with_element(
        key: &str,
        source: ChoiceSource,
        default: DefaultChoice,
        element: FilterElement,
    ) -> Self {
        Self {
            key: key.to_string(),
            source,
            default,
            element,
            core: ComponentCore::default(),
            pending: None,
        }
    }

    fn current(&self) -> Option<Selection<FilterValue>> {
        self.element.selected_option().map(|o| o.selection.clone())
    }

    fn default_index(&self) -> Option<usize> {
        let options = &self.element.options;
        let preferred = match self.default {
            DefaultChoice::All => options.iter().position(|o| o.selection.is_all()),
            DefaultChoice::First => options.iter().position(|o| !o.selection.is_all()),
        };
        preferred.or(if options.is_empty() { None } else { Some(0) })
    }

    /// Point the element at `index`; persist and notify when the selection changed
    fn commit(&mut self, before: Option<Selection<FilterValue>>, index: Option<usize>) {
        self.element.selected = index;
        let after = self.current();
        if after == before {
            return;
        }
        if let Some(selection) = &after {
            self.core.persist(selection);
        }
        tracing::debug!(key = %self.key, selection = ?after, "filter selection changed");
        let value = after.and_then(|s| match s {
            Selection::All => None,
            Selection::Item(value) => Some(value),
        });
        self.core.notify(value.as_ref());
    }

    fn build_options(&self, context: &FilterContext<'_>) -> Vec<FilterOption> {
        match self.source {
            ChoiceSource::EntityTypes => {
                let mut seen = HashSet::new();
                let mut types: Vec<_> = context
                    .entity_types
                    .iter()
                    .filter(|t| seen.insert(t.id.clone()))
                    .collect();
                types.sort_by(|a, b| a.name.cmp(&b.name));
                std::iter::once(FilterOption::all("All types"))
                    .chain(types.into_iter().map(|t| {
                        FilterOption::item(t.name.clone(), FilterValue::EntityType(t.id.clone()))
                    }))
                    .collect()
            }
            ChoiceSource::Responsible => responsible_options(context.users),
            ChoiceSource::Sprints => {
                let mut sprints: Vec<_> = context.sprints.iter().collect();
                sprints.sort_by(|a, b| {
                    b.start_date
                        .cmp(&a.start_date)
                        .then_with(|| a.name.cmp(&b.name))
                });
                sprints
                    .into_iter()
                    .map(|s| FilterOption::item(s.name.clone(), FilterValue::Sprint(s.id.clone())))
                    .collect()
            }
        }
    }
}

fn responsible_options(users: &[(crate::types::UserId, String)]) -> Vec<FilterOption> {
    let mut options = vec![
        FilterOption::all("All items"),
        FilterOption::item(
            "Current user",
            FilterValue::Responsible(ResponsibleMode::CurrentUser),
        ),
    ];
    options.extend(users.iter().map(|(id, name)| {
        FilterOption::item(
            name.clone(),
            FilterValue::Responsible(ResponsibleMode::User(id.clone())),
        )
    }));
    options
}

impl FilterComponent for ChoiceFilter {
    fn key(&self) -> &str {
        &self.key
    }

    fn element(&self) -> &FilterElement {
        &self.element
    }

    fn value(&self) -> Option<FilterValue> {
        self.element
            .selected_option()
            .and_then(|o| o.selection.item().cloned())
    }

    fn select(&mut self, selection: Selection<FilterValue>) -> bool {
        let Some(index) = self.element.position(&selection) else {
            return false;
        };
        self.pending = None;
        let before = self.current();
        self.commit(before, Some(index));
        true
    }

    fn clear_filter(&mut self) {
        self.pending = None;
        let before = self.current();
        let index = self.default_index();
        self.commit(before, index);
    }

    fn add_change_listener(&mut self, listener: ValueListener) {
        self.core.add_listener(listener);
    }

    fn refresh_options(&mut self, context: &FilterContext<'_>) {
        let before = self.current();
        self.element.options = self.build_options(context);

        let restored = self
            .pending
            .take()
            .and_then(|saved| self.element.position(&saved));
        let index = restored
            .or_else(|| before.as_ref().and_then(|s| self.element.position(s)))
            .or_else(|| self.default_index());
        self.commit(before, index);
    }

    fn enable_value_persistence(&mut self, storage_id: &str, store: Rc<dyn ValueStore>) {
        self.core.attach_storage(storage_id, &self.key, store);
        let Some(saved) = self.core.saved() else {
            return;
        };
        let before = self.current();
        match self.element.position(&saved) {
            Some(index) => self.commit(before, Some(index)),
            None => {
                tracing::debug!(key = %self.key, "saved filter value not offered, using default");
                self.pending = Some(saved);
                let index = self.default_index();
                self.commit(before, index);
            }
        }
    }
}

/// Free-text name search
pub struct TextFilter {
    key: String,
    element: FilterElement,
    core: ComponentCore,
}

impl TextFilter {
    pub fn new() -> Self {
        Self {
            key: TEXT_KEY.to_string(),
            element: FilterElement::picker("Search"),
            core: ComponentCore::default(),
        }
    }

    /// Replace the search text
    pub fn set_text(&mut self, text: &str) {
        let before = self.value();
        self.element.text = text.trim().to_string();
        let after = self.value();
        if after == before {
            return;
        }
        self.core.persist(&match &after {
            Some(value) => Selection::Item(value.clone()),
            None => Selection::All,
        });
        self.core.notify(after.as_ref());
    }
}

impl Default for TextFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterComponent for TextFilter {
    fn key(&self) -> &str {
        &self.key
    }

    fn element(&self) -> &FilterElement {
        &self.element
    }

    fn value(&self) -> Option<FilterValue> {
        if self.element.text.is_empty() {
            None
        } else {
            Some(FilterValue::Text(self.element.text.clone()))
        }
    }

    fn select(&mut self, selection: Selection<FilterValue>) -> bool {
        match selection {
            Selection::All => self.set_text(""),
            Selection::Item(FilterValue::Text(text)) => self.set_text(&text),
            Selection::Item(_) => return false,
        }
        true
    }

    fn clear_filter(&mut self) {
        self.set_text("");
    }

    fn add_change_listener(&mut self, listener: ValueListener) {
        self.core.add_listener(listener);
    }

    fn enable_value_persistence(&mut self, storage_id: &str, store: Rc<dyn ValueStore>) {
        self.core.attach_storage(storage_id, &self.key, store);
        if let Some(Selection::Item(FilterValue::Text(text))) = self.core.saved() {
            self.set_text(&text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::storage::MemoryValueStore;
    use crate::types::{EntityType, Sprint};
    use chrono::NaiveDate;
    use std::cell::RefCell;

    fn sprints() -> Vec<Sprint> {
        vec![
            Sprint::new("s1", "Sprint 1", NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()),
            Sprint::new("s3", "Sprint 3", NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()),
            Sprint::new("s2", "Sprint 2", NaiveDate::from_ymd_opt(2026, 1, 19).unwrap()),
        ]
    }

    fn record(filter: &mut dyn FilterComponent) -> Rc<RefCell<Vec<Option<FilterValue>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        filter.add_change_listener(Box::new(move |v| sink.borrow_mut().push(v.cloned())));
        seen
    }

    #[test]
    fn test_entity_type_defaults_to_sentinel_even_with_colliding_name() {
        let mut filter = ChoiceFilter::entity_type();
        let types = vec![
            EntityType::new("all", "All types"),
            EntityType::new("bug", "Bug"),
        ];
        filter.refresh_options(&FilterContext {
            entity_types: &types,
            ..Default::default()
        });

        assert_eq!(filter.element().options.len(), 3);
        assert_eq!(filter.value(), None);
        assert!(filter.element().selected_option().unwrap().selection.is_all());

        assert!(filter.select(Selection::Item(FilterValue::EntityType("all".into()))));
        assert_eq!(filter.value(), Some(FilterValue::EntityType("all".into())));
    }

    #[test]
    fn test_sprint_defaults_to_newest() {
        let mut filter = ChoiceFilter::sprint();
        assert_eq!(filter.value(), None);
        let seen = record(&mut filter);

        let sprints = sprints();
        filter.refresh_options(&FilterContext {
            sprints: &sprints,
            ..Default::default()
        });

        assert_eq!(filter.value(), Some(FilterValue::Sprint("s3".into())));
        assert_eq!(*seen.borrow(), vec![Some(FilterValue::Sprint("s3".into()))]);
        let labels: Vec<_> = filter.element().options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Sprint 3", "Sprint 2", "Sprint 1"]);
    }

    #[test]
    fn test_select_unknown_option_is_refused() {
        let mut filter = ChoiceFilter::responsible();
        let seen = record(&mut filter);
        assert!(!filter.select(Selection::Item(FilterValue::Sprint("s1".into()))));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_clear_filter_resets_to_default_and_notifies_once() {
        let mut filter = ChoiceFilter::responsible();
        let seen = record(&mut filter);
        filter.select(Selection::Item(FilterValue::Responsible(ResponsibleMode::CurrentUser)));
        filter.clear_filter();
        filter.clear_filter();
        assert_eq!(filter.value(), None);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_refresh_keeps_valid_selection() {
        let mut filter = ChoiceFilter::sprint();
        let all = sprints();
        filter.refresh_options(&FilterContext { sprints: &all, ..Default::default() });
        filter.select(Selection::Item(FilterValue::Sprint("s1".into())));

        filter.refresh_options(&FilterContext { sprints: &all[..2], ..Default::default() });
        assert_eq!(filter.value(), Some(FilterValue::Sprint("s1".into())));

        filter.refresh_options(&FilterContext { sprints: &all[1..], ..Default::default() });
        assert_eq!(filter.value(), Some(FilterValue::Sprint("s3".into())));
    }

    #[test]
    fn test_restore_applies_once_options_arrive() {
        let store: Rc<dyn ValueStore> = Rc::new(MemoryValueStore::new());
        let all = sprints();

        let mut first = ChoiceFilter::sprint();
        first.enable_value_persistence("filterToolbar_board", store.clone());
        first.refresh_options(&FilterContext { sprints: &all, ..Default::default() });
        first.select(Selection::Item(FilterValue::Sprint("s2".into())));
        assert!(store.get("filterToolbar_board_sprint").is_some());

        let mut second = ChoiceFilter::sprint();
        second.enable_value_persistence("filterToolbar_board", store.clone());
        assert_eq!(second.value(), None);
        second.refresh_options(&FilterContext { sprints: &all, ..Default::default() });
        assert_eq!(second.value(), Some(FilterValue::Sprint("s2".into())));
    }

    #[test]
    fn test_restore_of_stale_value_falls_back_to_default() {
        let store: Rc<dyn ValueStore> = Rc::new(MemoryValueStore::new());
        store
            .set(
                "filterToolbar_board_entity_type",
                &serde_json::to_string(&Selection::Item(FilterValue::EntityType("gone".into())))
                    .unwrap(),
            )
            .unwrap();

        let mut filter = ChoiceFilter::entity_type();
        filter.enable_value_persistence("filterToolbar_board", store.clone());
        let types = vec![EntityType::new("bug", "Bug")];
        filter.refresh_options(&FilterContext { entity_types: &types, ..Default::default() });
        assert_eq!(filter.value(), None);
    }

    #[test]
    fn test_garbage_in_store_is_ignored() {
        let store: Rc<dyn ValueStore> = Rc::new(MemoryValueStore::new());
        store.set("filterToolbar_x_responsible", "{{{").unwrap();
        let mut filter = ChoiceFilter::responsible();
        filter.enable_value_persistence("filterToolbar_x", store);
        assert_eq!(filter.value(), None);
    }

    #[test]
    fn test_text_filter() {
        let store: Rc<dyn ValueStore> = Rc::new(MemoryValueStore::new());
        let mut filter = TextFilter::new();
        filter.enable_value_persistence("filterToolbar_t", store.clone());
        let seen = record(&mut filter);

        filter.set_text("  report ");
        filter.set_text("report");
        assert_eq!(filter.value(), Some(FilterValue::Text("report".into())));
        assert_eq!(seen.borrow().len(), 1);
        assert!(!filter.select(Selection::Item(FilterValue::Sprint("s1".into()))));

        let mut restored = TextFilter::new();
        restored.enable_value_persistence("filterToolbar_t", store);
        assert_eq!(restored.value(), Some(FilterValue::Text("report".into())));

        filter.clear_filter();
        assert_eq!(filter.value(), None);
    }
}
