//! Render model of a column

use crate::types::{BoardItem, EntityId, ItemKind, UserId};
use indexmap::IndexMap;
use serde::Serialize;

/// One draggable card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub entity_id: EntityId,
    pub name: String,
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,
}

impl CardView {
    pub fn of<T: BoardItem>(item: &T) -> Self {
        Self {
            entity_id: item.id().clone(),
            name: item.name().to_string(),
            kind: item.kind(),
            assignee: item.assignee().cloned(),
        }
    }
}

/// Cards of one entity type inside a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSection {
    pub label: String,
    pub count: usize,
    pub cards: Vec<CardView>,
}

/// Everything needed to draw a column. Rebuilt from scratch on refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub count: usize,
    pub sections: Vec<TypeSection>,
    /// Shown instead of sections when the column is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl ColumnView {
    /// Group `items` by type name, sections in first-seen order
    pub(crate) fn render<T: BoardItem>(
        title: &str,
        color: Option<&str>,
        items: &[T],
        no_type_label: &str,
        empty_message: &str,
    ) -> Self {
        let mut groups: IndexMap<String, Vec<CardView>> = IndexMap::new();
        for item in items {
            let label = item
                .entity_type()
                .map(|t| t.name.as_str())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(no_type_label);
            groups
                .entry(label.to_string())
                .or_default()
                .push(CardView::of(item));
        }

        let sections = groups
            .into_iter()
            .map(|(label, cards)| TypeSection {
                label,
                count: cards.len(),
                cards,
            })
            .collect();

        Self {
            title: title.to_string(),
            color: color.map(str::to_string),
            count: items.len(),
            sections,
            empty_message: items.is_empty().then(|| empty_message.to_string()),
        }
    }
}
