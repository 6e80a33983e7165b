//! Filter toolbar: independent components feeding one criteria map, with
//! optional persistence of each selection.

mod component;
mod components;
mod criteria;
mod query;
mod storage;
mod toolbar;

pub use component::{
    FilterComponent, FilterContext, FilterElement, FilterOption, Selection, ValueListener,
};
pub use components::{
    ChoiceFilter, TextFilter, ENTITY_TYPE_KEY, RESPONSIBLE_KEY, SPRINT_KEY, TEXT_KEY,
};
pub use criteria::{FilterCriteria, FilterValue, ResponsibleMode};
pub use query::{apply_criteria, distinct_entity_types};
pub use storage::{value_store_for, JsonFileValueStore, MemoryValueStore, ValueStore};
pub use toolbar::{CriteriaListener, FilterToolbar};
