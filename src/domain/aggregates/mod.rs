//! Aggregates module
pub mod attribute_set;
pub mod combination;
pub mod editor;
pub mod store;

pub use attribute_set::{should_show_combination_editor, Attribute, AttributeSet, AttributeSetController};
pub use combination::{Assignment, Combination, CombinationKey, EmittedCombination, SeedCombination};
pub use editor::{FlatVariantEditor, VariantEditor};
pub use store::{ChangeListener, CombinationStateStore, FieldUpdate};
pub use crate::domain::events::CombinationField;
