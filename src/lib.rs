//! OpenSASE Variant Matrix
//!
//! Variant combination engine behind the product editor in the admin console.
//!
//! ## Features
//! - Attribute sets (Size, Color, ...) with validated, deduplicated values
//! - Cartesian product generation of every variant combination
//! - Reconciliation that keeps price, stock, images and selection across edits
//! - Seeding from previously persisted variants
//! - Image preview lifetime tracking for pending uploads

pub mod api;
pub mod config;
pub mod domain;

pub use domain::aggregates::{
    should_show_combination_editor, Assignment, Attribute, AttributeSet, AttributeSetController,
    Combination, CombinationField, CombinationKey, CombinationStateStore, EmittedCombination,
    FieldUpdate, FlatVariantEditor, SeedCombination, VariantEditor,
};
pub use domain::previews::{ImageFile, InMemoryPreviews, PreviewAllocator, PreviewUrl};
pub use domain::services::{generate, reconcile};
pub use domain::value_objects::{AttributeName, AttributeValue, Price, Quantity};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("Attribute name must not be empty")]
    EmptyAttributeName,

    #[error("Attribute value must not be empty")]
    EmptyAttributeValue,

    #[error("Attribute already exists: {0}")]
    DuplicateAttribute(String),

    #[error("Attribute not found: {0}")]
    UnknownAttribute(String),

    #[error("Value {value} not found in attribute {name}")]
    UnknownValue { name: String, value: String },

    #[error("Price must not be negative")]
    NegativePrice,

    #[error("Price adjustment out of range")]
    PriceOverflow,

    #[error("Combination index {index} out of range ({len} combinations)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Too many combinations: {count} exceeds limit of {limit}")]
    TooManyCombinations { count: usize, limit: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VariantError {
    /// Validation failures are user-correctable and leave state untouched.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::IndexOutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, VariantError>;
