//! Domain events
use crate::domain::value_objects::{AttributeName, AttributeValue};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    Attribute(AttributeEvent),
    Combination(CombinationEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeEvent {
    Created { name: AttributeName, values: Vec<AttributeValue> },
    ValueAdded { name: AttributeName, value: AttributeValue },
    ValueRemoved { name: AttributeName, value: AttributeValue },
    Edited { old_name: AttributeName, new_name: AttributeName, values: Vec<AttributeValue> },
    Removed { name: AttributeName },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombinationField { Price, StockQuantity, Selected, ImageUrls, ImageFiles }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CombinationEvent {
    Regenerated { total: usize, carried_over: usize, seeded: usize, created: usize, dropped: usize },
    FieldChanged { index: usize, field: CombinationField },
    ImagesReplaced { index: usize },
    SelectionChanged { selected: bool },
    BasePriceChanged,
    Cleared { dropped: usize },
}
