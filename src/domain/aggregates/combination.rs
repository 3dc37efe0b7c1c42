//! Combination records and their identity

use rust_decimal::Decimal;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use crate::domain::previews::ImageFile;
use crate::domain::value_objects::{AttributeName, AttributeValue, Price, Quantity};
use crate::{Result, VariantError};

/// One value chosen per attribute.
///
/// Entries keep the order they were declared in, which drives the display title.
/// Equality and hashing go through [`CombinationKey`] and ignore that order.
#[derive(Clone, Debug, Default)]
pub struct Assignment {
    entries: Vec<(AttributeName, AttributeValue)>,
}

impl Assignment {
    pub fn new() -> Self { Self::default() }

    /// Builds an assignment from `(name, value)` pairs; a repeated name is rejected.
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut assignment = Self::new();
        for (name, value) in pairs {
            let name = AttributeName::new(name)?;
            if assignment.get(&name).is_some() { return Err(VariantError::DuplicateAttribute(name.to_string())); }
            assignment.entries.push((name, AttributeValue::new(value)?));
        }
        Ok(assignment)
    }

    pub(crate) fn push(&mut self, name: AttributeName, value: AttributeValue) {
        debug_assert!(self.get(&name).is_none());
        self.entries.push((name, value));
    }

    pub(crate) fn pop(&mut self) { self.entries.pop(); }

    pub fn get(&self, name: &AttributeName) -> Option<&AttributeValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeName, &AttributeValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn key(&self) -> CombinationKey { CombinationKey::of(self) }

    /// "M / Red" for `{Size: M, Color: Red}`.
    pub fn title(&self) -> String {
        self.entries.iter().map(|(_, v)| v.as_str()).collect::<Vec<_>>().join(" / ")
    }

    /// True when every pair of `self` also appears in the strictly larger `other`.
    pub fn is_projection_of(&self, other: &Assignment) -> bool {
        self.len() < other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool { self.key() == other.key() }
}

impl Eq for Assignment {}

impl Hash for Assignment {
    fn hash<H: Hasher>(&self, state: &mut H) { self.key().hash(state) }
}

impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Assignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(AssignmentVisitor)
    }
}

/// Reads map entries in document order, rejecting a repeated attribute name.
struct AssignmentVisitor;

impl<'de> Visitor<'de> for AssignmentVisitor {
    type Value = Assignment;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute name to value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Assignment, A::Error> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(pair) = access.next_entry::<String, String>()? {
            pairs.push(pair);
        }
        Assignment::from_pairs(pairs).map_err(de::Error::custom)
    }
}

/// Canonical identity of an assignment: its pairs sorted by attribute name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CombinationKey(Vec<(AttributeName, AttributeValue)>);

impl CombinationKey {
    pub fn of(assignment: &Assignment) -> Self {
        let mut pairs = assignment.entries.clone();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Self(pairs)
    }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() { return write!(f, "{{}}"); }
        let parts: Vec<String> = self.0.iter().map(|(n, v)| format!("{n}={v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Working record for one variant configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combination {
    pub assignment: Assignment,
    pub price: Price,
    pub stock_quantity: Quantity,
    pub image_urls: Vec<String>,
    pub image_files: Vec<ImageFile>,
    pub selected: bool,
}

impl Combination {
    /// A freshly generated combination: base price, no stock, no images, selected.
    pub fn with_defaults(assignment: Assignment, base_price: Price) -> Self {
        Self {
            assignment, price: base_price, stock_quantity: Quantity::default(),
            image_urls: vec![], image_files: vec![], selected: true,
        }
    }

    pub fn key(&self) -> CombinationKey { self.assignment.key() }
    pub fn title(&self) -> String { self.assignment.title() }
    pub fn price_adjustment(&self, base_price: Price) -> Decimal { self.price.adjustment_from(base_price) }

    pub fn emit(&self, base_price: Price) -> EmittedCombination {
        EmittedCombination {
            assignment: self.assignment.clone(), title: self.title(), price: self.price,
            price_adjustment: self.price_adjustment(base_price), stock_quantity: self.stock_quantity,
            image_urls: self.image_urls.clone(), image_files: self.image_files.clone(),
        }
    }
}

/// Persisted variant data loaded when editing an existing product
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedCombination {
    pub assignment: Assignment,
    pub price: Option<Price>,
    pub price_adjustment: Option<Decimal>,
    pub stock_quantity: Option<Quantity>,
    pub image_urls: Option<Vec<String>>,
}

impl SeedCombination {
    pub fn new(assignment: Assignment) -> Self { Self { assignment, ..Self::default() } }

    /// Explicit price first, then base plus adjustment, then base.
    ///
    /// An adjustment that would push the price below zero floors it at zero.
    /// One outside the decimal range is an error.
    pub fn initial_price(&self, base_price: Price) -> Result<Price> {
        match (self.price, self.price_adjustment) {
            (Some(price), _) => Ok(price),
            (None, Some(adjustment)) => match Price::adjusted(base_price, adjustment) {
                Err(VariantError::NegativePrice) => {
                    tracing::warn!(key = %self.assignment.key(), %adjustment, "seed adjustment below zero, flooring price");
                    Ok(Price::ZERO)
                }
                other => other,
            },
            (None, None) => Ok(base_price),
        }
    }

    /// Falls back to `base_price` when the seeded price is out of range.
    pub fn to_combination(&self, assignment: Assignment, base_price: Price) -> Combination {
        let price = self.initial_price(base_price).unwrap_or_else(|e| {
            tracing::warn!(key = %self.assignment.key(), error = %e, "seed price unusable, using base price");
            base_price
        });
        Combination {
            assignment, price,
            stock_quantity: self.stock_quantity.unwrap_or_default(),
            image_urls: self.image_urls.clone().unwrap_or_default(), image_files: vec![], selected: true,
        }
    }
}

/// Snapshot handed to the product form for persistence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedCombination {
    pub assignment: Assignment,
    pub title: String,
    pub price: Price,
    pub price_adjustment: Decimal,
    pub stock_quantity: Quantity,
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_files: Vec<ImageFile>,
}
