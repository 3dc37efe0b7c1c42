//! Value Objects for variant editing

use crate::{Result, VariantError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute name (e.g. "Size"), trimmed and non-empty
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeName(String);

impl AttributeName {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(VariantError::EmptyAttributeName); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for AttributeName {
    type Error = VariantError;
    fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<AttributeName> for String {
    fn from(name: AttributeName) -> Self { name.0 }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Attribute value (e.g. "Red"), trimmed and non-empty. Comparison is case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeValue(String);

impl AttributeValue {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(VariantError::EmptyAttributeValue); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for AttributeValue {
    type Error = VariantError;
    fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<AttributeValue> for String {
    fn from(value: AttributeValue) -> Self { value.0 }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Absolute price of a product or variant. Never negative.
///
/// Currency is owned by the product form; the variant engine only deals in amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(VariantError::NegativePrice); }
        Ok(Self(amount))
    }
    pub fn amount(&self) -> Decimal { self.0 }

    /// Signed difference against the base price.
    pub fn adjustment_from(&self, base: Price) -> Decimal { self.0 - base.0 }

    /// `base + adjustment`, rejected when the result would be negative or
    /// falls outside the decimal range.
    pub fn adjusted(base: Price, adjustment: Decimal) -> Result<Self> {
        let amount = base.0.checked_add(adjustment).ok_or(VariantError::PriceOverflow)?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = VariantError;
    fn try_from(amount: Decimal) -> Result<Self> { Self::new(amount) }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self { price.0 }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Stock quantity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn is_zero(&self) -> bool { self.0 == 0 }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self { Self(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_attribute_name_trims() {
        let name = AttributeName::new("  Size ").unwrap();
        assert_eq!(name.as_str(), "Size");
        assert_eq!(AttributeName::new("   "), Err(VariantError::EmptyAttributeName));
    }
    #[test]
    fn test_attribute_value_is_case_sensitive() {
        assert_ne!(AttributeValue::new("red").unwrap(), AttributeValue::new("Red").unwrap());
        assert_eq!(AttributeValue::new(""), Err(VariantError::EmptyAttributeValue));
    }
    #[test]
    fn test_price_rejects_negative() {
        assert_eq!(Price::new(Decimal::new(-1, 0)), Err(VariantError::NegativePrice));
        let base = Price::new(Decimal::new(100000, 0)).unwrap();
        let price = Price::new(Decimal::new(90000, 0)).unwrap();
        assert_eq!(price.adjustment_from(base), Decimal::new(-10000, 0));
        assert_eq!(Price::adjusted(base, Decimal::new(-100001, 0)), Err(VariantError::NegativePrice));
    }
    #[test]
    fn test_adjusted_price_out_of_range() {
        let max = Price::new(Decimal::MAX).unwrap();
        assert_eq!(Price::adjusted(max, Decimal::ONE), Err(VariantError::PriceOverflow));
        assert_eq!(Price::adjusted(Price::ZERO, Decimal::MIN), Err(VariantError::NegativePrice));
        assert_eq!(Price::adjusted(max, Decimal::ZERO), Ok(max));
    }
    #[test]
    fn test_names_deserialize_through_validation() {
        let name: AttributeName = serde_json::from_str("\" Color \"").unwrap();
        assert_eq!(name.as_str(), "Color");
        assert!(serde_json::from_str::<AttributeName>("\"  \"").is_err());
    }
}
