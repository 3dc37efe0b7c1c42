//! Attribute Set Aggregate

use serde::{Deserialize, Serialize};
use crate::config::EditorConfig;
use crate::domain::events::{AttributeEvent, DomainEvent};
use crate::domain::services::combination_count;
use crate::domain::value_objects::{AttributeName, AttributeValue};
use crate::{Result, VariantError};

/// A named axis of variation and its allowed values, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAttribute")]
pub struct Attribute {
    name: AttributeName,
    values: Vec<AttributeValue>,
}

#[derive(Deserialize)]
struct RawAttribute { name: String, #[serde(default)] values: Vec<String> }

impl TryFrom<RawAttribute> for Attribute {
    type Error = VariantError;
    fn try_from(raw: RawAttribute) -> Result<Self> { Self::new(raw.name, raw.values) }
}

impl Attribute {
    /// Values are trimmed; blanks and repeats are dropped. The list may end up empty.
    pub fn new<N, I, V>(name: N, values: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut attribute = Self { name: AttributeName::new(name)?, values: vec![] };
        for value in values {
            if let Ok(value) = AttributeValue::new(value) {
                if !attribute.contains(&value) { attribute.values.push(value); }
            }
        }
        Ok(attribute)
    }

    pub fn name(&self) -> &AttributeName { &self.name }
    pub fn values(&self) -> &[AttributeValue] { &self.values }
    pub fn contains(&self, value: &AttributeValue) -> bool { self.values.contains(value) }
}

/// Ordered attribute map. Names are unique; values are unique within an attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Attribute>", into = "Vec<Attribute>")]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl TryFrom<Vec<Attribute>> for AttributeSet {
    type Error = VariantError;
    fn try_from(attributes: Vec<Attribute>) -> Result<Self> { Self::from_attributes(attributes) }
}

impl From<AttributeSet> for Vec<Attribute> {
    fn from(set: AttributeSet) -> Self { set.attributes }
}

impl AttributeSet {
    pub fn from_attributes(attributes: Vec<Attribute>) -> Result<Self> {
        let mut set = Self::default();
        for attribute in attributes {
            if set.get(attribute.name()).is_some() { return Err(VariantError::DuplicateAttribute(attribute.name.to_string())); }
            set.attributes.push(attribute);
        }
        Ok(set)
    }

    pub fn from_pairs<I, N, Vs, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Vs)>,
        N: Into<String>,
        Vs: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let attributes = pairs.into_iter().map(|(n, vs)| Attribute::new(n, vs)).collect::<Result<Vec<_>>>()?;
        Self::from_attributes(attributes)
    }

    pub fn attributes(&self) -> &[Attribute] { &self.attributes }
    pub fn len(&self) -> usize { self.attributes.len() }
    pub fn is_empty(&self) -> bool { self.attributes.is_empty() }
    pub fn get(&self, name: &AttributeName) -> Option<&Attribute> { self.attributes.iter().find(|a| &a.name == name) }
    pub fn combination_count(&self) -> usize { combination_count(self) }

    fn position(&self, name: &AttributeName) -> Option<usize> { self.attributes.iter().position(|a| &a.name == name) }
}

/// Whether the combination editor applies at all.
///
/// Two or more attributes, or one attribute with two or more values. A lone
/// attribute with a single value is an ordinary product, not a variant matrix.
pub fn should_show_combination_editor(set: &AttributeSet) -> bool {
    match set.attributes() {
        [] => false,
        [only] => only.values().len() >= 2,
        _ => true,
    }
}

/// Owns the attribute map feeding the generator.
///
/// Every mutation builds the next set on a copy and commits it only once it
/// validates, so a rejected edit leaves the map untouched.
#[derive(Clone, Debug)]
pub struct AttributeSetController {
    set: AttributeSet,
    max_combinations: usize,
    events: Vec<DomainEvent>,
}

impl AttributeSetController {
    pub fn new(config: &EditorConfig) -> Self {
        Self { set: AttributeSet::default(), max_combinations: config.max_combinations, events: vec![] }
    }

    /// Starts from a seed map supplied by the product form. Attributes without values are dropped.
    pub fn with_attributes(set: AttributeSet, config: &EditorConfig) -> Result<Self> {
        let mut controller = Self::new(config);
        let attributes = set.attributes.into_iter().filter(|a| !a.values.is_empty()).collect();
        let next = AttributeSet { attributes };
        controller.check_limit(&next)?;
        controller.set = next;
        Ok(controller)
    }

    pub fn attributes(&self) -> &AttributeSet { &self.set }
    pub fn should_show_combination_editor(&self) -> bool { should_show_combination_editor(&self.set) }

    /// Appends `value` to `name`, creating the attribute if needed. Re-adding a
    /// present value is a no-op. Returns whether anything changed.
    pub fn add_attribute(&mut self, name: &str, value: &str) -> Result<bool> {
        let name = AttributeName::new(name)?;
        let value = AttributeValue::new(value)?;
        let mut next = self.set.clone();
        match next.position(&name) {
            Some(i) if next.attributes[i].contains(&value) => return Ok(false),
            Some(i) => next.attributes[i].values.push(value.clone()),
            None => next.attributes.push(Attribute { name: name.clone(), values: vec![value.clone()] }),
        }
        self.commit(next, AttributeEvent::ValueAdded { name, value })?;
        Ok(true)
    }

    /// New attribute with its initial values. An existing name is rejected.
    pub fn create_attribute<I, V>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let attribute = Attribute::new(name, values)?;
        if self.set.get(attribute.name()).is_some() { return Err(VariantError::DuplicateAttribute(attribute.name.to_string())); }
        if attribute.values.is_empty() { return Err(VariantError::EmptyAttributeValue); }
        let mut next = self.set.clone();
        next.attributes.push(attribute.clone());
        self.commit(next, AttributeEvent::Created { name: attribute.name, values: attribute.values })
    }

    /// Renames `old_name` and replaces its values, keeping its position.
    /// If no usable value remains the attribute is removed.
    pub fn edit_attribute<I, V>(&mut self, old_name: &str, new_name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let edited = Attribute::new(new_name, values)?;
        let old_name = AttributeName::new(old_name)?;
        let i = self.set.position(&old_name).ok_or_else(|| VariantError::UnknownAttribute(old_name.to_string()))?;
        if edited.name != old_name && self.set.get(&edited.name).is_some() {
            return Err(VariantError::DuplicateAttribute(edited.name.to_string()));
        }
        if edited.values.is_empty() {
            self.remove_attribute(old_name.as_str());
            return Ok(());
        }
        let mut next = self.set.clone();
        next.attributes[i] = edited.clone();
        self.commit(next, AttributeEvent::Edited { old_name, new_name: edited.name, values: edited.values })
    }

    /// No-op if absent. Returns whether an attribute was removed.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let Ok(name) = AttributeName::new(name) else { return false };
        let Some(i) = self.set.position(&name) else { return false };
        let mut next = self.set.clone();
        next.attributes.remove(i);
        self.commit(next, AttributeEvent::Removed { name }).is_ok()
    }

    pub fn add_value_to_attribute(&mut self, name: &str, value: &str) -> Result<bool> {
        let name = AttributeName::new(name)?;
        let value = AttributeValue::new(value)?;
        let i = self.set.position(&name).ok_or_else(|| VariantError::UnknownAttribute(name.to_string()))?;
        if self.set.attributes[i].contains(&value) { return Ok(false); }
        let mut next = self.set.clone();
        next.attributes[i].values.push(value.clone());
        self.commit(next, AttributeEvent::ValueAdded { name, value })?;
        Ok(true)
    }

    /// Removing the last value removes the attribute. Returns whether anything changed.
    pub fn remove_value_from_attribute(&mut self, name: &str, value: &str) -> bool {
        let (Ok(name), Ok(value)) = (AttributeName::new(name), AttributeValue::new(value)) else { return false };
        let Some(i) = self.set.position(&name) else { return false };
        if !self.set.attributes[i].contains(&value) { return false; }
        if self.set.attributes[i].values.len() == 1 { return self.remove_attribute(name.as_str()); }
        let mut next = self.set.clone();
        next.attributes[i].values.retain(|v| v != &value);
        self.commit(next, AttributeEvent::ValueRemoved { name, value }).is_ok()
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn check_limit(&self, next: &AttributeSet) -> Result<()> {
        let count = combination_count(next);
        if count > self.max_combinations {
            return Err(VariantError::TooManyCombinations { count, limit: self.max_combinations });
        }
        Ok(())
    }

    fn commit(&mut self, next: AttributeSet, event: AttributeEvent) -> Result<()> {
        self.check_limit(&next)?;
        self.set = next;
        self.events.push(DomainEvent::Attribute(event));
        Ok(())
    }
}
