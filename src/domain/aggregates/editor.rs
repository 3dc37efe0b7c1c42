//! Variant editing sessions.
//!
//! [`VariantEditor`] wires the attribute controller to the combination store:
//! every committed attribute mutation is followed by a regeneration, so the
//! store never lags behind the attribute map. [`FlatVariantEditor`] is the
//! single-attribute front-end over the same machinery.

use rust_decimal::Decimal;
use crate::config::EditorConfig;
use crate::domain::aggregates::{
    Assignment, AttributeSet, AttributeSetController, ChangeListener, Combination, CombinationStateStore,
    EmittedCombination, FieldUpdate, SeedCombination,
};
use crate::domain::events::DomainEvent;
use crate::domain::previews::{ImageFile, PreviewAllocator};
use crate::domain::value_objects::{AttributeName, AttributeValue, Price, Quantity};
use crate::{Result, VariantError};

pub struct VariantEditor {
    controller: AttributeSetController,
    store: CombinationStateStore,
}

impl VariantEditor {
    /// Editor for a product that does not exist yet.
    pub fn new(config: &EditorConfig, base_price: Price, previews: Box<dyn PreviewAllocator>) -> Self {
        Self { controller: AttributeSetController::new(config), store: CombinationStateStore::new(base_price, vec![], previews) }
    }

    /// Editor for a persisted product: its attribute map plus the saved variants as seed.
    ///
    /// A seed whose price cannot be derived from `base_price` is rejected.
    pub fn for_existing(
        config: &EditorConfig,
        base_price: Price,
        attributes: AttributeSet,
        seed: Vec<SeedCombination>,
        previews: Box<dyn PreviewAllocator>,
    ) -> Result<Self> {
        for entry in &seed { entry.initial_price(base_price)?; }
        let mut editor = Self {
            controller: AttributeSetController::with_attributes(attributes, config)?,
            store: CombinationStateStore::new(base_price, seed, previews),
        };
        editor.sync();
        Ok(editor)
    }

    pub fn attributes(&self) -> &AttributeSet { self.controller.attributes() }
    pub fn combinations(&self) -> &[Combination] { self.store.records() }
    pub fn store(&self) -> &CombinationStateStore { &self.store }
    pub fn base_price(&self) -> Price { self.store.base_price() }
    pub fn should_show_combination_editor(&self) -> bool { self.controller.should_show_combination_editor() }
    pub fn subscribe(&mut self, listener: ChangeListener) { self.store.subscribe(listener); }

    pub fn add_attribute(&mut self, name: &str, value: &str) -> Result<bool> {
        let changed = self.controller.add_attribute(name, value)?;
        self.sync();
        Ok(changed)
    }

    pub fn create_attribute<I, V>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.controller.create_attribute(name, values)?;
        self.sync();
        Ok(())
    }

    pub fn edit_attribute<I, V>(&mut self, old_name: &str, new_name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.controller.edit_attribute(old_name, new_name, values)?;
        self.sync();
        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let removed = self.controller.remove_attribute(name);
        self.sync();
        removed
    }

    pub fn add_value_to_attribute(&mut self, name: &str, value: &str) -> Result<bool> {
        let changed = self.controller.add_value_to_attribute(name, value)?;
        self.sync();
        Ok(changed)
    }

    pub fn remove_value_from_attribute(&mut self, name: &str, value: &str) -> bool {
        let removed = self.controller.remove_value_from_attribute(name, value);
        self.sync();
        removed
    }

    pub fn set_field(&mut self, index: usize, update: FieldUpdate) -> Result<()> { self.store.set_field(index, update) }

    pub fn set_images(&mut self, index: usize, urls: Vec<String>, files: Vec<ImageFile>) -> Result<()> {
        self.store.set_images(index, urls, files)
    }

    pub fn set_all_selected(&mut self, selected: bool) { self.store.set_all_selected(selected); }
    pub fn set_base_price(&mut self, base_price: Price) { self.store.set_base_price(base_price); }

    pub fn selected_for_emit(&self) -> Vec<EmittedCombination> { self.store.snapshot() }

    /// Index of the combination matching `pairs`, in any order.
    pub fn position<I, N, V>(&self, pairs: I) -> Option<usize>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let key = Assignment::from_pairs(pairs).ok()?.key();
        self.store.records().iter().position(|c| c.key() == key)
    }

    /// Attribute events first, then the combination events they caused.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        let mut events = self.controller.take_events();
        events.extend(self.store.take_events());
        events
    }

    fn sync(&mut self) {
        self.store.on_attribute_set_changed(self.controller.attributes());
    }
}

/// Per-value editor for one attribute: pick which values to sell and adjust
/// each one's price against the base.
pub struct FlatVariantEditor {
    editor: VariantEditor,
    attribute: AttributeName,
}

impl FlatVariantEditor {
    pub fn new(config: &EditorConfig, attribute: &str, base_price: Price, previews: Box<dyn PreviewAllocator>) -> Result<Self> {
        Ok(Self { editor: VariantEditor::new(config, base_price, previews), attribute: AttributeName::new(attribute)? })
    }

    pub fn for_existing<I, V>(
        config: &EditorConfig,
        attribute: &str,
        values: I,
        base_price: Price,
        seed: Vec<SeedCombination>,
        previews: Box<dyn PreviewAllocator>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let attributes = AttributeSet::from_pairs([(attribute, values)])?;
        let attribute = AttributeName::new(attribute)?;
        Ok(Self { editor: VariantEditor::for_existing(config, base_price, attributes, seed, previews)?, attribute })
    }

    pub fn attribute(&self) -> &AttributeName { &self.attribute }
    pub fn editor(&self) -> &VariantEditor { &self.editor }
    pub fn subscribe(&mut self, listener: ChangeListener) { self.editor.subscribe(listener); }

    pub fn values(&self) -> Vec<&AttributeValue> {
        self.editor.attributes().get(&self.attribute).map(|a| a.values().iter().collect()).unwrap_or_default()
    }

    pub fn add_value(&mut self, value: &str) -> Result<bool> {
        self.editor.add_attribute(self.attribute.as_str(), value)
    }

    pub fn remove_value(&mut self, value: &str) -> bool {
        self.editor.remove_value_from_attribute(self.attribute.as_str(), value)
    }

    /// Replaces the whole value list; an empty list leaves no variants.
    pub fn set_values<I, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let name = self.attribute.as_str();
        if self.editor.attributes().get(&self.attribute).is_some() {
            return self.editor.edit_attribute(name, name, values);
        }
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.iter().all(|v| v.trim().is_empty()) { return Ok(()); }
        self.editor.create_attribute(name, values)
    }

    pub fn select(&mut self, value: &str, selected: bool) -> Result<()> {
        let index = self.index_of(value)?;
        self.editor.set_field(index, FieldUpdate::Selected(Some(selected)))
    }

    pub fn set_price_adjustment(&mut self, value: &str, adjustment: Decimal) -> Result<()> {
        let index = self.index_of(value)?;
        let price = Price::adjusted(self.editor.base_price(), adjustment)?;
        self.editor.set_field(index, FieldUpdate::Price(Some(price)))
    }

    pub fn set_stock(&mut self, value: &str, quantity: Quantity) -> Result<()> {
        let index = self.index_of(value)?;
        self.editor.set_field(index, FieldUpdate::StockQuantity(Some(quantity)))
    }

    pub fn selected_for_emit(&self) -> Vec<EmittedCombination> { self.editor.selected_for_emit() }

    fn index_of(&self, value: &str) -> Result<usize> {
        self.editor.position([(self.attribute.as_str(), value)]).ok_or_else(|| VariantError::UnknownValue {
            name: self.attribute.to_string(), value: value.trim().to_string(),
        })
    }
}
