//! Combination State Store

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::aggregates::{AttributeSet, Combination, EmittedCombination, SeedCombination};
use crate::domain::events::{CombinationEvent, CombinationField, DomainEvent};
use crate::domain::previews::{ImageFile, PreviewAllocator, PreviewLedger, PreviewUrl};
use crate::domain::services::{generate, reconcile_detailed};
use crate::domain::value_objects::{Price, Quantity};
use crate::{Result, VariantError};

/// Receives the selected snapshot after every change.
pub type ChangeListener = Box<dyn FnMut(&[EmittedCombination]) + Send>;

/// Replacement for one field of a combination. `None` resets the field to its
/// type default: zero price, zero stock, deselected, no images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldUpdate {
    Price(Option<Price>),
    StockQuantity(Option<Quantity>),
    Selected(Option<bool>),
    ImageUrls(Option<Vec<String>>),
    ImageFiles(Option<Vec<ImageFile>>),
}

impl FieldUpdate {
    pub fn field(&self) -> CombinationField {
        match self {
            Self::Price(_) => CombinationField::Price,
            Self::StockQuantity(_) => CombinationField::StockQuantity,
            Self::Selected(_) => CombinationField::Selected,
            Self::ImageUrls(_) => CombinationField::ImageUrls,
            Self::ImageFiles(_) => CombinationField::ImageFiles,
        }
    }

    fn apply(self, record: &mut Combination) {
        match self {
            Self::Price(v) => record.price = v.unwrap_or_default(),
            Self::StockQuantity(v) => record.stock_quantity = v.unwrap_or_default(),
            Self::Selected(v) => record.selected = v.unwrap_or_default(),
            Self::ImageUrls(v) => record.image_urls = v.unwrap_or_default(),
            Self::ImageFiles(v) => record.image_files = v.unwrap_or_default(),
        }
    }
}

/// Working combination list for one product editing session.
///
/// Records are re-derived from the attribute set through the reconciler, edited
/// by index, and pushed to listeners as the selected snapshot after each change.
pub struct CombinationStateStore {
    records: Vec<Combination>,
    base_price: Price,
    seed: Vec<SeedCombination>,
    last_set: Option<AttributeSet>,
    previews: PreviewLedger,
    listeners: Vec<ChangeListener>,
    events: Vec<DomainEvent>,
    updated_at: DateTime<Utc>,
}

impl CombinationStateStore {
    pub fn new(base_price: Price, seed: Vec<SeedCombination>, previews: Box<dyn PreviewAllocator>) -> Self {
        Self {
            records: vec![], base_price, seed, last_set: None, previews: PreviewLedger::new(previews),
            listeners: vec![], events: vec![], updated_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[Combination] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn base_price(&self) -> Price { self.base_price }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn preview_url(&self, file_id: &Uuid) -> Option<&PreviewUrl> { self.previews.preview_url(file_id) }

    pub fn subscribe(&mut self, listener: ChangeListener) { self.listeners.push(listener); }

    /// Regenerates from `set` unless it equals the set seen last time.
    /// Returns whether the records were rebuilt.
    pub fn on_attribute_set_changed(&mut self, set: &AttributeSet) -> bool {
        if self.last_set.as_ref() == Some(set) { return false; }
        self.last_set = Some(set.clone());
        if set.is_empty() {
            self.drop_records();
            return true;
        }
        let candidates = generate(set);
        let outcome = reconcile_detailed(&candidates, &self.records, &self.seed, self.base_price);
        tracing::debug!(
            total = outcome.combinations.len(), carried_over = outcome.carried_over, seeded = outcome.seeded,
            created = outcome.created, dropped = outcome.dropped, "combinations regenerated"
        );
        self.records = outcome.combinations;
        self.raise_event(CombinationEvent::Regenerated {
            total: self.records.len(), carried_over: outcome.carried_over, seeded: outcome.seeded,
            created: outcome.created, dropped: outcome.dropped,
        });
        self.changed();
        true
    }

    pub fn set_field(&mut self, index: usize, update: FieldUpdate) -> Result<()> {
        let field = update.field();
        update.apply(self.record_mut(index)?);
        self.raise_event(CombinationEvent::FieldChanged { index, field });
        self.changed();
        Ok(())
    }

    /// Replaces uploaded URLs and pending files together.
    pub fn set_images(&mut self, index: usize, urls: Vec<String>, files: Vec<ImageFile>) -> Result<()> {
        let record = self.record_mut(index)?;
        record.image_urls = urls;
        record.image_files = files;
        self.raise_event(CombinationEvent::ImagesReplaced { index });
        self.changed();
        Ok(())
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        self.records.iter_mut().for_each(|r| r.selected = selected);
        self.raise_event(CombinationEvent::SelectionChanged { selected });
        self.changed();
    }

    /// Absolute prices stay put; adjustments follow the new base on emit.
    pub fn set_base_price(&mut self, base_price: Price) {
        self.base_price = base_price;
        self.raise_event(CombinationEvent::BasePriceChanged);
        self.changed();
    }

    /// Selected records with `price_adjustment` derived against `base_price`.
    pub fn selected_for_emit(&self, base_price: Price) -> Vec<EmittedCombination> {
        self.records.iter().filter(|r| r.selected).map(|r| r.emit(base_price)).collect()
    }

    /// [`Self::selected_for_emit`] at the store's own base price.
    pub fn snapshot(&self) -> Vec<EmittedCombination> { self.selected_for_emit(self.base_price) }

    /// Empties the store and forgets the last attribute set, so the next
    /// [`Self::on_attribute_set_changed`] rebuilds from scratch.
    pub fn clear(&mut self) {
        self.last_set = None;
        self.drop_records();
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn drop_records(&mut self) {
        let dropped = self.records.len();
        self.records.clear();
        self.raise_event(CombinationEvent::Cleared { dropped });
        self.changed();
    }

    fn record_mut(&mut self, index: usize) -> Result<&mut Combination> {
        let len = self.records.len();
        self.records.get_mut(index).ok_or_else(|| {
            tracing::warn!(index, len, "combination edit ignored: index out of range");
            VariantError::IndexOutOfRange { index, len }
        })
    }

    fn changed(&mut self) {
        self.previews.sync(&self.records);
        self.touch();
        let snapshot = self.snapshot();
        for listener in &mut self.listeners { listener(&snapshot); }
    }

    fn raise_event(&mut self, e: CombinationEvent) { self.events.push(DomainEvent::Combination(e)); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

impl std::fmt::Debug for CombinationStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinationStateStore")
            .field("records", &self.records)
            .field("base_price", &self.base_price)
            .field("previews", &self.previews)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::previews::InMemoryPreviews;
    use assert_matches::assert_matches;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Mutex};

    fn price(amount: i64) -> Price { Price::new(Decimal::new(amount, 0)).unwrap() }

    fn sizes_and_colors() -> AttributeSet {
        AttributeSet::from_pairs([("Size", vec!["M", "L"]), ("Color", vec!["Red", "Blue"])]).unwrap()
    }

    fn store() -> CombinationStateStore {
        let mut s = CombinationStateStore::new(price(100000), vec![], Box::new(InMemoryPreviews::new()));
        s.on_attribute_set_changed(&sizes_and_colors());
        s
    }

    #[test]
    fn test_same_set_does_not_regenerate() {
        let mut s = store();
        s.take_events();
        assert!(!s.on_attribute_set_changed(&sizes_and_colors()));
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn test_set_field_and_reset_to_default() {
        let mut s = store();
        s.set_field(1, FieldUpdate::StockQuantity(Some(Quantity::new(3)))).unwrap();
        assert_eq!(s.records()[1].stock_quantity.value(), 3);
        s.set_field(1, FieldUpdate::StockQuantity(None)).unwrap();
        assert!(s.records()[1].stock_quantity.is_zero());
        s.set_field(1, FieldUpdate::Price(None)).unwrap();
        assert_eq!(s.records()[1].price, Price::ZERO);
        s.set_field(1, FieldUpdate::Selected(None)).unwrap();
        assert!(!s.records()[1].selected);
        assert!(s.records()[0].selected);
    }

    #[test]
    fn test_out_of_range_edit_is_rejected_without_side_effects() {
        let mut s = store();
        let before = s.records().to_vec();
        s.take_events();
        assert_matches!(
            s.set_field(9, FieldUpdate::Selected(Some(false))),
            Err(VariantError::IndexOutOfRange { index: 9, len: 4 })
        );
        assert_matches!(s.set_images(4, vec![], vec![]), Err(VariantError::IndexOutOfRange { .. }));
        assert_eq!(s.records(), before.as_slice());
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn test_listener_sees_every_change() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
        let mut s = store();
        let sink = seen.clone();
        s.subscribe(Box::new(move |snapshot: &[EmittedCombination]| sink.lock().unwrap().push(snapshot.len())));
        s.set_field(0, FieldUpdate::Selected(Some(false))).unwrap();
        s.set_all_selected(true);
        s.on_attribute_set_changed(&AttributeSet::default());
        assert_eq!(*seen.lock().unwrap(), vec![3, 4, 0]);
    }

    #[test]
    fn test_adjustment_follows_price_and_base() {
        let mut s = store();
        s.set_field(0, FieldUpdate::Price(Some(price(90000)))).unwrap();
        assert_eq!(s.snapshot()[0].price_adjustment, Decimal::new(-10000, 0));
        s.set_base_price(price(80000));
        assert_eq!(s.snapshot()[0].price_adjustment, Decimal::new(10000, 0));
        assert_eq!(s.snapshot()[1].price, price(100000));
        assert_eq!(s.selected_for_emit(price(100000))[0].price_adjustment, Decimal::new(-10000, 0));
    }

    #[test]
    fn test_empty_set_clears_records() {
        let mut s = store();
        s.take_events();
        assert!(s.on_attribute_set_changed(&AttributeSet::default()));
        assert!(s.is_empty());
        assert_eq!(s.take_events(), vec![DomainEvent::Combination(CombinationEvent::Cleared { dropped: 4 })]);
    }

    #[test]
    fn test_clear_then_same_set_rebuilds() {
        let mut s = store();
        s.clear();
        assert!(s.is_empty());
        assert!(s.on_attribute_set_changed(&sizes_and_colors()));
        assert_eq!(s.len(), 4);
        assert!(!s.on_attribute_set_changed(&sizes_and_colors()));
    }

    #[test]
    fn test_single_trivial_combination_is_held() {
        let mut s = CombinationStateStore::new(price(1), vec![], Box::new(InMemoryPreviews::new()));
        s.on_attribute_set_changed(&AttributeSet::from_pairs([("Size", vec!["M"])]).unwrap());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_previews_follow_image_edits_and_teardown() {
        let previews = InMemoryPreviews::new();
        let mut s = CombinationStateStore::new(price(1), vec![], Box::new(previews.clone()));
        s.on_attribute_set_changed(&sizes_and_colors());
        let front = ImageFile::new("front.jpg", 10);
        let back = ImageFile::new("back.jpg", 10);
        s.set_images(0, vec![], vec![front.clone(), back.clone()]).unwrap();
        assert_eq!(previews.live_count(), 2);
        let back_url = s.preview_url(&back.id).cloned().unwrap();

        s.set_field(0, FieldUpdate::ImageFiles(Some(vec![front.clone()]))).unwrap();
        assert_eq!(previews.live_count(), 1);
        assert!(!previews.is_live(&back_url));

        s.set_images(1, vec!["https://cdn.example.com/m-blue.jpg".into()], vec![ImageFile::new("side.jpg", 10)]).unwrap();
        assert_eq!(previews.live_count(), 2);
        drop(s);
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn test_dropped_combination_releases_its_previews() {
        let previews = InMemoryPreviews::new();
        let mut s = CombinationStateStore::new(price(1), vec![], Box::new(previews.clone()));
        s.on_attribute_set_changed(&sizes_and_colors());
        s.set_images(1, vec![], vec![ImageFile::new("blue.jpg", 10)]).unwrap(); // M / Blue
        s.set_images(0, vec![], vec![ImageFile::new("red.jpg", 10)]).unwrap(); // M / Red
        assert_eq!(previews.live_count(), 2);
        let only_red = AttributeSet::from_pairs([("Size", vec!["M", "L"]), ("Color", vec!["Red"])]).unwrap();
        s.on_attribute_set_changed(&only_red);
        assert_eq!(s.len(), 2);
        assert_eq!(previews.live_count(), 1);
    }
}
