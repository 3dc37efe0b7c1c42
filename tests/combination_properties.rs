use opensase_variants::config::EditorConfig;
use opensase_variants::{
    generate, reconcile, should_show_combination_editor, Assignment, AttributeSet, EmittedCombination, FieldUpdate,
    InMemoryPreviews, Price, Quantity, SeedCombination, VariantEditor,
};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

fn price(amount: i64) -> Price { Price::new(Decimal::new(amount, 0)).unwrap() }

fn assignment(pairs: &[(&str, &str)]) -> Assignment { Assignment::from_pairs(pairs.iter().copied()).unwrap() }

fn editor_with_sizes_and_colors() -> VariantEditor {
    let mut editor = VariantEditor::new(&EditorConfig::default(), price(100000), Box::new(InMemoryPreviews::new()));
    editor.create_attribute("Size", ["M", "L"]).unwrap();
    editor.create_attribute("Color", ["Red", "Blue"]).unwrap();
    editor
}

#[test]
fn cartesian_product_is_complete() {
    let set = AttributeSet::from_pairs([("Size", vec!["M", "L"]), ("Color", vec!["Red", "Blue"])]).unwrap();
    let out = generate(&set);
    let expected = vec![
        assignment(&[("Size", "M"), ("Color", "Red")]),
        assignment(&[("Size", "M"), ("Color", "Blue")]),
        assignment(&[("Size", "L"), ("Color", "Red")]),
        assignment(&[("Size", "L"), ("Color", "Blue")]),
    ];
    assert_eq!(out, expected);
}

#[test]
fn key_is_order_independent() {
    assert_eq!(
        assignment(&[("Size", "M"), ("Color", "Red")]).key(),
        assignment(&[("Color", "Red"), ("Size", "M")]).key()
    );
}

#[test]
fn edits_survive_adding_a_value() {
    let mut editor = editor_with_sizes_and_colors();
    let m_red = editor.position([("Size", "M"), ("Color", "Red")]).unwrap();
    editor.set_field(m_red, FieldUpdate::Price(Some(price(150000)))).unwrap();
    editor.set_field(m_red, FieldUpdate::Selected(Some(false))).unwrap();

    editor.add_value_to_attribute("Color", "Green").unwrap();
    assert_eq!(editor.combinations().len(), 6);

    let m_red = &editor.combinations()[editor.position([("Size", "M"), ("Color", "Red")]).unwrap()];
    assert_eq!(m_red.price, price(150000));
    assert!(!m_red.selected);

    let greens: Vec<_> = editor
        .combinations()
        .iter()
        .filter(|c| c.title().ends_with("Green"))
        .collect();
    assert_eq!(greens.len(), 2);
    assert!(greens.iter().all(|c| c.price == price(100000) && c.stock_quantity.is_zero() && c.selected));
}

#[test]
fn seed_initializes_price_and_stock() {
    let set = AttributeSet::from_pairs([("Size", vec!["M", "L"])]).unwrap();
    let mut seed = SeedCombination::new(assignment(&[("Size", "M")]));
    seed.price_adjustment = Some(Decimal::new(20000, 0));
    seed.stock_quantity = Some(Quantity::new(5));
    let out = reconcile(&generate(&set), &[], &[seed], price(100000));
    assert_eq!(out[0].price, price(120000));
    assert_eq!(out[0].stock_quantity, Quantity::new(5));
    assert!(out[0].selected);
}

#[test]
fn price_adjustment_is_derived_on_emit() {
    let mut editor = editor_with_sizes_and_colors();
    editor.set_field(0, FieldUpdate::Price(Some(price(90000)))).unwrap();
    assert_eq!(editor.selected_for_emit()[0].price_adjustment, Decimal::new(-10000, 0));
    editor.set_field(0, FieldUpdate::Price(Some(price(95000)))).unwrap();
    assert_eq!(editor.selected_for_emit()[0].price_adjustment, Decimal::new(-5000, 0));
}

#[test]
fn removing_an_attribute_collapses_combinations() {
    let mut editor = editor_with_sizes_and_colors();
    editor.set_field(0, FieldUpdate::StockQuantity(Some(Quantity::new(3)))).unwrap(); // M / Red
    editor.set_field(1, FieldUpdate::StockQuantity(Some(Quantity::new(9)))).unwrap(); // M / Blue
    editor.set_field(3, FieldUpdate::StockQuantity(Some(Quantity::new(1)))).unwrap(); // L / Blue

    assert!(editor.remove_attribute("Color"));
    let titles: Vec<_> = editor.combinations().iter().map(|c| c.title()).collect();
    assert_eq!(titles, vec!["M", "L"]);
    // first match in generation order wins
    assert_eq!(editor.combinations()[0].stock_quantity, Quantity::new(3));
    assert!(editor.combinations()[1].stock_quantity.is_zero());
}

#[test]
fn degenerate_single_value_is_not_a_variant_scenario() {
    let show = |pairs: Vec<(&str, Vec<&str>)>| should_show_combination_editor(&AttributeSet::from_pairs(pairs).unwrap());
    assert!(!show(vec![("Size", vec!["M"])]));
    assert!(show(vec![("Size", vec!["M", "L"])]));
    assert!(show(vec![("Size", vec!["M"]), ("Color", vec!["Red"])]));

    let mut editor = VariantEditor::new(&EditorConfig::default(), price(1), Box::new(InMemoryPreviews::new()));
    editor.add_attribute("Size", "M").unwrap();
    assert_eq!(editor.combinations().len(), 1);
    assert!(!editor.should_show_combination_editor());
}

#[test]
fn emit_filters_deselected() {
    let mut editor = editor_with_sizes_and_colors();
    let emitted: Arc<Mutex<Vec<usize>>> = Arc::default();
    let sink = emitted.clone();
    editor.subscribe(Box::new(move |snapshot: &[EmittedCombination]| sink.lock().unwrap().push(snapshot.len())));

    let l_red = editor.position([("Size", "L"), ("Color", "Red")]).unwrap();
    editor.set_field(l_red, FieldUpdate::Selected(Some(false))).unwrap();
    let out = editor.selected_for_emit();
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|c| c.assignment != assignment(&[("Size", "L"), ("Color", "Red")])));
    assert_eq!(*emitted.lock().unwrap(), vec![3]);
}

#[test]
fn previews_are_released_when_combinations_go_away() {
    let previews = InMemoryPreviews::new();
    let mut editor = VariantEditor::new(&EditorConfig::default(), price(1), Box::new(previews.clone()));
    editor.create_attribute("Size", ["M", "L"]).unwrap();
    editor.create_attribute("Color", ["Red", "Blue"]).unwrap();
    for i in 0..4 {
        editor.set_images(i, vec![], vec![opensase_variants::ImageFile::new(format!("{i}.jpg"), 100)]).unwrap();
    }
    assert_eq!(previews.live_count(), 4);

    // M and L keep the files from their Red combinations; the Blue ones are released
    editor.remove_attribute("Color");
    assert_eq!(previews.live_count(), 2);

    drop(editor);
    assert_eq!(previews.live_count(), 0);
}
