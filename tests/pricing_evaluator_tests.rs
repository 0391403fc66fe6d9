//! Pricing evaluator tests
//!
//! These tests validate the advisory pricing logic with various scenarios
//! including the no-verdict cases, the free path, and each ratio branch.

use chrono::NaiveDate;

use plateshare_server::models::QuantityUnit;
use plateshare_server::pricing::{evaluate_price_at, PriceCheckInput, Verdict};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
}

fn input(
    item_type: &str,
    days_to_expiry: i64,
    quantity_value: f64,
    quantity_unit: QuantityUnit,
    user_price: f64,
) -> PriceCheckInput {
    PriceCheckInput {
        item_type: item_type.to_string(),
        expiry_date: today() + chrono::Duration::days(days_to_expiry),
        quantity_value,
        quantity_unit,
        user_price,
    }
}

// ============================================================================
// No-verdict cases
// ============================================================================

#[test]
fn test_zero_quantity_gives_no_verdict() {
    let result = evaluate_price_at(&input("bread", 3, 0.0, QuantityUnit::Kg, 5.0), today());
    assert!(result.is_none());
}

#[test]
fn test_negative_quantity_gives_no_verdict() {
    let result = evaluate_price_at(&input("bread", 3, -2.0, QuantityUnit::Item, 5.0), today());
    assert!(result.is_none());
}

#[test]
fn test_negative_price_gives_no_verdict() {
    let result = evaluate_price_at(&input("bread", 3, 2.0, QuantityUnit::Kg, -0.01), today());
    assert!(result.is_none());
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_identical_inputs_yield_identical_output() {
    let check = input("rice", 4, 5.0, QuantityUnit::Kg, 12.0);
    let first = evaluate_price_at(&check, today()).unwrap();
    let second = evaluate_price_at(&check, today()).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Free listings
// ============================================================================

#[test]
fn test_free_cooked_meal_is_fair() {
    // One cooked meal expiring today, given away for free
    let result =
        evaluate_price_at(&input("cooked_meal", 0, 1.0, QuantityUnit::Item, 0.0), today()).unwrap();

    assert_eq!(result.verdict, Verdict::Fair);
    assert!(result.message.contains("Free"));
    // 10/kg * 0.5kg * 0.4 expiry factor
    assert_eq!(result.suggested_price, "2.00");
}

// ============================================================================
// Ratio branches
// ============================================================================

#[test]
fn test_overpriced_bread_is_unfair() {
    // 2kg of bread expiring tomorrow: expected 4 * 2 * 0.4 * 0.85 = 2.72,
    // so 100 is far above the unfair threshold
    let result = evaluate_price_at(&input("bread", 1, 2.0, QuantityUnit::Kg, 100.0), today()).unwrap();

    assert_eq!(result.verdict, Verdict::Unfair);
    assert_eq!(result.suggested_price, "2.72");
}

#[test]
fn test_slightly_high_price() {
    // 1kg of bread, far from expiry: expected 4.00; 5.00 is ratio 1.25
    let result = evaluate_price_at(&input("bread", 10, 1.0, QuantityUnit::Kg, 5.0), today()).unwrap();

    assert_eq!(result.verdict, Verdict::SlightlyHigh);
}

#[test]
fn test_very_good_value_is_fair() {
    // Expected 4.00; 1.50 is ratio 0.375
    let result = evaluate_price_at(&input("bread", 10, 1.0, QuantityUnit::Kg, 1.5), today()).unwrap();

    assert_eq!(result.verdict, Verdict::Fair);
    assert!(result.message.contains("Very good value"));
}

#[test]
fn test_reasonable_price_is_fair() {
    // Expected 4.00; 4.00 is ratio 1.0
    let result = evaluate_price_at(&input("bread", 10, 1.0, QuantityUnit::Kg, 4.0), today()).unwrap();

    assert_eq!(result.verdict, Verdict::Fair);
    assert!(result.message.contains("reasonable"));
}

// ============================================================================
// Discount factors
// ============================================================================

#[test]
fn test_expiry_proximity_lowers_expected_price() {
    let far = evaluate_price_at(&input("rice", 30, 1.0, QuantityUnit::Kg, 0.0), today()).unwrap();
    let close = evaluate_price_at(&input("rice", 1, 1.0, QuantityUnit::Kg, 0.0), today()).unwrap();

    assert_eq!(far.suggested_price, "6.00");
    assert_eq!(close.suggested_price, "2.40");
}

#[test]
fn test_bulk_quantity_lowers_expected_price_per_kg() {
    // 100kg of rice, far out: 6 * 100 * 0.5 bulk factor
    let bulk = evaluate_price_at(&input("rice", 30, 100.0, QuantityUnit::Kg, 0.0), today()).unwrap();
    assert_eq!(bulk.suggested_price, "300.00");
}

#[test]
fn test_unknown_item_type_uses_default_base_price() {
    let result =
        evaluate_price_at(&input("durian_surprise", 30, 1.0, QuantityUnit::Kg, 0.0), today())
            .unwrap();
    assert_eq!(result.suggested_price, "6.00");
}

// ============================================================================
// Unit normalization
// ============================================================================

#[test]
fn test_portion_and_gram_normalization() {
    // 5 portions = 2kg: 10 * 2 * 0.85 bulk
    let portions =
        evaluate_price_at(&input("cooked_meal", 30, 5.0, QuantityUnit::Portion, 0.0), today())
            .unwrap();
    assert_eq!(portions.suggested_price, "17.00");

    // 500g of bread = 0.5kg
    let grams = evaluate_price_at(&input("bread", 30, 500.0, QuantityUnit::G, 0.0), today()).unwrap();
    assert_eq!(grams.suggested_price, "2.00");
}
