//! Pricing fairness evaluator for PlateShare
//!
//! This module implements the advisory price check shown to donors while
//! they fill in a listing. The verdict is advisory only - it never blocks
//! submission.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::QuantityUnit;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Base price per kilogram by item type (currency units)
const BASE_PRICE_PER_KG: &[(&str, f64)] = &[
    ("bread", 4.0),
    ("rice", 6.0),
    ("chicken", 12.0),
    ("vegetables", 5.0),
    ("fruits", 5.0),
    ("cooked_meal", 10.0),
];

/// Base price per kilogram for unknown item types
const DEFAULT_BASE_PRICE_PER_KG: f64 = 6.0;

/// Price ratio above which a price is considered unfair
const UNFAIR_RATIO: f64 = 1.4;

/// Price ratio above which a price is considered slightly high
const SLIGHTLY_HIGH_RATIO: f64 = 1.1;

/// Price ratio below which a price is considered a very good value
const GOOD_VALUE_RATIO: f64 = 0.6;

// ============================================================================
// Data Models
// ============================================================================

/// Input to the price evaluation
#[derive(Debug, Deserialize, Clone)]
pub struct PriceCheckInput {
    /// Item type key, e.g. "bread" or "cooked_meal"
    pub item_type: String,

    /// Listing expiry date
    pub expiry_date: NaiveDate,

    /// Quantity being listed
    pub quantity_value: f64,

    /// Unit the quantity is expressed in
    pub quantity_unit: QuantityUnit,

    /// Proposed total price for the entire quantity
    pub user_price: f64,
}

/// Fairness verdict for a proposed price
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Fair,
    #[serde(rename = "Slightly High")]
    SlightlyHigh,
    Unfair,
}

/// Result of the price evaluation
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PriceVerdict {
    pub verdict: Verdict,
    pub message: String,
    /// Expected total price, formatted to 2 decimals
    pub suggested_price: String,
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate a proposed total price against today's date.
///
/// Returns `None` when the quantity normalizes to zero or the price is
/// negative - no verdict can be given for such input.
pub fn evaluate_price(input: &PriceCheckInput) -> Option<PriceVerdict> {
    evaluate_price_at(input, Local::now().date_naive())
}

/// Evaluate a proposed total price against an explicit "today".
///
/// Pure and deterministic: identical inputs always yield identical output.
pub fn evaluate_price_at(input: &PriceCheckInput, today: NaiveDate) -> Option<PriceVerdict> {
    let quantity_kg = input.quantity_unit.to_kg(input.quantity_value);

    if quantity_kg <= 0.0 || input.user_price < 0.0 {
        return None;
    }

    let base_price_per_kg = base_price_for(&input.item_type);
    let days_to_expiry = (input.expiry_date - today).num_days();

    let expected_total = base_price_per_kg
        * quantity_kg
        * expiry_factor(days_to_expiry)
        * bulk_factor(quantity_kg);

    if input.user_price == 0.0 {
        return Some(PriceVerdict {
            verdict: Verdict::Fair,
            message: "It's Free! This is the best possible value.".to_string(),
            suggested_price: format!("{:.2}", expected_total),
        });
    }

    let ratio = input.user_price / expected_total;

    let (verdict, message) = if ratio > UNFAIR_RATIO {
        (
            Verdict::Unfair,
            "Price is too high for the quantity and expiry.",
        )
    } else if ratio > SLIGHTLY_HIGH_RATIO {
        (
            Verdict::SlightlyHigh,
            "Price is slightly higher than expected.",
        )
    } else if ratio < GOOD_VALUE_RATIO {
        (Verdict::Fair, "Very good value, likely to sell quickly.")
    } else {
        (Verdict::Fair, "Price is reasonable for a surplus item.")
    };

    Some(PriceVerdict {
        verdict,
        message: message.to_string(),
        suggested_price: format!("{:.2}", expected_total),
    })
}

/// Base price per kilogram for an item type (default for unknown types)
fn base_price_for(item_type: &str) -> f64 {
    BASE_PRICE_PER_KG
        .iter()
        .find(|(key, _)| *key == item_type)
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_BASE_PRICE_PER_KG)
}

/// Discount factor for items close to expiry
fn expiry_factor(days_to_expiry: i64) -> f64 {
    if days_to_expiry <= 1 {
        0.4
    } else if days_to_expiry <= 3 {
        0.6
    } else if days_to_expiry <= 5 {
        0.8
    } else {
        1.0
    }
}

/// Discount factor for bulk quantities
fn bulk_factor(quantity_kg: f64) -> f64 {
    if quantity_kg >= 100.0 {
        0.5
    } else if quantity_kg >= 10.0 {
        0.7
    } else if quantity_kg >= 2.0 {
        0.85
    } else {
        1.0
    }
}
