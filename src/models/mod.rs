//! Shared domain types used across modules

use serde::{Deserialize, Serialize};

/// Unit a food quantity is expressed in
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "quantity_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    Item,
    Kg,
    G,
    Portion,
}

impl QuantityUnit {
    /// Convert a quantity in this unit to kilograms.
    ///
    /// Items and portions use fixed average weights (0.5 kg and 0.4 kg).
    /// Non-positive quantities normalize to zero.
    pub fn to_kg(self, value: f64) -> f64 {
        if value <= 0.0 {
            return 0.0;
        }

        match self {
            QuantityUnit::Kg => value,
            QuantityUnit::G => value / 1000.0,
            QuantityUnit::Item => value * 0.5,
            QuantityUnit::Portion => value * 0.4,
        }
    }
}
