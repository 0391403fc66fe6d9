//! Listing models and data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::models::QuantityUnit;

/// A posted food listing
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub quantity_value: f64,
    pub quantity_unit: QuantityUnit,
    /// Total price for the entire quantity (0 = free)
    pub price: f64,
    pub expiry_date: NaiveDate,
    pub pickup_location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub collection_instructions: String,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_photo_url: String,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing availability status
///
/// `requested` and `booked` hold only while a live request exists; the
/// listing reverts to `available` when that request is rejected or expires.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Requested,
    Booked,
    Completed,
}

/// Request DTO for creating a listing
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub quantity_value: f64,
    pub quantity_unit: QuantityUnit,
    pub price: f64,
    pub expiry_date: NaiveDate,
    #[validate(length(min = 1, max = 500))]
    pub pickup_location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub collection_instructions: String,
}

impl CreateListingRequest {
    /// Validate fields the derive cannot express
    pub fn validate_fields(&self) -> Result<(), String> {
        if self.quantity_value <= 0.0 {
            return Err("Quantity must be greater than 0".to_string());
        }
        if self.price < 0.0 {
            return Err("Price must not be negative".to_string());
        }
        Ok(())
    }
}

/// Request DTO for updating a listing (donor only, while still available)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub quantity_value: Option<f64>,
    pub quantity_unit: Option<QuantityUnit>,
    pub price: Option<f64>,
    pub expiry_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 500))]
    pub pickup_location: Option<String>,
    pub collection_instructions: Option<String>,
}

/// Query parameters for the listing catalogue
#[derive(Debug, Deserialize, Default)]
pub struct ListListingsQuery {
    /// Case-insensitive name search
    pub search: Option<String>,
    /// Sort by expiry date: "asc" or "desc"
    pub sort: Option<String>,
}
