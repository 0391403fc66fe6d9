//! Pickup request models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::QuantityUnit;

/// One requester's claim on a listing, with its own lifecycle
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct PickupRequest {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub requester_name: String,
    pub requester_email: String,
    pub requester_photo_url: String,
    pub donor_email: String,
    /// Snapshot of the listing at request time
    pub quantity_value: f64,
    pub quantity_unit: QuantityUnit,
    pub price: f64,
    pub status: RequestStatus,
    /// One-time pickup verification code, set on approval
    pub security_code: Option<String>,
    /// Donor's pickup instructions, copied on approval
    pub collection_instructions: Option<String>,
    pub buyer_confirmed: bool,
    pub donor_confirmed: bool,
    pub buyer_rated: bool,
    pub donor_rated: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Request lifecycle status
///
/// Transitions are one-directional: `pending` may move to `approved`,
/// `rejected`, or `expired`; `approved` may move to `completed`. The four
/// non-pending states are terminal.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Expired,
}

impl RequestStatus {
    /// Whether the request can still change state
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

/// Donor's verdict on a pending request
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

/// Request DTO for claiming a listing
#[derive(Debug, Deserialize)]
pub struct CreateRequestRequest {
    pub listing_id: Uuid,
}

/// Request DTO for the donor's approve/reject decision
#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub decision: Decision,
}
