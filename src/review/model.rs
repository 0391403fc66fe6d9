//! Review models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Longest comment stored with a rating
pub const MAX_COMMENT_LENGTH: usize = 500;

/// One rating event from one party to the other for a completed request
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Review {
    pub id: Uuid,
    pub request_id: Uuid,
    pub rater_role: RaterRole,
    pub from_email: String,
    pub to_email: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Which side of the pickup is rating
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "rater_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RaterRole {
    Buyer,
    Donor,
}

/// Request DTO for submitting a review
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    pub request_id: Uuid,
    #[validate(email)]
    pub to_email: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    pub comment: Option<String>,
    pub rater_role: RaterRole,
}

/// Public projection of a review, safe to show to anyone
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PublicReview {
    pub rating: i32,
    pub comment: String,
    pub rater_role: RaterRole,
    pub created_at: DateTime<Utc>,
}
