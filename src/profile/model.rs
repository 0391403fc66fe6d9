//! User profile models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Aggregated reputation and statistics record, keyed by email
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub bio: String,
    /// Default pickup instructions copied onto approved requests
    pub collection_instructions: String,
    pub donations_count: i64,
    pub accepted_requests: i64,
    pub pickups_completed: i64,
    pub pickups_given: i64,
    pub total_food_donated_kg: f64,
    pub total_food_saved_kg: f64,
    pub rating_sum: i64,
    pub total_ratings: i64,
    /// rating_sum / total_ratings, 5.0 while unrated
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Neutral rating shown before anyone has rated a user
pub const DEFAULT_AVERAGE_RATING: f64 = 5.0;

impl UserProfile {
    /// Average rating recomputed from the accumulators, 2 decimals.
    ///
    /// Guards against stale stored averages and the 0/0 case.
    pub fn safe_average_rating(&self) -> f64 {
        if self.total_ratings > 0 {
            (self.rating_sum as f64 / self.total_ratings as f64 * 100.0).round() / 100.0
        } else {
            DEFAULT_AVERAGE_RATING
        }
    }

    /// Share of given pickups the requester side actually completed, in
    /// percent. 100 when the user has never given a pickup.
    pub fn pickup_rate(&self) -> i64 {
        if self.pickups_given > 0 {
            ((self.pickups_completed as f64 / self.pickups_given as f64) * 100.0).round() as i64
        } else {
            100
        }
    }
}

/// Request DTO for a user updating their own profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub photo_url: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(length(max = 500))]
    pub collection_instructions: Option<String>,
}

/// Public projection of a profile, safe to show to anyone
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub bio: String,
    pub pickups_given: i64,
    pub pickups_completed: i64,
    pub total_food_saved_kg: f64,
    pub average_rating: f64,
    pub total_ratings: i64,
    pub pickup_rate: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for PublicProfile {
    fn from(profile: UserProfile) -> Self {
        PublicProfile {
            pickup_rate: profile.pickup_rate(),
            average_rating: profile.safe_average_rating(),
            email: profile.email,
            name: profile.name,
            photo_url: profile.photo_url,
            bio: profile.bio,
            pickups_given: profile.pickups_given,
            pickups_completed: profile.pickups_completed,
            total_food_saved_kg: profile.total_food_saved_kg,
            total_ratings: profile.total_ratings,
            created_at: profile.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with(rating_sum: i64, total_ratings: i64, given: i64, completed: i64) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            name: String::new(),
            photo_url: String::new(),
            bio: String::new(),
            collection_instructions: String::new(),
            donations_count: 0,
            accepted_requests: 0,
            pickups_completed: completed,
            pickups_given: given,
            total_food_donated_kg: 0.0,
            total_food_saved_kg: 0.0,
            rating_sum,
            total_ratings,
            average_rating: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_safe_average_rating() {
        assert_eq!(profile_with(0, 0, 0, 0).safe_average_rating(), 5.0);
        assert_eq!(profile_with(9, 2, 0, 0).safe_average_rating(), 4.5);
        assert_eq!(profile_with(10, 3, 0, 0).safe_average_rating(), 3.33);
    }

    #[test]
    fn test_pickup_rate() {
        assert_eq!(profile_with(0, 0, 0, 0).pickup_rate(), 100);
        assert_eq!(profile_with(0, 0, 4, 3).pickup_rate(), 75);
        assert_eq!(profile_with(0, 0, 3, 3).pickup_rate(), 100);
    }
}
