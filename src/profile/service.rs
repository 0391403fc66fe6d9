//! Profile service layer - reputation and statistics bookkeeping
//!
//! All counters are mutated with atomic `SET x = x + delta` increments so
//! concurrent lifecycle operations never clobber each other's updates.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::profile::{PublicProfile, UpdateProfileRequest, UserProfile, DEFAULT_AVERAGE_RATING};

/// Service for managing user profiles and their statistics
#[derive(Clone)]
pub struct ProfileService {
    db_pool: PgPool,
}

impl ProfileService {
    /// Create new profile service instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Get a profile, creating an empty one on first contact.
    ///
    /// Creation is an `ON CONFLICT DO NOTHING` insert so two racing
    /// first-time callers cannot fail on the email uniqueness constraint.
    pub async fn ensure_profile(&self, email: &str) -> ApiResult<UserProfile> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, email, average_rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(DEFAULT_AVERAGE_RATING)
        .bind(now)
        .execute(&self.db_pool)
        .await?;

        self.get_profile(email).await
    }

    /// Get a profile by email
    pub async fn get_profile(&self, email: &str) -> ApiResult<UserProfile> {
        let profile =
            sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.db_pool)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("User {}", email)))?;

        Ok(profile)
    }

    /// Public projection of a profile
    pub async fn public_profile(&self, email: &str) -> ApiResult<PublicProfile> {
        Ok(self.get_profile(email).await?.into())
    }

    /// Update a user's own display fields
    pub async fn update_profile(
        &self,
        email: &str,
        update: UpdateProfileRequest,
    ) -> ApiResult<UserProfile> {
        self.ensure_profile(email).await?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles SET
                name = COALESCE($1, name),
                photo_url = COALESCE($2, photo_url),
                bio = COALESCE($3, bio),
                collection_instructions = COALESCE($4, collection_instructions),
                updated_at = $5
            WHERE email = $6
            RETURNING *
            "#,
        )
        .bind(update.name)
        .bind(update.photo_url)
        .bind(update.bio)
        .bind(update.collection_instructions)
        .bind(Utc::now())
        .bind(email)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(profile)
    }

    /// Bump the donor's donation counters after a listing is posted
    pub async fn record_donation(&self, email: &str, donated_kg: f64) -> ApiResult<()> {
        sqlx::query(
            r#"
            UPDATE user_profiles SET
                donations_count = donations_count + 1,
                total_food_donated_kg = total_food_donated_kg + $1,
                updated_at = $2
            WHERE email = $3
            "#,
        )
        .bind(donated_kg)
        .bind(Utc::now())
        .bind(email)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    /// Bump a requester's accepted-request counter on approval
    pub async fn record_accepted_request(&self, email: &str) -> ApiResult<()> {
        sqlx::query(
            r#"
            UPDATE user_profiles SET
                accepted_requests = accepted_requests + 1,
                updated_at = $1
            WHERE email = $2
            "#,
        )
        .bind(Utc::now())
        .bind(email)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    /// Credit both parties after a confirmed handoff
    pub async fn record_completion(
        &self,
        requester_email: &str,
        donor_email: &str,
        quantity_kg: f64,
    ) -> ApiResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE user_profiles SET
                pickups_completed = pickups_completed + 1,
                total_food_saved_kg = total_food_saved_kg + $1,
                updated_at = $2
            WHERE email = $3
            "#,
        )
        .bind(quantity_kg)
        .bind(now)
        .bind(requester_email)
        .execute(&self.db_pool)
        .await?;

        sqlx::query(
            r#"
            UPDATE user_profiles SET
                pickups_given = pickups_given + 1,
                total_food_saved_kg = total_food_saved_kg + $1,
                updated_at = $2
            WHERE email = $3
            "#,
        )
        .bind(quantity_kg)
        .bind(now)
        .bind(donor_email)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    /// Apply one rating to the target's accumulators.
    ///
    /// Sum, count, and the derived average move in a single statement; the
    /// right-hand side reads the pre-update values, so concurrent ratings
    /// both land.
    pub async fn record_rating(&self, to_email: &str, rating: i32) -> ApiResult<()> {
        sqlx::query(
            r#"
            UPDATE user_profiles SET
                rating_sum = rating_sum + $1,
                total_ratings = total_ratings + 1,
                average_rating = ROUND(
                    (rating_sum + $1)::numeric / (total_ratings + 1), 2
                )::double precision,
                updated_at = $2
            WHERE email = $3
            "#,
        )
        .bind(rating as i64)
        .bind(Utc::now())
        .bind(to_email)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }
}
