//! Review service layer - mutual rating for completed pickups

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::profile::ProfileService;
use crate::request::{PickupRequest, RequestStatus};
use crate::review::{PublicReview, RaterRole, Review, SubmitReviewRequest, MAX_COMMENT_LENGTH};

/// Service for submitting and reading reviews
#[derive(Clone)]
pub struct ReviewService {
    db_pool: PgPool,
    profile_service: ProfileService,
}

impl ReviewService {
    /// Create new review service instance
    pub fn new(db_pool: PgPool, profile_service: ProfileService) -> Self {
        Self {
            db_pool,
            profile_service,
        }
    }

    /// Submit one side's rating for a completed request.
    ///
    /// The (request, role) uniqueness is held by an index, so a racing
    /// double submit resolves to one success and one `AlreadyRated` no
    /// matter how the callers interleave.
    pub async fn submit_review(
        &self,
        rater_email: &str,
        request: SubmitReviewRequest,
    ) -> ApiResult<Review> {
        request.validate()?;

        let pickup =
            sqlx::query_as::<_, PickupRequest>("SELECT * FROM requests WHERE id = $1")
                .bind(request.request_id)
                .fetch_optional(&self.db_pool)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Request {}", request.request_id)))?;

        if pickup.status != RequestStatus::Completed {
            return Err(ApiError::WrongState(
                "Request is not completed yet".to_string(),
            ));
        }

        // The rater must be the side they claim, that side must not have
        // rated yet, and the recipient must be the counterparty.
        let (expected_rater, already_rated, other_party) = match request.rater_role {
            RaterRole::Buyer => (
                &pickup.requester_email,
                pickup.buyer_rated,
                &pickup.donor_email,
            ),
            RaterRole::Donor => (
                &pickup.donor_email,
                pickup.donor_rated,
                &pickup.requester_email,
            ),
        };

        if expected_rater != rater_email {
            return Err(ApiError::Forbidden(
                "You are not a party to this request".to_string(),
            ));
        }
        if already_rated {
            return Err(ApiError::AlreadyRated);
        }
        if &request.to_email != other_party {
            return Err(ApiError::InvalidRecipient);
        }

        let mut comment = request.comment.unwrap_or_default();
        comment.truncate(MAX_COMMENT_LENGTH);

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (
                id, request_id, rater_role, from_email, to_email,
                rating, comment, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.request_id)
        .bind(request.rater_role)
        .bind(rater_email)
        .bind(&request.to_email)
        .bind(request.rating)
        .bind(&comment)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ApiError::AlreadyRated
            } else {
                e.into()
            }
        })?;

        let flag_column = match request.rater_role {
            RaterRole::Buyer => "buyer_rated",
            RaterRole::Donor => "donor_rated",
        };
        sqlx::query(&format!(
            "UPDATE requests SET {flag_column} = TRUE WHERE id = $1 AND {flag_column} = FALSE"
        ))
        .bind(request.request_id)
        .execute(&self.db_pool)
        .await?;

        self.profile_service
            .record_rating(&request.to_email, request.rating)
            .await?;

        tracing::info!(
            request_id = %request.request_id,
            role = ?review.rater_role,
            rating = review.rating,
            "Review submitted"
        );

        Ok(review)
    }

    /// Latest reviews received by a user (public projection, capped at 50)
    pub async fn reviews_for(&self, email: &str) -> ApiResult<Vec<PublicReview>> {
        let reviews = sqlx::query_as::<_, PublicReview>(
            r#"
            SELECT rating, comment, rater_role, created_at
            FROM reviews
            WHERE to_email = $1
            ORDER BY created_at DESC
            LIMIT 50
            "#,
        )
        .bind(email)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(reviews)
    }
}
