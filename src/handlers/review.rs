//! Review API handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::review::{PublicReview, Review, SubmitReviewRequest};
use crate::state::AppState;

/// Rate the other party of a completed request
pub async fn submit_review(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<SubmitReviewRequest>,
) -> ApiResult<Json<Review>> {
    let review = app_state
        .review_service
        .submit_review(&user.email, request)
        .await?;

    Ok(Json(review))
}

/// Latest reviews received by a user
pub async fn public_reviews(
    State(app_state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<PublicReview>>> {
    let reviews = app_state.review_service.reviews_for(&email).await?;
    Ok(Json(reviews))
}
