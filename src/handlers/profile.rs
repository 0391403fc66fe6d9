//! Profile API handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::profile::{PublicProfile, UpdateProfileRequest, UserProfile};
use crate::state::AppState;

/// The caller's own profile, created lazily on first read
pub async fn get_my_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<UserProfile>> {
    let mut profile = app_state.profile_service.ensure_profile(&user.email).await?;
    profile.average_rating = profile.safe_average_rating();

    Ok(Json(profile))
}

/// Update the caller's own display fields
pub async fn update_my_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    use validator::Validate;
    request.validate()?;

    let profile = app_state
        .profile_service
        .update_profile(&user.email, request)
        .await?;

    Ok(Json(profile))
}

/// Public view of any user's profile
pub async fn get_public_profile(
    State(app_state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<PublicProfile>> {
    let profile = app_state.profile_service.public_profile(&email).await?;
    Ok(Json(profile))
}
