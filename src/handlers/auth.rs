//! Token issue endpoint
//!
//! The external auth collaborator exchanges a verified email for an API
//! token here. The first exchange also creates the user's profile row.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::issue_token;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Issue an API token for an authenticated email
pub async fn create_token(
    State(app_state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    request.validate()?;

    // Lazy profile creation on first authentication
    app_state
        .profile_service
        .ensure_profile(&request.email)
        .await?;

    let token = issue_token(&app_state.auth_keys, &request.email)
        .map_err(|e| ApiError::InternalError(format!("Failed to sign token: {}", e)))?;

    Ok(Json(TokenResponse { token }))
}
