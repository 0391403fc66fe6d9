//! Pickup-request API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::request::{CreateRequestRequest, DecideRequest, PickupRequest};
use crate::state::AppState;

/// Claim an available listing
pub async fn create_request(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateRequestRequest>,
) -> ApiResult<Json<PickupRequest>> {
    let pickup = app_state
        .request_service
        .create_request(&user.email, &request.listing_id)
        .await?;

    Ok(Json(pickup))
}

/// Donor approves or rejects a pending request
pub async fn decide_request(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<DecideRequest>,
) -> ApiResult<Json<PickupRequest>> {
    let pickup = app_state
        .request_service
        .decide(&user.email, &id, request.decision)
        .await?;

    Ok(Json(pickup))
}

/// Requester confirms they collected the food
pub async fn buyer_confirm(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PickupRequest>> {
    let pickup = app_state
        .request_service
        .buyer_confirm(&user.email, &id)
        .await?;

    Ok(Json(pickup))
}

/// Donor confirms the handoff, completing the request
pub async fn donor_confirm(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PickupRequest>> {
    let pickup = app_state
        .request_service
        .donor_confirm(&user.email, &id)
        .await?;

    Ok(Json(pickup))
}

/// Requests the caller has made
pub async fn outgoing_requests(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<PickupRequest>>> {
    let requests = app_state
        .request_service
        .requests_by_requester(&user.email)
        .await?;

    Ok(Json(requests))
}

/// Requests on the caller's listings
pub async fn incoming_requests(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<PickupRequest>>> {
    let requests = app_state
        .request_service
        .requests_by_donor(&user.email)
        .await?;

    Ok(Json(requests))
}
