//! Listing-related API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::listing::{CreateListingRequest, ListListingsQuery, Listing, UpdateListingRequest};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Post a new listing
pub async fn create_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateListingRequest>,
) -> ApiResult<Json<Listing>> {
    let listing = app_state
        .listing_service
        .create_listing(&user.email, request)
        .await?;

    Ok(Json(listing))
}

/// Browse the catalogue, with optional search and expiry sort
pub async fn list_listings(
    State(app_state): State<AppState>,
    Query(query): Query<ListListingsQuery>,
) -> ApiResult<Json<Vec<Listing>>> {
    let listings = app_state.listing_service.list_listings(query).await?;
    Ok(Json(listings))
}

/// The caller's own listings that are still in play
pub async fn my_listings(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Listing>>> {
    let listings = app_state
        .listing_service
        .listings_by_donor(&user.email)
        .await?;

    Ok(Json(listings))
}

/// Get a single listing by ID
pub async fn get_listing(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Listing>> {
    let listing = app_state.listing_service.get_listing(&id).await?;
    Ok(Json(listing))
}

/// Update a listing (donor only, while still available)
pub async fn update_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> ApiResult<Json<Listing>> {
    let listing = app_state
        .listing_service
        .update_listing(&user.email, &id, request)
        .await?;

    Ok(Json(listing))
}

/// Delete a listing (donor only)
pub async fn delete_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    app_state
        .listing_service
        .delete_listing(&user.email, &id)
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
