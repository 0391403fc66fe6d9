//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::listing::ListingService;
use crate::middleware::AuthKeys;
use crate::profile::ProfileService;
use crate::request::RequestService;
use crate::review::ReviewService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub listing_service: Arc<ListingService>,
    pub request_service: Arc<RequestService>,
    pub profile_service: Arc<ProfileService>,
    pub review_service: Arc<ReviewService>,
    pub auth_keys: AuthKeys,
    pub db_pool: PgPool,
}

impl AppState {
    pub fn new(
        listing_service: Arc<ListingService>,
        request_service: Arc<RequestService>,
        profile_service: Arc<ProfileService>,
        review_service: Arc<ReviewService>,
        auth_keys: AuthKeys,
        db_pool: PgPool,
    ) -> Self {
        Self {
            listing_service,
            request_service,
            profile_service,
            review_service,
            auth_keys,
            db_pool,
        }
    }
}

impl FromRef<AppState> for AuthKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_keys.clone()
    }
}

impl FromRef<AppState> for Arc<ListingService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.listing_service.clone()
    }
}

impl FromRef<AppState> for Arc<RequestService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.request_service.clone()
    }
}

impl FromRef<AppState> for Arc<ProfileService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.profile_service.clone()
    }
}

impl FromRef<AppState> for Arc<ReviewService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.review_service.clone()
    }
}
