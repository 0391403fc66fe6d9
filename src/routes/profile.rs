//! Profile route definitions

use axum::{
    routing::{get, patch},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profiles/me", get(get_my_profile))
        .route("/api/profiles/me", patch(update_my_profile))
        .route("/api/profiles/:email", get(get_public_profile))
}
