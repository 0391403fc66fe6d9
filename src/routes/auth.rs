//! Auth route definitions

use axum::{routing::post, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/token", post(create_token))
}
