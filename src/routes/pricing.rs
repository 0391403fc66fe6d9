//! Pricing route definitions

use axum::{routing::post, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn pricing_routes() -> Router<AppState> {
    Router::new().route("/api/pricing/evaluate", post(check_price))
}
