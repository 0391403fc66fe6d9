//! Review route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", post(submit_review))
        .route("/api/reviews/:email", get(public_reviews))
}
