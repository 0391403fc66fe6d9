//! Pickup-request route definitions

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/api/requests", post(create_request))
        .route("/api/requests/outgoing", get(outgoing_requests))
        .route("/api/requests/incoming", get(incoming_requests))
        .route("/api/requests/:id/decision", patch(decide_request))
        .route("/api/requests/:id/buyer-confirm", patch(buyer_confirm))
        .route("/api/requests/:id/donor-confirm", patch(donor_confirm))
}
