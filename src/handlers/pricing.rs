//! Pricing advisory handler

use axum::Json;
use serde::Serialize;

use crate::error::ApiResult;
use crate::pricing::{evaluate_price, PriceCheckInput, PriceVerdict};

/// Advisory price check response; `verdict` is null when no verdict can be
/// given for the input (zero quantity or negative price)
#[derive(Debug, Serialize)]
pub struct PriceCheckResponse {
    pub verdict: Option<PriceVerdict>,
}

/// Evaluate a proposed price. Advisory only - never blocks submission.
pub async fn check_price(Json(input): Json<PriceCheckInput>) -> ApiResult<Json<PriceCheckResponse>> {
    Ok(Json(PriceCheckResponse {
        verdict: evaluate_price(&input),
    }))
}
