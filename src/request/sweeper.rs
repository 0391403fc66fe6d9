//! Background sweep for stale requests and expired listings

use chrono::Local;
use std::sync::Arc;
use std::time::Duration;

use crate::listing::ListingService;
use crate::request::RequestService;

/// Background job expiring stale pending requests and purging expired
/// available listings.
///
/// The sweep holds no state of its own; each pass is idempotent, so it may
/// be re-run at any time and races with user actions resolve through the
/// services' status-guarded updates. Runs once immediately, then on the
/// configured interval.
pub async fn expiry_sweeper(
    request_service: Arc<RequestService>,
    listing_service: Arc<ListingService>,
    interval_seconds: u64,
) {
    tracing::info!(interval_seconds, "Starting expiry sweeper");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

    loop {
        interval.tick().await;

        if let Err(e) = request_service.expire_stale_requests().await {
            tracing::error!(error = %e, "Error expiring stale requests");
        }

        match listing_service
            .purge_expired_listings(Local::now().date_naive())
            .await
        {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "Removed expired listings"),
            Err(e) => tracing::error!(error = %e, "Error purging expired listings"),
        }
    }
}
