//! Request lifecycle service - state transitions for pickup requests
//!
//! Every state-changing statement carries a predicate on the current
//! status, so a user action racing the expiry sweeper (or another user
//! action) loses cleanly: the second writer matches zero rows instead of
//! clobbering the first.

use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::listing::{Listing, ListingStatus};
use crate::profile::ProfileService;
use crate::request::{Decision, PickupRequest, RequestStatus};

/// Fallback instructions when the donor never wrote any
const NO_INSTRUCTIONS: &str = "No specific instructions provided.";

/// Service governing the pickup request lifecycle
#[derive(Clone)]
pub struct RequestService {
    db_pool: PgPool,
    profile_service: ProfileService,
    /// How long a pending request stays valid
    expiry_window: Duration,
}

impl RequestService {
    /// Create new request service instance
    pub fn new(db_pool: PgPool, profile_service: ProfileService, expiry_minutes: i64) -> Self {
        Self {
            db_pool,
            profile_service,
            expiry_window: Duration::minutes(expiry_minutes),
        }
    }

    /// Claim an available listing.
    ///
    /// The at-most-one-pending invariant is held by the partial unique
    /// index on (listing_id) WHERE status = 'pending'; of two concurrent
    /// claims exactly one insert succeeds and the other maps to
    /// `ConflictingRequest`.
    pub async fn create_request(
        &self,
        requester_email: &str,
        listing_id: &Uuid,
    ) -> ApiResult<PickupRequest> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Listing {}", listing_id)))?;

        if listing.donor_email == requester_email {
            return Err(ApiError::DonatorIsRequester);
        }

        match listing.status {
            ListingStatus::Available => {}
            ListingStatus::Requested => return Err(ApiError::ConflictingRequest),
            ListingStatus::Booked | ListingStatus::Completed => {
                return Err(ApiError::WrongState(
                    "Listing is no longer open for requests".to_string(),
                ))
            }
        }

        let requester = self.profile_service.ensure_profile(requester_email).await?;
        let now = Utc::now();

        let request = sqlx::query_as::<_, PickupRequest>(
            r#"
            INSERT INTO requests (
                id, listing_id, requester_name, requester_email,
                requester_photo_url, donor_email, quantity_value,
                quantity_unit, price, status, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(&requester.name)
        .bind(requester_email)
        .bind(&requester.photo_url)
        .bind(&listing.donor_email)
        .bind(listing.quantity_value)
        .bind(listing.quantity_unit)
        .bind(listing.price)
        .bind(RequestStatus::Pending)
        .bind(now)
        .bind(now + self.expiry_window)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ApiError::ConflictingRequest
            } else if db::is_foreign_key_violation(&e) {
                // Listing deleted between the availability read and here.
                ApiError::NotFound(format!("Listing {}", listing_id))
            } else {
                e.into()
            }
        })?;

        // Hide the listing from the catalogue. If the listing slipped out
        // of 'available' between the read and here, back the claim out.
        let flipped = sqlx::query(
            "UPDATE listings SET status = 'requested', updated_at = $1
             WHERE id = $2 AND status = 'available'",
        )
        .bind(now)
        .bind(listing_id)
        .execute(&self.db_pool)
        .await?;

        if flipped.rows_affected() == 0 {
            sqlx::query("DELETE FROM requests WHERE id = $1")
                .bind(request.id)
                .execute(&self.db_pool)
                .await?;
            return Err(ApiError::WrongState(
                "Listing is no longer open for requests".to_string(),
            ));
        }

        tracing::info!(
            request_id = %request.id,
            listing_id = %listing_id,
            requester = %requester_email,
            "Pickup request created"
        );

        Ok(request)
    }

    /// Get a single request by ID
    pub async fn get_request(&self, id: &Uuid) -> ApiResult<PickupRequest> {
        let request = sqlx::query_as::<_, PickupRequest>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Request {}", id)))?;

        Ok(request)
    }

    /// Donor approves or rejects a pending request.
    ///
    /// The listing reference is always the one stored on the request
    /// itself; the caller cannot supply a different one.
    pub async fn decide(
        &self,
        donor_email: &str,
        request_id: &Uuid,
        decision: Decision,
    ) -> ApiResult<PickupRequest> {
        let request = self.get_request(request_id).await?;

        if request.donor_email != donor_email {
            return Err(ApiError::Forbidden(
                "Only the listing's donor may decide this request".to_string(),
            ));
        }

        match decision {
            Decision::Approved => self.approve(request).await,
            Decision::Rejected => self.reject(request).await,
        }
    }

    async fn approve(&self, request: PickupRequest) -> ApiResult<PickupRequest> {
        // Pull the donor's current instructions off the listing
        let instructions = sqlx::query_scalar::<_, String>(
            "SELECT collection_instructions FROM listings WHERE id = $1",
        )
        .bind(request.listing_id)
        .fetch_optional(&self.db_pool)
        .await?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_INSTRUCTIONS.to_string());

        let security_code = generate_security_code();
        let now = Utc::now();

        let approved = sqlx::query_as::<_, PickupRequest>(
            r#"
            UPDATE requests
            SET status = 'approved', security_code = $1, collection_instructions = $2
            WHERE id = $3 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(&security_code)
        .bind(&instructions)
        .bind(request.id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::WrongState("Request is not pending".to_string()))?;

        sqlx::query(
            "UPDATE listings SET status = 'booked', updated_at = $1
             WHERE id = $2 AND status = 'requested'",
        )
        .bind(now)
        .bind(request.listing_id)
        .execute(&self.db_pool)
        .await?;

        self.profile_service
            .record_accepted_request(&approved.requester_email)
            .await?;

        tracing::info!(request_id = %approved.id, "Request approved, pickup code issued");

        Ok(approved)
    }

    async fn reject(&self, request: PickupRequest) -> ApiResult<PickupRequest> {
        let rejected = sqlx::query_as::<_, PickupRequest>(
            r#"
            UPDATE requests
            SET status = 'rejected'
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request.id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::WrongState("Request is not pending".to_string()))?;

        sqlx::query(
            "UPDATE listings SET status = 'available', updated_at = $1
             WHERE id = $2 AND status = 'requested'",
        )
        .bind(Utc::now())
        .bind(request.listing_id)
        .execute(&self.db_pool)
        .await?;

        tracing::info!(request_id = %rejected.id, "Request rejected, listing restored");

        Ok(rejected)
    }

    /// Requester confirms they collected the food. Idempotent.
    ///
    /// Completion still needs the donor's confirmation afterwards.
    pub async fn buyer_confirm(
        &self,
        requester_email: &str,
        request_id: &Uuid,
    ) -> ApiResult<PickupRequest> {
        let request = self.get_request(request_id).await?;

        if request.requester_email != requester_email {
            return Err(ApiError::Forbidden(
                "Only the requester may confirm collection".to_string(),
            ));
        }

        if request.buyer_confirmed {
            return Ok(request);
        }

        let confirmed = sqlx::query_as::<_, PickupRequest>(
            r#"
            UPDATE requests
            SET buyer_confirmed = TRUE
            WHERE id = $1 AND status = 'approved'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::WrongState("Request is not approved".to_string()))?;

        Ok(confirmed)
    }

    /// Donor confirms the handoff, completing the request. Idempotent.
    ///
    /// Requires the buyer's confirmation first; on success both parties'
    /// pickup counters and saved-weight totals are credited.
    pub async fn donor_confirm(
        &self,
        donor_email: &str,
        request_id: &Uuid,
    ) -> ApiResult<PickupRequest> {
        let request = self.get_request(request_id).await?;

        if request.donor_email != donor_email {
            return Err(ApiError::Forbidden(
                "Only the listing's donor may confirm the handoff".to_string(),
            ));
        }

        if request.status == RequestStatus::Completed {
            return Ok(request);
        }

        if !request.buyer_confirmed {
            return Err(ApiError::PreconditionFailed);
        }

        let completed = sqlx::query_as::<_, PickupRequest>(
            r#"
            UPDATE requests
            SET donor_confirmed = TRUE, status = 'completed'
            WHERE id = $1 AND status = 'approved' AND buyer_confirmed = TRUE
            RETURNING *
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::WrongState("Request is not approved".to_string()))?;

        sqlx::query(
            "UPDATE listings SET status = 'completed', updated_at = $1
             WHERE id = $2 AND status = 'booked'",
        )
        .bind(Utc::now())
        .bind(completed.listing_id)
        .execute(&self.db_pool)
        .await?;

        let quantity_kg = completed.quantity_unit.to_kg(completed.quantity_value);
        self.profile_service
            .record_completion(&completed.requester_email, &completed.donor_email, quantity_kg)
            .await?;

        tracing::info!(
            request_id = %completed.id,
            quantity_kg,
            "Handoff confirmed, request completed"
        );

        Ok(completed)
    }

    /// Expire pending requests whose window has passed.
    ///
    /// Safe to run concurrently with user-triggered transitions: each
    /// request is expired with a status-guarded update, so one already
    /// approved or rejected is simply skipped. Per-item failures are
    /// logged and do not block the rest of the batch. Returns the number
    /// of requests expired in this pass.
    pub async fn expire_stale_requests(&self) -> ApiResult<u64> {
        let now = Utc::now();

        let stale = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT id, listing_id FROM requests
            WHERE status = 'pending' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .fetch_all(&self.db_pool)
        .await?;

        let mut expired = 0u64;

        for (request_id, listing_id) in stale {
            match self.expire_one(&request_id, &listing_id).await {
                Ok(true) => expired += 1,
                Ok(false) => {} // lost the race to a user action
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, "Failed to expire request");
                }
            }
        }

        // Heal the crash window between "mark expired" and "restore
        // listing": any listing still marked requested without a live
        // request goes back on the catalogue.
        let reconciled = sqlx::query(
            r#"
            UPDATE listings l
            SET status = 'available', updated_at = $1
            WHERE l.status = 'requested'
              AND NOT EXISTS (
                  SELECT 1 FROM requests r
                  WHERE r.listing_id = l.id
                    AND r.status IN ('pending', 'approved')
              )
            "#,
        )
        .bind(now)
        .execute(&self.db_pool)
        .await?;

        if expired > 0 || reconciled.rows_affected() > 0 {
            tracing::info!(
                expired,
                reconciled = reconciled.rows_affected(),
                "Expiry sweep pass finished"
            );
        }

        Ok(expired)
    }

    async fn expire_one(&self, request_id: &Uuid, listing_id: &Uuid) -> ApiResult<bool> {
        let marked = sqlx::query(
            "UPDATE requests SET status = 'expired' WHERE id = $1 AND status = 'pending'",
        )
        .bind(request_id)
        .execute(&self.db_pool)
        .await?;

        if marked.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE listings SET status = 'available', updated_at = $1
             WHERE id = $2 AND status = 'requested'",
        )
        .bind(Utc::now())
        .bind(listing_id)
        .execute(&self.db_pool)
        .await?;

        Ok(true)
    }

    /// All requests made by a requester, newest first
    pub async fn requests_by_requester(&self, email: &str) -> ApiResult<Vec<PickupRequest>> {
        let requests = sqlx::query_as::<_, PickupRequest>(
            r#"
            SELECT * FROM requests
            WHERE requester_email = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(requests)
    }

    /// Requests awaiting, in progress with, or finished by a donor
    pub async fn requests_by_donor(&self, email: &str) -> ApiResult<Vec<PickupRequest>> {
        let requests = sqlx::query_as::<_, PickupRequest>(
            r#"
            SELECT * FROM requests
            WHERE donor_email = $1
              AND status IN ('pending', 'approved', 'completed')
            ORDER BY created_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(requests)
    }
}

/// 4-digit numeric one-time code shown at pickup
fn generate_security_code() -> String {
    rand::thread_rng().gen_range(1000..10000).to_string()
}
