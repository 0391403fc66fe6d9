//! Lifecycle consistency tests for listings, requests, and reviews
//!
//! These tests exercise the state machine against a real database and are
//! ignored by default; set TEST_DATABASE_URL and run with `--ignored`.

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, Utc};
    use sqlx::PgPool;
    use uuid::Uuid;

    use plateshare_server::db;
    use plateshare_server::error::ApiError;
    use plateshare_server::listing::{CreateListingRequest, ListingService, ListingStatus};
    use plateshare_server::models::QuantityUnit;
    use plateshare_server::profile::ProfileService;
    use plateshare_server::request::{Decision, RequestService, RequestStatus};
    use plateshare_server::review::{RaterRole, ReviewService, SubmitReviewRequest};

    /// Helper to create a test database pool with the schema applied
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/plateshare_test".to_string());

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(4)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    struct TestContext {
        profiles: ProfileService,
        listings: ListingService,
        requests: RequestService,
        reviews: ReviewService,
        donor: String,
        buyer: String,
    }

    /// Fresh services and unique identities per test
    fn build_context(pool: &PgPool, expiry_minutes: i64) -> TestContext {
        let profiles = ProfileService::new(pool.clone());
        let suffix = Uuid::new_v4().simple().to_string();
        TestContext {
            listings: ListingService::new(pool.clone(), profiles.clone()),
            requests: RequestService::new(pool.clone(), profiles.clone(), expiry_minutes),
            reviews: ReviewService::new(pool.clone(), profiles.clone()),
            profiles,
            donor: format!("donor-{}@example.com", suffix),
            buyer: format!("buyer-{}@example.com", suffix),
        }
    }

    fn listing_request(quantity_value: f64, quantity_unit: QuantityUnit) -> CreateListingRequest {
        CreateListingRequest {
            name: format!("Surplus box {}", Uuid::new_v4()),
            image_url: String::new(),
            quantity_value,
            quantity_unit,
            price: 2.5,
            expiry_date: Local::now().date_naive() + Duration::days(3),
            pickup_location: "Community fridge, 5th Ave".to_string(),
            latitude: None,
            longitude: None,
            collection_instructions: "Ring the bell twice".to_string(),
        }
    }

    /// Walk a request to completed: claim, approve, both confirmations
    async fn complete_request(ctx: &TestContext, quantity: f64, unit: QuantityUnit) -> Uuid {
        let listing = ctx
            .listings
            .create_listing(&ctx.donor, listing_request(quantity, unit))
            .await
            .expect("create listing");

        let request = ctx
            .requests
            .create_request(&ctx.buyer, &listing.id)
            .await
            .expect("create request");

        ctx.requests
            .decide(&ctx.donor, &request.id, Decision::Approved)
            .await
            .expect("approve");
        ctx.requests
            .buyer_confirm(&ctx.buyer, &request.id)
            .await
            .expect("buyer confirm");
        ctx.requests
            .donor_confirm(&ctx.donor, &request.id)
            .await
            .expect("donor confirm");

        request.id
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_duplicate_listing_is_rejected() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);

        let req = listing_request(2.0, QuantityUnit::Kg);
        let second = CreateListingRequest {
            name: req.name.clone(),
            expiry_date: req.expiry_date,
            pickup_location: req.pickup_location.clone(),
            ..listing_request(2.0, QuantityUnit::Kg)
        };

        ctx.listings.create_listing(&ctx.donor, req).await.unwrap();
        let result = ctx.listings.create_listing(&ctx.donor, second).await;

        assert!(matches!(result, Err(ApiError::DuplicateListing)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_at_most_one_pending_request_per_listing() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);
        let other_buyer = format!("rival-{}@example.com", Uuid::new_v4().simple());

        let listing = ctx
            .listings
            .create_listing(&ctx.donor, listing_request(1.0, QuantityUnit::Kg))
            .await
            .unwrap();

        // Two simultaneous claims: exactly one must succeed
        let (first, second) = tokio::join!(
            ctx.requests.create_request(&ctx.buyer, &listing.id),
            ctx.requests.create_request(&other_buyer, &listing.id),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one concurrent claim may win");

        let loser = if first.is_ok() { second } else { first };
        assert!(matches!(
            loser,
            Err(ApiError::ConflictingRequest) | Err(ApiError::WrongState(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_requesting_own_listing_is_rejected() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);

        let listing = ctx
            .listings
            .create_listing(&ctx.donor, listing_request(1.0, QuantityUnit::Kg))
            .await
            .unwrap();

        let result = ctx.requests.create_request(&ctx.donor, &listing.id).await;
        assert!(matches!(result, Err(ApiError::DonatorIsRequester)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_approval_issues_code_and_books_listing() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);

        let listing = ctx
            .listings
            .create_listing(&ctx.donor, listing_request(1.0, QuantityUnit::Kg))
            .await
            .unwrap();
        let request = ctx
            .requests
            .create_request(&ctx.buyer, &listing.id)
            .await
            .unwrap();

        // Only the donor may decide
        let forbidden = ctx
            .requests
            .decide(&ctx.buyer, &request.id, Decision::Approved)
            .await;
        assert!(matches!(forbidden, Err(ApiError::Forbidden(_))));

        let approved = ctx
            .requests
            .decide(&ctx.donor, &request.id, Decision::Approved)
            .await
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        let code = approved.security_code.expect("security code issued");
        assert_eq!(code.len(), 4);
        assert_eq!(
            approved.collection_instructions.as_deref(),
            Some("Ring the bell twice")
        );

        let booked = ctx.listings.get_listing(&listing.id).await.unwrap();
        assert_eq!(booked.status, ListingStatus::Booked);

        // Terminal: a second decision fails
        let again = ctx
            .requests
            .decide(&ctx.donor, &request.id, Decision::Rejected)
            .await;
        assert!(matches!(again, Err(ApiError::WrongState(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_rejection_restores_listing() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);

        let listing = ctx
            .listings
            .create_listing(&ctx.donor, listing_request(1.0, QuantityUnit::Kg))
            .await
            .unwrap();
        let request = ctx
            .requests
            .create_request(&ctx.buyer, &listing.id)
            .await
            .unwrap();

        let rejected = ctx
            .requests
            .decide(&ctx.donor, &request.id, Decision::Rejected)
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);

        let restored = ctx.listings.get_listing(&listing.id).await.unwrap();
        assert_eq!(restored.status, ListingStatus::Available);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_donor_confirm_requires_buyer_confirm_first() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);

        let listing = ctx
            .listings
            .create_listing(&ctx.donor, listing_request(1.0, QuantityUnit::Kg))
            .await
            .unwrap();
        let request = ctx
            .requests
            .create_request(&ctx.buyer, &listing.id)
            .await
            .unwrap();
        ctx.requests
            .decide(&ctx.donor, &request.id, Decision::Approved)
            .await
            .unwrap();

        // Donor cannot close the handoff before the buyer confirms
        let premature = ctx.requests.donor_confirm(&ctx.donor, &request.id).await;
        assert!(matches!(premature, Err(ApiError::PreconditionFailed)));

        ctx.requests
            .buyer_confirm(&ctx.buyer, &request.id)
            .await
            .unwrap();

        // Repeating the buyer's confirmation is a no-op
        let reconfirmed = ctx
            .requests
            .buyer_confirm(&ctx.buyer, &request.id)
            .await
            .unwrap();
        assert!(reconfirmed.buyer_confirmed);
        assert_eq!(reconfirmed.status, RequestStatus::Approved);

        let completed = ctx
            .requests
            .donor_confirm(&ctx.donor, &request.id)
            .await
            .unwrap();
        assert_eq!(completed.status, RequestStatus::Completed);

        // Idempotent on repeat, and counters do not double
        let repeat = ctx
            .requests
            .donor_confirm(&ctx.donor, &request.id)
            .await
            .unwrap();
        assert_eq!(repeat.status, RequestStatus::Completed);

        let donor_profile = ctx.profiles.get_profile(&ctx.donor).await.unwrap();
        assert_eq!(donor_profile.pickups_given, 1);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_completion_credits_food_saved_in_kg() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);

        // 4 items convert to 2.0 kg
        complete_request(&ctx, 4.0, QuantityUnit::Item).await;

        let buyer = ctx.profiles.get_profile(&ctx.buyer).await.unwrap();
        let donor = ctx.profiles.get_profile(&ctx.donor).await.unwrap();

        assert_eq!(buyer.total_food_saved_kg, 2.0);
        assert_eq!(donor.total_food_saved_kg, 2.0);
        assert_eq!(buyer.pickups_completed, 1);
        assert_eq!(donor.pickups_given, 1);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_sweep_expires_stale_request_and_is_idempotent() {
        let pool = setup_test_db().await;
        // Zero-minute window: the request is stale the moment it exists
        let ctx = build_context(&pool, 0);

        let listing = ctx
            .listings
            .create_listing(&ctx.donor, listing_request(1.0, QuantityUnit::Kg))
            .await
            .unwrap();
        let request = ctx
            .requests
            .create_request(&ctx.buyer, &listing.id)
            .await
            .unwrap();

        ctx.requests.expire_stale_requests().await.unwrap();

        let expired = ctx.requests.get_request(&request.id).await.unwrap();
        assert_eq!(expired.status, RequestStatus::Expired);
        let restored = ctx.listings.get_listing(&listing.id).await.unwrap();
        assert_eq!(restored.status, ListingStatus::Available);

        // A second pass must not re-transition anything
        ctx.requests.expire_stale_requests().await.unwrap();
        let still_expired = ctx.requests.get_request(&request.id).await.unwrap();
        assert_eq!(still_expired.status, RequestStatus::Expired);
        let still_available = ctx.listings.get_listing(&listing.id).await.unwrap();
        assert_eq!(still_available.status, ListingStatus::Available);

        // The listing can be claimed again after expiry
        let reclaim = ctx.requests.create_request(&ctx.buyer, &listing.id).await;
        assert!(reclaim.is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_request_insert_against_missing_listing_is_a_fk_violation() {
        let pool = setup_test_db().await;
        let now = Utc::now();

        // A claim racing a listing deletion hits this constraint on insert;
        // the service maps it to NotFound rather than a storage error.
        let err = sqlx::query(
            r#"
            INSERT INTO requests (
                id, listing_id, requester_name, requester_email,
                requester_photo_url, donor_email, quantity_value,
                quantity_unit, price, status, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4())
        .bind("Ghost")
        .bind("ghost@example.com")
        .bind("")
        .bind("donor@example.com")
        .bind(1.0_f64)
        .bind(QuantityUnit::Kg)
        .bind(2.5_f64)
        .bind(RequestStatus::Pending)
        .bind(now)
        .bind(now + Duration::minutes(30))
        .execute(&pool)
        .await
        .expect_err("insert without a parent listing must fail");

        assert!(db::is_foreign_key_violation(&err));
        assert!(!db::is_unique_violation(&err));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_purge_removes_only_expired_available_listings() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);
        let today = Local::now().date_naive();

        let stale = ctx
            .listings
            .create_listing(
                &ctx.donor,
                CreateListingRequest {
                    expiry_date: today - Duration::days(1),
                    ..listing_request(1.0, QuantityUnit::Kg)
                },
            )
            .await
            .unwrap();

        // Equally expired, but booked: mid-pickup rows must survive
        let booked = ctx
            .listings
            .create_listing(
                &ctx.donor,
                CreateListingRequest {
                    expiry_date: today - Duration::days(1),
                    ..listing_request(1.0, QuantityUnit::Kg)
                },
            )
            .await
            .unwrap();
        let request = ctx
            .requests
            .create_request(&ctx.buyer, &booked.id)
            .await
            .unwrap();
        ctx.requests
            .decide(&ctx.donor, &request.id, Decision::Approved)
            .await
            .unwrap();

        let purged = ctx.listings.purge_expired_listings(today).await.unwrap();
        assert!(purged >= 1);

        let gone = ctx.listings.get_listing(&stale.id).await;
        assert!(matches!(gone, Err(ApiError::NotFound(_))));
        let kept = ctx.listings.get_listing(&booked.id).await.unwrap();
        assert_eq!(kept.status, ListingStatus::Booked);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_review_is_unique_per_role_and_updates_average() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);

        let request_id = complete_request(&ctx, 1.0, QuantityUnit::Kg).await;

        let review = SubmitReviewRequest {
            request_id,
            to_email: ctx.donor.clone(),
            rating: 4,
            comment: Some("Lovely bread, smooth pickup".to_string()),
            rater_role: RaterRole::Buyer,
        };

        ctx.reviews
            .submit_review(&ctx.buyer, review)
            .await
            .expect("first review succeeds");

        let donor_profile = ctx.profiles.get_profile(&ctx.donor).await.unwrap();
        assert_eq!(donor_profile.total_ratings, 1);
        assert_eq!(donor_profile.rating_sum, 4);
        assert_eq!(donor_profile.average_rating, 4.0);

        // Same side cannot rate twice
        let second = SubmitReviewRequest {
            request_id,
            to_email: ctx.donor.clone(),
            rating: 1,
            comment: None,
            rater_role: RaterRole::Buyer,
        };
        let result = ctx.reviews.submit_review(&ctx.buyer, second).await;
        assert!(matches!(result, Err(ApiError::AlreadyRated)));

        // The other side still can
        let donor_review = SubmitReviewRequest {
            request_id,
            to_email: ctx.buyer.clone(),
            rating: 5,
            comment: None,
            rater_role: RaterRole::Donor,
        };
        ctx.reviews
            .submit_review(&ctx.donor, donor_review)
            .await
            .expect("donor review succeeds");

        let buyer_profile = ctx.profiles.get_profile(&ctx.buyer).await.unwrap();
        assert_eq!(buyer_profile.average_rating, 5.0);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_review_rejects_wrong_recipient_and_incomplete_request() {
        let pool = setup_test_db().await;
        let ctx = build_context(&pool, 30);

        let listing = ctx
            .listings
            .create_listing(&ctx.donor, listing_request(1.0, QuantityUnit::Kg))
            .await
            .unwrap();
        let request = ctx
            .requests
            .create_request(&ctx.buyer, &listing.id)
            .await
            .unwrap();

        // Not completed yet
        let early = SubmitReviewRequest {
            request_id: request.id,
            to_email: ctx.donor.clone(),
            rating: 5,
            comment: None,
            rater_role: RaterRole::Buyer,
        };
        let result = ctx.reviews.submit_review(&ctx.buyer, early).await;
        assert!(matches!(result, Err(ApiError::WrongState(_))));

        let request_id = complete_request(&ctx, 1.0, QuantityUnit::Kg).await;

        // Recipient must be the counterparty
        let wrong_recipient = SubmitReviewRequest {
            request_id,
            to_email: "stranger@example.com".to_string(),
            rating: 5,
            comment: None,
            rater_role: RaterRole::Buyer,
        };
        let result = ctx.reviews.submit_review(&ctx.buyer, wrong_recipient).await;
        assert!(matches!(result, Err(ApiError::InvalidRecipient)));
    }
}
