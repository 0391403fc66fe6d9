//! Listing service layer - business logic for posted food listings

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::listing::{
    CreateListingRequest, ListListingsQuery, Listing, ListingStatus, UpdateListingRequest,
};
use crate::models::QuantityUnit;
use crate::profile::ProfileService;

/// Service for managing the listing catalogue
#[derive(Clone)]
pub struct ListingService {
    db_pool: PgPool,
    profile_service: ProfileService,
}

impl ListingService {
    /// Create new listing service instance
    pub fn new(db_pool: PgPool, profile_service: ProfileService) -> Self {
        Self {
            db_pool,
            profile_service,
        }
    }

    /// Create a listing for a donor and bump their donation stats.
    ///
    /// The duplicate-submission guard is the unique index over the
    /// listing's identifying columns; a violation maps to `DuplicateListing`.
    pub async fn create_listing(
        &self,
        donor_email: &str,
        request: CreateListingRequest,
    ) -> ApiResult<Listing> {
        request
            .validate_fields()
            .map_err(ApiError::ValidationError)?;

        let donor = self.profile_service.ensure_profile(donor_email).await?;
        let now = Utc::now();

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (
                id, name, image_url, quantity_value, quantity_unit, price,
                expiry_date, pickup_location, latitude, longitude,
                collection_instructions, donor_name, donor_email,
                donor_photo_url, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.image_url)
        .bind(request.quantity_value)
        .bind(request.quantity_unit)
        .bind(request.price)
        .bind(request.expiry_date)
        .bind(&request.pickup_location)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(&request.collection_instructions)
        .bind(&donor.name)
        .bind(donor_email)
        .bind(&donor.photo_url)
        .bind(ListingStatus::Available)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ApiError::DuplicateListing
            } else {
                e.into()
            }
        })?;

        // Donated weight only counts listings posted by weight
        let donated_kg = match request.quantity_unit {
            QuantityUnit::Kg => request.quantity_value,
            _ => 0.0,
        };
        self.profile_service
            .record_donation(donor_email, donated_kg)
            .await?;

        tracing::info!(listing_id = %listing.id, donor = %donor_email, "Listing created");

        Ok(listing)
    }

    /// Browse the catalogue with optional name search and expiry sort
    pub async fn list_listings(&self, query: ListListingsQuery) -> ApiResult<Vec<Listing>> {
        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM listings WHERE 1=1");

        if let Some(search) = query.search.filter(|s| !s.is_empty()) {
            query_builder.push(" AND name ILIKE ");
            query_builder.push_bind(format!("%{}%", search));
        }

        match query.sort.as_deref() {
            Some("asc") => query_builder.push(" ORDER BY expiry_date ASC"),
            Some("desc") => query_builder.push(" ORDER BY expiry_date DESC"),
            _ => query_builder.push(" ORDER BY created_at DESC"),
        };

        let listings = query_builder
            .build_query_as::<Listing>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(listings)
    }

    /// Get a single listing by ID
    pub async fn get_listing(&self, id: &Uuid) -> ApiResult<Listing> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Listing {}", id)))?;

        Ok(listing)
    }

    /// A donor's own listings that are still in play (not completed)
    pub async fn listings_by_donor(&self, donor_email: &str) -> ApiResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT * FROM listings
            WHERE donor_email = $1 AND status != 'completed'
            ORDER BY created_at DESC
            "#,
        )
        .bind(donor_email)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(listings)
    }

    /// Update a listing's details (donor only, while still available).
    ///
    /// The status guard keeps details frozen once a request is in flight,
    /// so request snapshots stay truthful.
    pub async fn update_listing(
        &self,
        donor_email: &str,
        id: &Uuid,
        update: UpdateListingRequest,
    ) -> ApiResult<Listing> {
        let existing = self.get_listing(id).await?;
        if existing.donor_email != donor_email {
            return Err(ApiError::Forbidden(
                "Only the donor may update this listing".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings SET
                name = COALESCE($1, name),
                image_url = COALESCE($2, image_url),
                quantity_value = COALESCE($3, quantity_value),
                quantity_unit = COALESCE($4, quantity_unit),
                price = COALESCE($5, price),
                expiry_date = COALESCE($6, expiry_date),
                pickup_location = COALESCE($7, pickup_location),
                collection_instructions = COALESCE($8, collection_instructions),
                updated_at = $9
            WHERE id = $10 AND status = 'available'
            RETURNING *
            "#,
        )
        .bind(update.name)
        .bind(update.image_url)
        .bind(update.quantity_value)
        .bind(update.quantity_unit)
        .bind(update.price)
        .bind(update.expiry_date)
        .bind(update.pickup_location)
        .bind(update.collection_instructions)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| {
            ApiError::WrongState("Listing can only be edited while available".to_string())
        })?;

        Ok(updated)
    }

    /// Delete a listing (donor only)
    pub async fn delete_listing(&self, donor_email: &str, id: &Uuid) -> ApiResult<()> {
        let existing = self.get_listing(id).await?;
        if existing.donor_email != donor_email {
            return Err(ApiError::Forbidden(
                "Only the donor may delete this listing".to_string(),
            ));
        }

        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        tracing::info!(listing_id = %id, donor = %donor_email, "Listing deleted");

        Ok(())
    }

    /// Remove available listings whose expiry date has passed.
    ///
    /// Only `available` listings are purged - items mid-pickup keep their
    /// row until the request resolves.
    pub async fn purge_expired_listings(&self, today: NaiveDate) -> ApiResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM listings
            WHERE status = 'available' AND expiry_date < $1
            "#,
        )
        .bind(today)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected())
    }
}
