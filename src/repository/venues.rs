//! Venues repository

use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        haversine_sql,
        venue::{CreateVenue, NearbyVenue, UpdateVenue, Venue, VenueQuery},
        PageRequest,
    },
};

use super::{like_pattern, Filters};

#[derive(Clone)]
pub struct VenuesRepository {
    pool: Pool<Postgres>,
}

impl VenuesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get an active venue by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Venue> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))
    }

    pub async fn create(&self, data: &CreateVenue) -> AppResult<Venue> {
        let row = sqlx::query_as::<_, Venue>(
            r#"
            INSERT INTO venues (
                id, name, description, address, city, state, country, postal_code,
                latitude, longitude, website_url, phone, email, capacity, venue_type,
                image_url, external_id, source
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.state)
        .bind(&data.country)
        .bind(&data.postal_code)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.website_url)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(data.capacity)
        .bind(&data.venue_type)
        .bind(&data.image_url)
        .bind(&data.external_id)
        .bind(data.source.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Search active venues; count and page run concurrently
    pub async fn search(&self, query: &VenueQuery, page: PageRequest) -> AppResult<(Vec<Venue>, i64)> {
        let mut filters = Filters::new();
        filters.add_raw("is_active = TRUE");
        if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
            filters.add(
                "(name ILIKE {} OR city ILIKE {} OR description ILIKE {})",
                like_pattern(q),
            );
        }
        if let Some(city) = query.city.as_deref().filter(|c| !c.trim().is_empty()) {
            filters.add("city ILIKE {}", like_pattern(city));
        }
        if let Some(ref venue_type) = query.venue_type {
            filters.add("venue_type = {}", venue_type.clone());
        }
        if let Some(rating) = query.rating {
            filters.add("average_rating >= {}", rating);
        }

        let where_clause = filters.where_clause();
        let count_q = format!("SELECT COUNT(*) FROM venues {}", where_clause);
        let select_q = format!(
            "SELECT * FROM venues {} ORDER BY {} {} NULLS LAST, name ASC LIMIT {} OFFSET {}",
            where_clause,
            query.sort.unwrap_or_default().column(),
            query.order.unwrap_or_default().as_sql(),
            page.limit,
            page.offset()
        );

        let count = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_q))
            .fetch_one(&self.pool);
        let rows = filters
            .bind_as(sqlx::query_as::<_, Venue>(&select_q))
            .fetch_all(&self.pool);
        let (total, venues) = tokio::try_join!(count, rows)?;

        Ok((venues, total))
    }

    pub async fn update(&self, id: Uuid, data: &UpdateVenue) -> AppResult<Venue> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE venues SET updated_at = NOW()");
        push_set!(builder, data.name, "name");
        push_set!(builder, data.description, "description");
        push_set!(builder, data.address, "address");
        push_set!(builder, data.city, "city");
        push_set!(builder, data.state, "state");
        push_set!(builder, data.country, "country");
        push_set!(builder, data.postal_code, "postal_code");
        push_set!(builder, data.latitude, "latitude");
        push_set!(builder, data.longitude, "longitude");
        push_set!(builder, data.website_url, "website_url");
        push_set!(builder, data.phone, "phone");
        push_set!(builder, data.email, "email");
        push_set!(builder, data.capacity, "capacity");
        push_set!(builder, data.venue_type, "venue_type");
        push_set!(builder, data.image_url, "image_url");
        builder
            .push(" WHERE is_active = TRUE AND id = ")
            .push_bind(id)
            .push(" RETURNING *");

        builder
            .build_query_as::<Venue>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))
    }

    /// Soft delete
    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE venues SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Venue not found".to_string()));
        }
        Ok(())
    }

    /// Highest rated venues with at least one rating
    pub async fn popular(&self, limit: i64) -> AppResult<Vec<Venue>> {
        let rows = sqlx::query_as::<_, Venue>(
            r#"
            SELECT * FROM venues
            WHERE is_active = TRUE AND total_reviews > 0
            ORDER BY average_rating DESC, total_reviews DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Venues within `radius_km` of a point, nearest first
    pub async fn near(&self, lat: f64, lng: f64, radius_km: f64, limit: i64) -> AppResult<Vec<NearbyVenue>> {
        let query = format!(
            r#"
            SELECT * FROM (
                SELECT v.*, {} AS distance_km
                FROM venues v
                WHERE v.is_active = TRUE AND v.latitude IS NOT NULL AND v.longitude IS NOT NULL
            ) nearby
            WHERE distance_km <= $3
            ORDER BY distance_km ASC
            LIMIT $4
            "#,
            haversine_sql("v", 1, 2)
        );
        let rows = sqlx::query_as::<_, NearbyVenue>(&query)
            .bind(lat)
            .bind(lng)
            .bind(radius_km)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Recompute the rating aggregate from reviews and check-in venue ratings
    pub async fn recompute_rating(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE venues SET
                average_rating = COALESCE(agg.avg_rating, 0),
                total_reviews = agg.total,
                updated_at = NOW()
            FROM (
                SELECT AVG(rating)::FLOAT8 AS avg_rating, COUNT(*)::INT AS total
                FROM (
                    SELECT r.rating FROM reviews r WHERE r.venue_id = $1
                    UNION ALL
                    SELECT c.venue_rating FROM checkins c
                    JOIN events e ON e.id = c.event_id
                    WHERE e.venue_id = $1 AND c.venue_rating IS NOT NULL
                ) ratings
            ) agg
            WHERE venues.id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
