//! Bands repository

use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        band::{Band, BandQuery, CreateBand, TrendingBand, UpdateBand},
        PageRequest,
    },
};

use super::{like_pattern, Filters};

#[derive(Clone)]
pub struct BandsRepository {
    pool: Pool<Postgres>,
}

impl BandsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get an active band by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Band> {
        sqlx::query_as::<_, Band>("SELECT * FROM bands WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Band not found".to_string()))
    }

    pub async fn create(&self, data: &CreateBand) -> AppResult<Band> {
        let row = sqlx::query_as::<_, Band>(
            r#"
            INSERT INTO bands (
                id, name, description, genre, formed_year, website_url, spotify_url,
                instagram_url, facebook_url, image_url, hometown, musicbrainz_id, source
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(&data.genre)
        .bind(data.formed_year)
        .bind(&data.website_url)
        .bind(&data.spotify_url)
        .bind(&data.instagram_url)
        .bind(&data.facebook_url)
        .bind(&data.image_url)
        .bind(&data.hometown)
        .bind(&data.musicbrainz_id)
        .bind(data.source.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Search active bands; count and page run concurrently
    pub async fn search(&self, query: &BandQuery, page: PageRequest) -> AppResult<(Vec<Band>, i64)> {
        let mut filters = Filters::new();
        filters.add_raw("is_active = TRUE");
        if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
            filters.add(
                "(name ILIKE {} OR genre ILIKE {} OR hometown ILIKE {} OR description ILIKE {})",
                like_pattern(q),
            );
        }
        if let Some(genre) = query.genre.as_deref().filter(|g| !g.trim().is_empty()) {
            filters.add("genre ILIKE {}", like_pattern(genre));
        }
        if let Some(rating) = query.rating {
            filters.add("average_rating >= {}", rating);
        }

        let where_clause = filters.where_clause();
        let count_q = format!("SELECT COUNT(*) FROM bands {}", where_clause);
        let select_q = format!(
            "SELECT * FROM bands {} ORDER BY {} {} NULLS LAST, name ASC LIMIT {} OFFSET {}",
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
            .bind_as(sqlx::query_as::<_, Band>(&select_q))
            .fetch_all(&self.pool);
        let (total, bands) = tokio::try_join!(count, rows)?;

        Ok((bands, total))
    }

    pub async fn update(&self, id: Uuid, data: &UpdateBand) -> AppResult<Band> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE bands SET updated_at = NOW()");
        push_set!(builder, data.name, "name");
        push_set!(builder, data.description, "description");
        push_set!(builder, data.genre, "genre");
        push_set!(builder, data.formed_year, "formed_year");
        push_set!(builder, data.website_url, "website_url");
        push_set!(builder, data.spotify_url, "spotify_url");
        push_set!(builder, data.instagram_url, "instagram_url");
        push_set!(builder, data.facebook_url, "facebook_url");
        push_set!(builder, data.image_url, "image_url");
        push_set!(builder, data.hometown, "hometown");
        builder
            .push(" WHERE is_active = TRUE AND id = ")
            .push_bind(id)
            .push(" RETURNING *");

        builder
            .build_query_as::<Band>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Band not found".to_string()))
    }

    /// Soft delete
    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE bands SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Band not found".to_string()));
        }
        Ok(())
    }

    pub async fn popular(&self, limit: i64) -> AppResult<Vec<Band>> {
        let rows = sqlx::query_as::<_, Band>(
            r#"
            SELECT * FROM bands
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

    /// Bands with the most reviews over the last 30 days
    pub async fn trending(&self, limit: i64) -> AppResult<Vec<TrendingBand>> {
        let rows = sqlx::query_as::<_, TrendingBand>(
            r#"
            SELECT b.*, COUNT(r.id) AS recent_reviews
            FROM bands b
            JOIN reviews r ON r.band_id = b.id
            WHERE b.is_active = TRUE AND r.created_at >= NOW() - INTERVAL '30 days'
            GROUP BY b.id
            ORDER BY recent_reviews DESC, b.average_rating DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Distinct genres of active bands
    pub async fn genres(&self) -> AppResult<Vec<String>> {
        let genres = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT genre FROM bands
            WHERE is_active = TRUE AND genre IS NOT NULL AND genre <> ''
            ORDER BY genre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Recompute the rating aggregate from reviews and check-in band ratings
    pub async fn recompute_rating(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE bands SET
                average_rating = COALESCE(agg.avg_rating, 0),
                total_reviews = agg.total,
                updated_at = NOW()
            FROM (
                SELECT AVG(rating)::FLOAT8 AS avg_rating, COUNT(*)::INT AS total
                FROM (
                    SELECT r.rating FROM reviews r WHERE r.band_id = $1
                    UNION ALL
                    SELECT c.band_rating FROM checkins c
                    JOIN events e ON e.id = c.event_id
                    WHERE e.band_id = $1 AND c.band_rating IS NOT NULL
                ) ratings
            ) agg
            WHERE bands.id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
