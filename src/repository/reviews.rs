//! Reviews repository

use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        review::{CreateReview, Review, ReviewDetails, ReviewQuery, ReviewRow, ReviewTarget, UpdateReview},
        PageRequest,
    },
};

use super::Filters;

const DETAILS_SELECT: &str = r#"
    SELECT r.*,
           u.username, u.profile_image_url AS user_profile_image_url,
           v.name AS venue_name, v.city AS venue_city, v.state AS venue_state, v.image_url AS venue_image_url,
           b.name AS band_name, b.genre AS band_genre, b.image_url AS band_image_url
    FROM reviews r
    JOIN users u ON u.id = r.user_id
    LEFT JOIN venues v ON v.id = r.venue_id
    LEFT JOIN bands b ON b.id = r.band_id
"#;

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Review> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }

    pub async fn get_details(&self, id: Uuid) -> AppResult<ReviewDetails> {
        let query = format!("{} WHERE r.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, ReviewRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ReviewDetails::from)
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }

    /// Whether the user already reviewed the target
    pub async fn exists_for_target(&self, user_id: Uuid, target: ReviewTarget) -> AppResult<bool> {
        let query = match target {
            ReviewTarget::Venue(_) => {
                "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND venue_id = $2)"
            }
            ReviewTarget::Band(_) => {
                "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND band_id = $2)"
            }
        };
        let target_id = match target {
            ReviewTarget::Venue(id) | ReviewTarget::Band(id) => id,
        };
        let exists: bool = sqlx::query_scalar(query)
            .bind(user_id)
            .bind(target_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Insert a review; the unique constraint on (user, target) backs the pre-check
    pub async fn create(&self, user_id: Uuid, target: ReviewTarget, data: &CreateReview) -> AppResult<Review> {
        let (venue_id, band_id) = match target {
            ReviewTarget::Venue(id) => (Some(id), None),
            ReviewTarget::Band(id) => (None, Some(id)),
        };
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, user_id, venue_id, band_id, rating, title, content, event_date, image_urls)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(venue_id)
        .bind(band_id)
        .bind(data.rating)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.event_date)
        .bind(&data.image_urls)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::unique_violation_or(e, &format!("You have already reviewed this {}", target.label()))
        })
    }

    /// List reviews with filters; count and page run concurrently
    pub async fn search(&self, query: &ReviewQuery, page: PageRequest) -> AppResult<(Vec<ReviewDetails>, i64)> {
        let mut filters = Filters::new();
        if let Some(venue_id) = query.venue_id {
            filters.add("r.venue_id = {}", venue_id);
        }
        if let Some(band_id) = query.band_id {
            filters.add("r.band_id = {}", band_id);
        }
        if let Some(user_id) = query.user_id {
            filters.add("r.user_id = {}", user_id);
        }
        if let Some(rating) = query.rating {
            filters.add("r.rating = {}", rating);
        }

        let where_clause = filters.where_clause();
        let count_q = format!("SELECT COUNT(*) FROM reviews r {}", where_clause);
        let select_q = format!(
            "{} {} ORDER BY {} {}, r.created_at DESC LIMIT {} OFFSET {}",
            DETAILS_SELECT,
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
            .bind_as(sqlx::query_as::<_, ReviewRow>(&select_q))
            .fetch_all(&self.pool);
        let (total, rows) = tokio::try_join!(count, rows)?;

        Ok((rows.into_iter().map(ReviewDetails::from).collect(), total))
    }

    pub async fn update(&self, id: Uuid, data: &UpdateReview) -> AppResult<Review> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE reviews SET updated_at = NOW()");
        push_set!(builder, data.rating, "rating");
        push_set!(builder, data.title, "title");
        push_set!(builder, data.content, "content");
        push_set!(builder, data.event_date, "event_date");
        push_set!(builder, data.image_urls, "image_urls");
        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        builder
            .build_query_as::<Review>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }

    /// Hard delete
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Review not found".to_string()));
        }
        Ok(())
    }

    /// Record or change a user's helpfulness vote, then refresh the count
    pub async fn set_helpful(&self, review_id: Uuid, user_id: Uuid, is_helpful: bool) -> AppResult<Review> {
        sqlx::query(
            r#"
            INSERT INTO review_helpfulness (id, review_id, user_id, is_helpful)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (review_id, user_id) DO UPDATE SET is_helpful = EXCLUDED.is_helpful
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(review_id)
        .bind(user_id)
        .bind(is_helpful)
        .execute(&self.pool)
        .await?;

        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews SET helpful_count = (
                SELECT COUNT(*) FROM review_helpfulness WHERE review_id = $1 AND is_helpful = TRUE
            )
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }
}
