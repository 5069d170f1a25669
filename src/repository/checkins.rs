//! Check-ins repository: check-ins, toasts and comments

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        checkin::{Checkin, CheckinComment, CheckinDetails, CheckinRow, CommentRow, CreateCheckin, FeedFilter, Toast},
        haversine_sql,
    },
};

use super::Filters;

/// Enriched check-in select; `$1` is the viewing user (nullable) for `has_user_toasted`
const DETAILS_SELECT: &str = r#"
    SELECT c.*,
           u.username, u.profile_image_url AS user_profile_image_url,
           e.event_date, e.event_name,
           v.id AS venue_id, v.name AS venue_name, v.city AS venue_city, v.state AS venue_state, v.image_url AS venue_image_url,
           b.id AS band_id, b.name AS band_name, b.genre AS band_genre, b.image_url AS band_image_url,
           (SELECT COUNT(*) FROM checkin_toasts t WHERE t.checkin_id = c.id) AS toast_count,
           (SELECT COUNT(*) FROM checkin_comments cc WHERE cc.checkin_id = c.id) AS comment_count,
           EXISTS(SELECT 1 FROM checkin_toasts t WHERE t.checkin_id = c.id AND t.user_id = $1) AS has_user_toasted
    FROM checkins c
    JOIN users u ON u.id = c.user_id
    JOIN events e ON e.id = c.event_id
    JOIN venues v ON v.id = e.venue_id
    JOIN bands b ON b.id = e.band_id
"#;

/// Location constraint for the nearby feed
#[derive(Debug, Clone, Copy)]
pub struct Proximity {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
}

#[derive(Clone)]
pub struct CheckinsRepository {
    pool: Pool<Postgres>,
}

impl CheckinsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Checkin> {
        sqlx::query_as::<_, Checkin>("SELECT * FROM checkins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Check-in not found".to_string()))
    }

    pub async fn exists_for_user_event(&self, user_id: Uuid, event_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM checkins WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a check-in; the unique (user, event) constraint backs the pre-check
    pub async fn create(&self, user_id: Uuid, event_id: Uuid, data: &CreateCheckin) -> AppResult<Checkin> {
        sqlx::query_as::<_, Checkin>(
            r#"
            INSERT INTO checkins (id, user_id, event_id, venue_rating, band_rating, review_text, image_urls)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(event_id)
        .bind(data.venue_rating)
        .bind(data.band_rating)
        .bind(&data.review_text)
        .bind(&data.image_urls)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation_or(e, "Already checked into this event"))
    }

    pub async fn get_details(&self, id: Uuid, viewer: Option<Uuid>) -> AppResult<CheckinDetails> {
        let query = format!("{} WHERE c.id = $2", DETAILS_SELECT);
        sqlx::query_as::<_, CheckinRow>(&query)
            .bind(viewer)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(CheckinDetails::from)
            .ok_or_else(|| AppError::NotFound("Check-in not found".to_string()))
    }

    /// Activity feed, newest first
    pub async fn feed(
        &self,
        viewer: Option<Uuid>,
        filter: FeedFilter,
        proximity: Option<Proximity>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<CheckinDetails>> {
        let mut filters = Filters::new();
        filters.push_value(viewer);
        match filter {
            FeedFilter::Friends => {
                filters.add_raw(
                    "c.user_id IN (SELECT following_id FROM user_followers WHERE follower_id = $1)",
                );
            }
            FeedFilter::Nearby => {
                if let Some(p) = proximity {
                    let lat = filters.push_value(p.lat);
                    let lng = filters.push_value(p.lng);
                    let radius = filters.push_value(p.radius_km);
                    filters.add_raw("v.latitude IS NOT NULL AND v.longitude IS NOT NULL");
                    filters.add_raw(&format!("{} <= ${}", haversine_sql("v", lat, lng), radius));
                }
            }
            FeedFilter::Global => {}
        }

        let query = format!(
            "{} {} ORDER BY c.created_at DESC LIMIT {} OFFSET {}",
            DETAILS_SELECT,
            filters.where_clause(),
            limit,
            offset
        );
        let rows = filters
            .bind_as(sqlx::query_as::<_, CheckinRow>(&query))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CheckinDetails::from).collect())
    }

    /// A user's check-ins, newest first
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        viewer: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<CheckinDetails>> {
        let query = format!(
            "{} WHERE c.user_id = $2 ORDER BY c.created_at DESC LIMIT $3 OFFSET $4",
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, CheckinRow>(&query)
            .bind(viewer)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CheckinDetails::from).collect())
    }

    /// Hard delete; toasts and comments cascade
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM checkins WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Check-in not found".to_string()));
        }
        Ok(())
    }

    pub async fn toast_exists(&self, checkin_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM checkin_toasts WHERE checkin_id = $1 AND user_id = $2)",
        )
        .bind(checkin_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn add_toast(&self, checkin_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query("INSERT INTO checkin_toasts (id, checkin_id, user_id) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(checkin_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::unique_violation_or(e, "You have already toasted this check-in"))?;
        Ok(())
    }

    /// Remove a toast; no error if absent
    pub async fn remove_toast(&self, checkin_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM checkin_toasts WHERE checkin_id = $1 AND user_id = $2")
            .bind(checkin_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_toasts(&self, checkin_id: Uuid) -> AppResult<Vec<Toast>> {
        let toasts = sqlx::query_as::<_, Toast>(
            r#"
            SELECT t.user_id, u.username, u.profile_image_url, t.created_at
            FROM checkin_toasts t
            JOIN users u ON u.id = t.user_id
            WHERE t.checkin_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(checkin_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(toasts)
    }

    pub async fn add_comment(&self, checkin_id: Uuid, user_id: Uuid, text: &str) -> AppResult<CheckinComment> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO checkin_comments (id, checkin_id, user_id, comment_text)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(checkin_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        self.get_comment(checkin_id, id).await
    }

    /// Comments in chronological order
    pub async fn list_comments(&self, checkin_id: Uuid) -> AppResult<Vec<CheckinComment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT cc.id, cc.checkin_id, cc.user_id, cc.comment_text, cc.created_at,
                   u.username, u.profile_image_url AS user_profile_image_url
            FROM checkin_comments cc
            JOIN users u ON u.id = cc.user_id
            WHERE cc.checkin_id = $1
            ORDER BY cc.created_at ASC
            "#,
        )
        .bind(checkin_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CheckinComment::from).collect())
    }

    pub async fn get_comment(&self, checkin_id: Uuid, comment_id: Uuid) -> AppResult<CheckinComment> {
        sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT cc.id, cc.checkin_id, cc.user_id, cc.comment_text, cc.created_at,
                   u.username, u.profile_image_url AS user_profile_image_url
            FROM checkin_comments cc
            JOIN users u ON u.id = cc.user_id
            WHERE cc.checkin_id = $1 AND cc.id = $2
            "#,
        )
        .bind(checkin_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .map(CheckinComment::from)
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    pub async fn delete_comment(&self, comment_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM checkin_comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }
        Ok(())
    }
}
