//! Events repository

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::event::{Event, EventDetails, EventRow},
};

const DETAILS_SELECT: &str = r#"
    SELECT e.*,
           v.name AS venue_name, v.city AS venue_city, v.state AS venue_state, v.image_url AS venue_image_url,
           b.name AS band_name, b.genre AS band_genre, b.image_url AS band_image_url,
           (SELECT COUNT(*) FROM checkins c WHERE c.event_id = e.id) AS checkin_count
    FROM events e
    JOIN venues v ON v.id = e.venue_id
    JOIN bands b ON b.id = e.band_id
"#;

#[derive(Clone)]
pub struct EventsRepository {
    pool: Pool<Postgres>,
}

impl EventsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Look up the event for an exact (venue, band, date) tuple
    pub async fn find_by_show(&self, venue_id: Uuid, band_id: Uuid, event_date: NaiveDate) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE venue_id = $1 AND band_id = $2 AND event_date = $3",
        )
        .bind(venue_id)
        .bind(band_id)
        .bind(event_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    /// Insert an event unless the (venue, band, date) tuple already exists.
    /// Returns `None` when another request created it first.
    pub async fn insert_if_absent(
        &self,
        venue_id: Uuid,
        band_id: Uuid,
        event_date: NaiveDate,
        event_name: Option<&str>,
        created_by_user_id: Option<Uuid>,
    ) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (id, venue_id, band_id, event_date, event_name, created_by_user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (venue_id, band_id, event_date) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(venue_id)
        .bind(band_id)
        .bind(event_date)
        .bind(event_name)
        .bind(created_by_user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    pub async fn get_details(&self, id: Uuid) -> AppResult<EventDetails> {
        let query = format!("{} WHERE e.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(EventDetails::from)
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// Events at a venue: upcoming ascending, or past descending
    pub async fn list_by_venue(&self, venue_id: Uuid, upcoming: bool, limit: i64) -> AppResult<Vec<EventDetails>> {
        self.list_by("e.venue_id", venue_id, upcoming, limit).await
    }

    /// Events by a band: upcoming ascending, or past descending
    pub async fn list_by_band(&self, band_id: Uuid, upcoming: bool, limit: i64) -> AppResult<Vec<EventDetails>> {
        self.list_by("e.band_id", band_id, upcoming, limit).await
    }

    async fn list_by(&self, column: &'static str, id: Uuid, upcoming: bool, limit: i64) -> AppResult<Vec<EventDetails>> {
        let (date_filter, order) = if upcoming {
            ("e.event_date >= CURRENT_DATE", "ASC")
        } else {
            ("e.event_date < CURRENT_DATE", "DESC")
        };
        let query = format!(
            "{} WHERE {} = $1 AND {} ORDER BY e.event_date {} LIMIT $2",
            DETAILS_SELECT, column, date_filter, order
        );
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(EventDetails::from).collect())
    }

    pub async fn checkin_count(&self, id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM checkins WHERE event_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Hard delete
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        Ok(())
    }

    /// Events of the last 30 days with at least one check-in, busiest first
    pub async fn trending(&self, limit: i64) -> AppResult<Vec<EventDetails>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.*,
                   v.name AS venue_name, v.city AS venue_city, v.state AS venue_state, v.image_url AS venue_image_url,
                   b.name AS band_name, b.genre AS band_genre, b.image_url AS band_image_url,
                   COUNT(c.id) AS checkin_count
            FROM events e
            JOIN venues v ON v.id = e.venue_id
            JOIN bands b ON b.id = e.band_id
            JOIN checkins c ON c.event_id = e.id
            WHERE e.event_date >= CURRENT_DATE - INTERVAL '30 days' AND e.event_date <= CURRENT_DATE
            GROUP BY e.id, v.id, b.id
            ORDER BY checkin_count DESC, e.event_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(EventDetails::from).collect())
    }
}
