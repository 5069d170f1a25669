//! Badges repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::badge::{Badge, BadgeType, EarnedBadge},
};

#[derive(Clone)]
pub struct BadgesRepository {
    pool: Pool<Postgres>,
}

impl BadgesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Full catalog, grouped by type then threshold
    pub async fn list_all(&self) -> AppResult<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            "SELECT * FROM badges ORDER BY badge_type, requirement_value",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(badges)
    }

    pub async fn earned_by_user(&self, user_id: Uuid) -> AppResult<Vec<EarnedBadge>> {
        let badges = sqlx::query_as::<_, EarnedBadge>(
            r#"
            SELECT b.*, ub.earned_at
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY ub.earned_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(badges)
    }

    /// Catalog entries the user does not hold yet
    pub async fn unearned_by_user(&self, user_id: Uuid) -> AppResult<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT b.* FROM badges b
            WHERE NOT EXISTS (
                SELECT 1 FROM user_badges ub WHERE ub.badge_id = b.id AND ub.user_id = $1
            )
            ORDER BY b.badge_type, b.requirement_value
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(badges)
    }

    /// Current value of the activity metric behind a badge type
    pub async fn metric(&self, user_id: Uuid, badge_type: BadgeType) -> AppResult<i64> {
        let value: i64 = sqlx::query_scalar(badge_type.metric_sql())
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(value)
    }

    /// Record an award. Returns `false` if the user already held the badge.
    pub async fn award(&self, user_id: Uuid, badge_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (id, user_id, badge_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
