//! Users repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateProfile, User, UserStats, UserSummary},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get an active user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Get an active user by email (login)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1) AND is_active = TRUE",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Check if email already exists (including deactivated accounts)
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if username already exists (including deactivated accounts)
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a user with an already hashed password
    pub async fn create(&self, data: &CreateUser, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, username, password_hash, first_name, last_name)
            VALUES ($1, LOWER($2), $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.email.trim())
        .bind(data.username.trim())
        .bind(password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation_or(e, "Email or username already exists"))
    }

    /// Update profile fields from the allow-list
    pub async fn update_profile(&self, id: Uuid, data: &UpdateProfile) -> AppResult<User> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");
        push_set!(builder, data.first_name, "first_name");
        push_set!(builder, data.last_name, "last_name");
        push_set!(builder, data.bio, "bio");
        push_set!(builder, data.profile_image_url, "profile_image_url");
        push_set!(builder, data.location, "location");
        push_set!(builder, data.date_of_birth, "date_of_birth");
        builder
            .push(" WHERE is_active = TRUE AND id = ")
            .push_bind(id)
            .push(" RETURNING *");

        builder
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Soft-delete a user
    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Derived activity counts for a user
    pub async fn stats(&self, id: Uuid) -> AppResult<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM reviews WHERE user_id = $1) AS review_count,
                (SELECT COUNT(*) FROM checkins WHERE user_id = $1) AS checkin_count,
                (SELECT COUNT(*) FROM user_badges WHERE user_id = $1) AS badge_count,
                (SELECT COUNT(*) FROM user_followers WHERE following_id = $1) AS follower_count,
                (SELECT COUNT(*) FROM user_followers WHERE follower_id = $1) AS following_count
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    pub async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_followers WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<()> {
        sqlx::query("INSERT INTO user_followers (id, follower_id, following_id) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::unique_violation_or(e, "Already following this user"))?;
        Ok(())
    }

    /// Remove a follow relation; no error if absent
    pub async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM user_followers WHERE follower_id = $1 AND following_id = $2")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Users following `user_id`
    pub async fn followers(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            r#"
            SELECT u.id, u.username, u.profile_image_url
            FROM user_followers f
            JOIN users u ON u.id = f.follower_id
            WHERE f.following_id = $1 AND u.is_active = TRUE
            ORDER BY f.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(summary_from_tuple).collect())
    }

    /// Users `user_id` follows
    pub async fn following(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            r#"
            SELECT u.id, u.username, u.profile_image_url
            FROM user_followers f
            JOIN users u ON u.id = f.following_id
            WHERE f.follower_id = $1 AND u.is_active = TRUE
            ORDER BY f.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(summary_from_tuple).collect())
    }
}

fn summary_from_tuple((id, username, profile_image_url): (Uuid, String, Option<String>)) -> UserSummary {
    UserSummary {
        id,
        username,
        profile_image_url,
    }
}
