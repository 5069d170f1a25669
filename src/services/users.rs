//! Accounts, profiles and the follow graph

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{
        AuthResponse, Availability, AvailabilityQuery, CreateUser, LoginRequest, PublicProfile, UpdateProfile, User,
        UserClaims, UserProfile, UserSummary,
    },
    repository::Repository,
};

use super::ensure_active;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account and sign it in
    pub async fn register(&self, data: CreateUser) -> AppResult<AuthResponse> {
        data.validate()?;

        if self.repository.users.email_exists(&data.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if self.repository.users.username_exists(&data.username).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let hash = hash_password(&data.password)?;
        let user = self.repository.users.create(&data, &hash).await?;
        tracing::info!(user_id = %user.id, "User registered");

        let token = self.issue_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    /// Authenticate by email and password
    pub async fn login(&self, data: LoginRequest) -> AppResult<AuthResponse> {
        data.validate()?;

        let user = self
            .repository
            .users
            .get_by_email(&data.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user.password_hash, &data.password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let token = self.issue_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        UserClaims::new(user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Own profile with derived stats
    pub async fn me(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let (user, stats) = tokio::try_join!(
            self.repository.users.get_by_id(user_id),
            self.repository.users.stats(user_id)
        )?;
        Ok(UserProfile { user, stats })
    }

    /// Another user's public profile, as seen by `viewer`
    pub async fn public_profile(&self, id: Uuid, viewer: Option<Uuid>) -> AppResult<PublicProfile> {
        let (user, stats) = tokio::try_join!(
            self.repository.users.get_by_id(id),
            self.repository.users.stats(id)
        )?;
        let is_following = match viewer {
            Some(viewer) if viewer != id => self.repository.users.is_following(viewer, id).await?,
            _ => false,
        };
        Ok(PublicProfile {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            profile_image_url: user.profile_image_url,
            location: user.location,
            created_at: user.created_at,
            stats,
            is_following,
        })
    }

    pub async fn update_profile(&self, user_id: Uuid, data: UpdateProfile) -> AppResult<User> {
        data.validate()?;
        if data.is_empty() {
            return Err(AppError::Validation("No valid fields to update".to_string()));
        }
        self.repository.users.update_profile(user_id, &data).await
    }

    pub async fn deactivate(&self, user_id: Uuid) -> AppResult<()> {
        self.repository.users.deactivate(user_id).await?;
        tracing::info!(user_id = %user_id, "User deactivated");
        Ok(())
    }

    pub async fn availability(&self, query: &AvailabilityQuery) -> AppResult<Availability> {
        let email = query.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        let username = query.username.as_deref().map(str::trim).filter(|u| !u.is_empty());
        if email.is_none() && username.is_none() {
            return Err(AppError::Validation("Email or username is required".to_string()));
        }

        let email_available = match email {
            Some(email) => Some(!self.repository.users.email_exists(email).await?),
            None => None,
        };
        let username_available = match username {
            Some(username) => Some(!self.repository.users.username_exists(username).await?),
            None => None,
        };
        Ok(Availability {
            email_available,
            username_available,
        })
    }

    pub async fn follow(&self, follower_id: Uuid, target_id: Uuid) -> AppResult<()> {
        if follower_id == target_id {
            return Err(AppError::Validation("You cannot follow yourself".to_string()));
        }
        ensure_active(&self.repository, follower_id).await?;
        self.repository.users.get_by_id(target_id).await?;
        self.repository.users.follow(follower_id, target_id).await?;
        tracing::info!(follower_id = %follower_id, following_id = %target_id, "User followed");
        Ok(())
    }

    pub async fn unfollow(&self, follower_id: Uuid, target_id: Uuid) -> AppResult<()> {
        self.repository.users.unfollow(follower_id, target_id).await
    }

    pub async fn followers(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<UserSummary>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.users.followers(user_id, limit, offset).await
    }

    pub async fn following(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<UserSummary>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.users.following(user_id, limit, offset).await
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse battery").unwrap());
        assert!(!verify_password(&hash, "wrong password").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert!(matches!(
            verify_password("not-a-hash", "whatever"),
            Err(AppError::Internal(_))
        ));
    }
}
