//! Business logic services

pub mod badges;
pub mod bands;
pub mod checkins;
pub mod events;
pub mod ratings;
pub mod reviews;
pub mod users;
pub mod venues;

use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub venues: venues::VenuesService,
    pub bands: bands::BandsService,
    pub reviews: reviews::ReviewsService,
    pub events: events::EventsService,
    pub checkins: checkins::CheckinsService,
    pub badges: badges::BadgesService,
    repository: Repository,
}

impl Services {
    /// Create all services over one repository; `ratings` feeds the
    /// background rating worker
    pub fn new(repository: Repository, auth_config: AuthConfig, ratings: ratings::RatingQueue) -> Self {
        let badges = badges::BadgesService::new(repository.clone());
        let events = events::EventsService::new(repository.clone());
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            venues: venues::VenuesService::new(repository.clone()),
            bands: bands::BandsService::new(repository.clone()),
            reviews: reviews::ReviewsService::new(repository.clone(), badges.clone()),
            checkins: checkins::CheckinsService::new(repository.clone(), events.clone(), ratings),
            events,
            badges,
            repository,
        }
    }

    /// Database reachability for the readiness probe
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        self.repository.ping().await
    }
}

/// Reject callers whose account was deactivated after their token was issued
pub(crate) async fn ensure_active(repository: &Repository, user_id: Uuid) -> AppResult<()> {
    repository
        .users
        .get_by_id(user_id)
        .await
        .map(|_| ())
        .map_err(inactive_caller)
}

fn inactive_caller(err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::Authentication("Account is deactivated".to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_caller_is_unauthenticated() {
        assert!(matches!(
            inactive_caller(AppError::NotFound("User not found".to_string())),
            AppError::Authentication(_)
        ));
        assert!(matches!(
            inactive_caller(AppError::Database(sqlx::Error::PoolTimedOut)),
            AppError::Database(_)
        ));
    }
}
