//! Reviews service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        review::{CreateReview, Review, ReviewDetails, ReviewQuery, ReviewTarget, UpdateReview},
        PageRequest, Paginated,
    },
    repository::Repository,
};

use super::{badges::BadgesService, ensure_active};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
    badges: BadgesService,
}

impl ReviewsService {
    pub fn new(repository: Repository, badges: BadgesService) -> Self {
        Self { repository, badges }
    }

    pub async fn create(&self, user_id: Uuid, data: CreateReview) -> AppResult<ReviewDetails> {
        data.validate()?;
        let target = ReviewTarget::from_ids(data.venue_id, data.band_id)?;
        ensure_active(&self.repository, user_id).await?;

        match target {
            ReviewTarget::Venue(id) => {
                self.repository.venues.get_by_id(id).await?;
            }
            ReviewTarget::Band(id) => {
                self.repository.bands.get_by_id(id).await?;
            }
        }

        if self.repository.reviews.exists_for_target(user_id, target).await? {
            return Err(AppError::Conflict(format!(
                "You have already reviewed this {}",
                target.label()
            )));
        }

        let review = self.repository.reviews.create(user_id, target, &data).await?;
        tracing::info!(review_id = %review.id, user_id = %user_id, review_target = ?target, "Review created");

        self.recompute(target).await;
        self.spawn_badge_check(user_id);

        self.repository.reviews.get_details(review.id).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ReviewDetails> {
        self.repository.reviews.get_details(id).await
    }

    pub async fn search(&self, query: &ReviewQuery) -> AppResult<Paginated<ReviewDetails>> {
        let page = PageRequest::new(query.page, query.limit);
        let (reviews, total) = self.repository.reviews.search(query, page).await?;
        Ok(Paginated::new(reviews, total, page))
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, data: UpdateReview) -> AppResult<ReviewDetails> {
        let review = self.owned(user_id, id, "update").await?;
        data.validate()?;
        if data.is_empty() {
            return Err(AppError::Validation("No valid fields to update".to_string()));
        }

        let updated = self.repository.reviews.update(id, &data).await?;
        if data.rating.is_some() {
            if let Some(target) = updated.target() {
                self.recompute(target).await;
            }
        }
        tracing::info!(review_id = %review.id, "Review updated");

        self.repository.reviews.get_details(id).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let review = self.owned(user_id, id, "delete").await?;
        self.repository.reviews.delete(id).await?;
        if let Some(target) = review.target() {
            self.recompute(target).await;
        }
        tracing::info!(review_id = %id, "Review deleted");
        Ok(())
    }

    /// Vote on another user's review
    pub async fn mark_helpful(&self, user_id: Uuid, id: Uuid, is_helpful: bool) -> AppResult<Review> {
        ensure_active(&self.repository, user_id).await?;
        let review = self.repository.reviews.get_by_id(id).await?;
        if review.user_id == user_id {
            return Err(AppError::Validation("You cannot rate your own review".to_string()));
        }
        self.repository.reviews.set_helpful(id, user_id, is_helpful).await
    }

    async fn owned(&self, user_id: Uuid, id: Uuid, action: &str) -> AppResult<Review> {
        let review = self.repository.reviews.get_by_id(id).await?;
        if review.user_id != user_id {
            return Err(AppError::Authorization(format!(
                "You can only {} your own reviews",
                action
            )));
        }
        Ok(review)
    }

    /// Refresh the target's aggregate; failures are logged only
    async fn recompute(&self, target: ReviewTarget) {
        let result = match target {
            ReviewTarget::Venue(id) => self.repository.venues.recompute_rating(id).await,
            ReviewTarget::Band(id) => self.repository.bands.recompute_rating(id).await,
        };
        if let Err(e) = result {
            tracing::error!(review_target = ?target, error = %e, "Failed to recompute rating aggregate");
        }
    }

    fn spawn_badge_check(&self, user_id: Uuid) {
        let badges = self.badges.clone();
        tokio::spawn(async move {
            match badges.check_and_award(user_id).await {
                Ok(result) if result.count > 0 => {
                    tracing::debug!(user_id = %user_id, count = result.count, "Badges awarded after review");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(user_id = %user_id, error = %e, "Badge check failed"),
            }
        });
    }
}
