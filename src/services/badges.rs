//! Badge evaluation and awards

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::badge::{meets_threshold, AwardResult, Badge, BadgeProgress, BadgeType, EarnedBadge},
    repository::Repository,
};

#[derive(Clone)]
pub struct BadgesService {
    repository: Repository,
}

impl BadgesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn catalog(&self) -> AppResult<Vec<Badge>> {
        self.repository.badges.list_all().await
    }

    pub async fn earned(&self, user_id: Uuid) -> AppResult<Vec<EarnedBadge>> {
        self.repository.badges.earned_by_user(user_id).await
    }

    /// Badges held by another user
    pub async fn earned_by(&self, user_id: Uuid) -> AppResult<Vec<EarnedBadge>> {
        self.repository.users.get_by_id(user_id).await?;
        self.earned(user_id).await
    }

    /// Evaluate every badge the user does not hold yet and award those
    /// whose threshold is met. Held badges are never re-evaluated, so a
    /// second pass without new activity awards nothing.
    pub async fn check_and_award(&self, user_id: Uuid) -> AppResult<AwardResult> {
        let candidates = self.repository.badges.unearned_by_user(user_id).await?;
        let mut metrics: HashMap<BadgeType, i64> = HashMap::new();
        let mut awarded = Vec::new();

        for badge in candidates {
            let current = self.metric(user_id, badge.badge_type, &mut metrics).await?;
            if !meets_threshold(current, badge.requirement_value) {
                continue;
            }
            // false when a concurrent pass got there first
            if self.repository.badges.award(user_id, badge.id).await? {
                tracing::info!(user_id = %user_id, badge = %badge.name, "Badge awarded");
                awarded.push(badge);
            }
        }

        Ok(AwardResult {
            count: awarded.len(),
            badges: awarded,
        })
    }

    /// Progress toward every badge not yet held
    pub async fn progress(&self, user_id: Uuid) -> AppResult<Vec<BadgeProgress>> {
        let candidates = self.repository.badges.unearned_by_user(user_id).await?;
        let mut metrics: HashMap<BadgeType, i64> = HashMap::new();
        let mut progress = Vec::with_capacity(candidates.len());

        for badge in candidates {
            let current = self.metric(user_id, badge.badge_type, &mut metrics).await?;
            progress.push(BadgeProgress::new(badge, current));
        }
        Ok(progress)
    }

    async fn metric(&self, user_id: Uuid, badge_type: BadgeType, cache: &mut HashMap<BadgeType, i64>) -> AppResult<i64> {
        if let Some(value) = cache.get(&badge_type) {
            return Ok(*value);
        }
        let value = self.repository.badges.metric(user_id, badge_type).await?;
        cache.insert(badge_type, value);
        Ok(value)
    }
}
