//! Badges API endpoints

use axum::extract::State;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::badge::{AwardResult, Badge, BadgeProgress, EarnedBadge},
    AppState,
};

use super::{ApiPath, ApiResponse, AuthenticatedUser};

/// Badge catalog
#[utoipa::path(
    get,
    path = "/badges",
    tag = "badges",
    responses(
        (status = 200, description = "All badges", body = [Badge])
    )
)]
pub async fn list_badges(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Badge>>> {
    let badges = state.services.badges.catalog().await?;
    Ok(ApiResponse::new(badges))
}

/// Badges held by the current user
#[utoipa::path(
    get,
    path = "/badges/me",
    tag = "badges",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Earned badges", body = [EarnedBadge])
    )
)]
pub async fn my_badges(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<Vec<EarnedBadge>>> {
    let badges = state.services.badges.earned(user.id()).await?;
    Ok(ApiResponse::new(badges))
}

/// Badges held by a user
#[utoipa::path(
    get,
    path = "/badges/user/{user_id}",
    tag = "badges",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Earned badges", body = [EarnedBadge]),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn user_badges(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<Vec<EarnedBadge>>> {
    let badges = state.services.badges.earned_by(user_id).await?;
    Ok(ApiResponse::new(badges))
}

/// Progress toward badges not yet earned
#[utoipa::path(
    get,
    path = "/badges/progress",
    tag = "badges",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Badge progress", body = [BadgeProgress])
    )
)]
pub async fn progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<Vec<BadgeProgress>>> {
    let progress = state.services.badges.progress(user.id()).await?;
    Ok(ApiResponse::new(progress))
}

/// Evaluate and award newly earned badges
#[utoipa::path(
    post,
    path = "/badges/check-awards",
    tag = "badges",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Newly awarded badges", body = AwardResult)
    )
)]
pub async fn check_awards(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<AwardResult>> {
    let result = state.services.badges.check_and_award(user.id()).await?;
    let message = match result.count {
        0 => "No new badges earned".to_string(),
        n => format!("Earned {} new badge(s)", n),
    };
    Ok(ApiResponse::new(result).with_message(message))
}
