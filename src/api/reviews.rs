//! Reviews API endpoints

use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        review::{CreateReview, HelpfulRequest, Review, ReviewDetails, ReviewQuery, UpdateReview},
        Paginated,
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AuthenticatedUser};

/// List reviews with filters and pagination
#[utoipa::path(
    get,
    path = "/reviews",
    tag = "reviews",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Paginated reviews (items, total, page, limit, totalPages)", body = [ReviewDetails])
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> AppResult<ApiResponse<Paginated<ReviewDetails>>> {
    let page = state.services.reviews.search(&query).await?;
    Ok(ApiResponse::new(page))
}

/// Get review by ID
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "reviews",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review details", body = ReviewDetails),
        (status = 404, description = "Review not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<ReviewDetails>> {
    let review = state.services.reviews.get(id).await?;
    Ok(ApiResponse::new(review))
}

/// Review a venue or a band
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = ReviewDetails),
        (status = 400, description = "Invalid rating or target", body = crate::error::ErrorResponse),
        (status = 409, description = "Already reviewed", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(data): ApiJson<CreateReview>,
) -> AppResult<(StatusCode, ApiResponse<ReviewDetails>)> {
    let review = state.services.reviews.create(user.id(), data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::new(review).with_message("Review created successfully"),
    ))
}

/// Update an own review
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = ReviewDetails),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(data): ApiJson<UpdateReview>,
) -> AppResult<ApiResponse<ReviewDetails>> {
    let review = state.services.reviews.update(user.id(), id, data).await?;
    Ok(ApiResponse::new(review).with_message("Review updated successfully"))
}

/// Delete an own review
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.services.reviews.delete(user.id(), id).await?;
    Ok(ApiResponse::message("Review deleted successfully"))
}

/// Mark another user's review helpful or unhelpful
#[utoipa::path(
    post,
    path = "/reviews/{id}/helpful",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = HelpfulRequest,
    responses(
        (status = 200, description = "Vote recorded", body = Review)
    )
)]
pub async fn mark_helpful(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(data): ApiJson<HelpfulRequest>,
) -> AppResult<ApiResponse<Review>> {
    let review = state
        .services
        .reviews
        .mark_helpful(user.id(), id, data.is_helpful)
        .await?;
    Ok(ApiResponse::new(review))
}
