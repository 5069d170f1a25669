//! Check-ins API endpoints: attendance, feed, toasts, comments

use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::checkin::{
        CheckinComment, CheckinDetails, CreateCheckin, CreateComment, FeedQuery, OffsetQuery, Toast,
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AuthenticatedUser, OptionalUser};

/// Check into a show
#[utoipa::path(
    post,
    path = "/checkins",
    tag = "checkins",
    security(("bearer_auth" = [])),
    request_body = CreateCheckin,
    responses(
        (status = 201, description = "Checked in", body = CheckinDetails),
        (status = 400, description = "Invalid rating", body = crate::error::ErrorResponse),
        (status = 409, description = "Already checked into this event", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_checkin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(data): ApiJson<CreateCheckin>,
) -> AppResult<(StatusCode, ApiResponse<CheckinDetails>)> {
    let checkin = state.services.checkins.create(user.id(), data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::new(checkin).with_message("Checked in successfully"),
    ))
}

/// Activity feed
#[utoipa::path(
    get,
    path = "/checkins/feed",
    tag = "checkins",
    security(("bearer_auth" = [])),
    params(FeedQuery),
    responses(
        (status = 200, description = "Check-ins, newest first", body = [CheckinDetails])
    )
)]
pub async fn feed(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> AppResult<ApiResponse<Vec<CheckinDetails>>> {
    let checkins = state.services.checkins.feed(user.id(), &query).await?;
    Ok(ApiResponse::new(checkins))
}

/// A user's check-ins
#[utoipa::path(
    get,
    path = "/checkins/user/{user_id}",
    tag = "checkins",
    params(("user_id" = Uuid, Path, description = "User ID"), OffsetQuery),
    responses(
        (status = 200, description = "Check-ins, newest first", body = [CheckinDetails])
    )
)]
pub async fn user_checkins(
    State(state): State<AppState>,
    viewer: OptionalUser,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<OffsetQuery>,
) -> AppResult<ApiResponse<Vec<CheckinDetails>>> {
    let (limit, offset) = query.window();
    let checkins = state
        .services
        .checkins
        .by_user(user_id, viewer.id(), limit, offset)
        .await?;
    Ok(ApiResponse::new(checkins))
}

/// Get check-in by ID
#[utoipa::path(
    get,
    path = "/checkins/{id}",
    tag = "checkins",
    params(("id" = Uuid, Path, description = "Check-in ID")),
    responses(
        (status = 200, description = "Check-in details", body = CheckinDetails),
        (status = 404, description = "Check-in not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_checkin(
    State(state): State<AppState>,
    viewer: OptionalUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<CheckinDetails>> {
    let checkin = state.services.checkins.get(id, viewer.id()).await?;
    Ok(ApiResponse::new(checkin))
}

/// Delete an own check-in
#[utoipa::path(
    delete,
    path = "/checkins/{id}",
    tag = "checkins",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Check-in ID")),
    responses(
        (status = 200, description = "Check-in deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_checkin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.services.checkins.delete(user.id(), id).await?;
    Ok(ApiResponse::message("Check-in deleted successfully"))
}

/// Toast a check-in
#[utoipa::path(
    post,
    path = "/checkins/{id}/toast",
    tag = "checkins",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Check-in ID")),
    responses(
        (status = 201, description = "Toasted"),
        (status = 409, description = "Already toasted", body = crate::error::ErrorResponse)
    )
)]
pub async fn toast(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<(StatusCode, ApiResponse<()>)> {
    state.services.checkins.toast(user.id(), id).await?;
    Ok((StatusCode::CREATED, ApiResponse::message("Check-in toasted")))
}

/// Remove a toast
#[utoipa::path(
    delete,
    path = "/checkins/{id}/toast",
    tag = "checkins",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Check-in ID")),
    responses(
        (status = 200, description = "Toast removed")
    )
)]
pub async fn untoast(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.services.checkins.untoast(user.id(), id).await?;
    Ok(ApiResponse::message("Toast removed"))
}

/// Users who toasted a check-in
#[utoipa::path(
    get,
    path = "/checkins/{id}/toasts",
    tag = "checkins",
    params(("id" = Uuid, Path, description = "Check-in ID")),
    responses(
        (status = 200, description = "Toasts", body = [Toast])
    )
)]
pub async fn list_toasts(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<Vec<Toast>>> {
    let toasts = state.services.checkins.toasts(id).await?;
    Ok(ApiResponse::new(toasts))
}

/// Comments on a check-in, oldest first
#[utoipa::path(
    get,
    path = "/checkins/{id}/comments",
    tag = "checkins",
    params(("id" = Uuid, Path, description = "Check-in ID")),
    responses(
        (status = 200, description = "Comments", body = [CheckinComment])
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<Vec<CheckinComment>>> {
    let comments = state.services.checkins.comments(id).await?;
    Ok(ApiResponse::new(comments))
}

/// Comment on a check-in
#[utoipa::path(
    post,
    path = "/checkins/{id}/comments",
    tag = "checkins",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Check-in ID")),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment added", body = CheckinComment),
        (status = 400, description = "Empty comment", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(data): ApiJson<CreateComment>,
) -> AppResult<(StatusCode, ApiResponse<CheckinComment>)> {
    let comment = state
        .services
        .checkins
        .add_comment(user.id(), id, &data.comment_text)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::new(comment)))
}

/// Delete an own comment
#[utoipa::path(
    delete,
    path = "/checkins/{id}/comments/{comment_id}",
    tag = "checkins",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Check-in ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath((id, comment_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<ApiResponse<()>> {
    state
        .services
        .checkins
        .delete_comment(user.id(), id, comment_id)
        .await?;
    Ok(ApiResponse::message("Comment deleted successfully"))
}
