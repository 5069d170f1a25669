//! Users API endpoints: accounts, profiles, follows

use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        checkin::OffsetQuery,
        user::{
            AuthResponse, Availability, AvailabilityQuery, CreateUser, LoginRequest, PublicProfile, UpdateProfile,
            User, UserProfile, UserSummary,
        },
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AuthenticatedUser, OptionalUser};

/// Register a new account
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or username taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateUser>,
) -> AppResult<(StatusCode, ApiResponse<AuthResponse>)> {
    let auth = state.services.users.register(data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::new(auth).with_message("User registered successfully"),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let auth = state.services.users.login(data).await?;
    Ok(ApiResponse::new(auth).with_message("Login successful"))
}

/// Current user's profile with stats
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = UserProfile)
    )
)]
pub async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state.services.users.me(user.id()).await?;
    Ok(ApiResponse::new(profile))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "No valid fields to update", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(data): ApiJson<UpdateProfile>,
) -> AppResult<ApiResponse<User>> {
    let updated = state.services.users.update_profile(user.id(), data).await?;
    Ok(ApiResponse::new(updated).with_message("Profile updated successfully"))
}

/// Deactivate the current account
#[utoipa::path(
    delete,
    path = "/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account deactivated")
    )
)]
pub async fn delete_me(State(state): State<AppState>, user: AuthenticatedUser) -> AppResult<ApiResponse<()>> {
    state.services.users.deactivate(user.id()).await?;
    Ok(ApiResponse::message("Account deactivated"))
}

/// Check whether an email and/or username is free
#[utoipa::path(
    get,
    path = "/users/check-availability",
    tag = "users",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability", body = Availability)
    )
)]
pub async fn check_availability(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> AppResult<ApiResponse<Availability>> {
    let availability = state.services.users.availability(&query).await?;
    Ok(ApiResponse::new(availability))
}

/// Public profile of a user
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    viewer: OptionalUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<PublicProfile>> {
    let profile = state.services.users.public_profile(id, viewer.id()).await?;
    Ok(ApiResponse::new(profile))
}

/// Follow a user
#[utoipa::path(
    post,
    path = "/users/{id}/follow",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User to follow")),
    responses(
        (status = 201, description = "Now following"),
        (status = 409, description = "Already following", body = crate::error::ErrorResponse)
    )
)]
pub async fn follow(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<(StatusCode, ApiResponse<()>)> {
    state.services.users.follow(user.id(), id).await?;
    Ok((StatusCode::CREATED, ApiResponse::message("User followed")))
}

/// Stop following a user
#[utoipa::path(
    delete,
    path = "/users/{id}/follow",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User to unfollow")),
    responses(
        (status = 200, description = "Unfollowed")
    )
)]
pub async fn unfollow(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.services.users.unfollow(user.id(), id).await?;
    Ok(ApiResponse::message("User unfollowed"))
}

/// Users following a user
#[utoipa::path(
    get,
    path = "/users/{id}/followers",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID"), OffsetQuery),
    responses(
        (status = 200, description = "Followers", body = [UserSummary])
    )
)]
pub async fn followers(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<OffsetQuery>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let (limit, offset) = query.window();
    let users = state.services.users.followers(id, limit, offset).await?;
    Ok(ApiResponse::new(users))
}

/// Users a user follows
#[utoipa::path(
    get,
    path = "/users/{id}/following",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID"), OffsetQuery),
    responses(
        (status = 200, description = "Followed users", body = [UserSummary])
    )
)]
pub async fn following(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<OffsetQuery>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let (limit, offset) = query.window();
    let users = state.services.users.following(id, limit, offset).await?;
    Ok(ApiResponse::new(users))
}
