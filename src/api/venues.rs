//! Venues API endpoints

use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        venue::{CreateVenue, NearbyQuery, NearbyVenue, UpdateVenue, Venue, VenueQuery},
        LimitQuery, Paginated,
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse};

/// Search venues with filters and pagination
#[utoipa::path(
    get,
    path = "/venues",
    tag = "venues",
    params(VenueQuery),
    responses(
        (status = 200, description = "Paginated venues (items, total, page, limit, totalPages)", body = [Venue])
    )
)]
pub async fn list_venues(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VenueQuery>,
) -> AppResult<ApiResponse<Paginated<Venue>>> {
    let page = state.services.venues.search(&query).await?;
    Ok(ApiResponse::new(page))
}

/// Highest rated venues
#[utoipa::path(
    get,
    path = "/venues/popular",
    tag = "venues",
    params(LimitQuery),
    responses(
        (status = 200, description = "Popular venues", body = [Venue])
    )
)]
pub async fn popular_venues(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<ApiResponse<Vec<Venue>>> {
    let venues = state.services.venues.popular(query.resolve(10)).await?;
    Ok(ApiResponse::new(venues))
}

/// Venues near a point, nearest first
#[utoipa::path(
    get,
    path = "/venues/near",
    tag = "venues",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Nearby venues with distanceKm", body = [NearbyVenue]),
        (status = 400, description = "Invalid coordinates", body = crate::error::ErrorResponse)
    )
)]
pub async fn nearby_venues(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NearbyQuery>,
) -> AppResult<ApiResponse<Vec<NearbyVenue>>> {
    let limit = LimitQuery { limit: query.limit }.resolve(20);
    let venues = state.services.venues.near(&query, limit).await?;
    Ok(ApiResponse::new(venues))
}

/// Get venue by ID
#[utoipa::path(
    get,
    path = "/venues/{id}",
    tag = "venues",
    params(("id" = Uuid, Path, description = "Venue ID")),
    responses(
        (status = 200, description = "Venue details", body = Venue),
        (status = 404, description = "Venue not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_venue(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<ApiResponse<Venue>> {
    let venue = state.services.venues.get(id).await?;
    Ok(ApiResponse::new(venue))
}

/// Create a venue
#[utoipa::path(
    post,
    path = "/venues",
    tag = "venues",
    request_body = CreateVenue,
    responses(
        (status = 201, description = "Venue created", body = Venue),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_venue(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateVenue>,
) -> AppResult<(StatusCode, ApiResponse<Venue>)> {
    let venue = state.services.venues.create(data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::new(venue).with_message("Venue created successfully"),
    ))
}

/// Update a venue
#[utoipa::path(
    put,
    path = "/venues/{id}",
    tag = "venues",
    params(("id" = Uuid, Path, description = "Venue ID")),
    request_body = UpdateVenue,
    responses(
        (status = 200, description = "Venue updated", body = Venue)
    )
)]
pub async fn update_venue(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(data): ApiJson<UpdateVenue>,
) -> AppResult<ApiResponse<Venue>> {
    let venue = state.services.venues.update(id, data).await?;
    Ok(ApiResponse::new(venue).with_message("Venue updated successfully"))
}

/// Deactivate a venue
#[utoipa::path(
    delete,
    path = "/venues/{id}",
    tag = "venues",
    params(("id" = Uuid, Path, description = "Venue ID")),
    responses(
        (status = 200, description = "Venue deleted")
    )
)]
pub async fn delete_venue(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<ApiResponse<()>> {
    state.services.venues.delete(id).await?;
    Ok(ApiResponse::message("Venue deleted successfully"))
}
