//! Events API endpoints

use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        event::{CreateEvent, EventDetails, EventListQuery},
        LimitQuery,
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AuthenticatedUser};

const DEFAULT_EVENT_LIMIT: i64 = 20;

/// Find the event for a (venue, band, date) show, creating it if absent
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created", body = EventDetails),
        (status = 200, description = "Existing event", body = EventDetails),
        (status = 404, description = "Venue or band not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(data): ApiJson<CreateEvent>,
) -> AppResult<(StatusCode, ApiResponse<EventDetails>)> {
    let (event, created) = state
        .services
        .events
        .resolve_or_create(&data, Some(user.id()))
        .await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, ApiResponse::new(event)))
}

/// Events with the most check-ins over the last 30 days
#[utoipa::path(
    get,
    path = "/events/trending",
    tag = "events",
    params(LimitQuery),
    responses(
        (status = 200, description = "Trending events", body = [EventDetails])
    )
)]
pub async fn trending_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<ApiResponse<Vec<EventDetails>>> {
    let events = state.services.events.trending(query.resolve(10)).await?;
    Ok(ApiResponse::new(events))
}

/// Get event by ID
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = EventDetails),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<EventDetails>> {
    let event = state.services.events.get(id).await?;
    Ok(ApiResponse::new(event))
}

/// Events at a venue
#[utoipa::path(
    get,
    path = "/events/venue/{venue_id}",
    tag = "events",
    params(("venue_id" = Uuid, Path, description = "Venue ID"), EventListQuery),
    responses(
        (status = 200, description = "Events at the venue", body = [EventDetails])
    )
)]
pub async fn venue_events(
    State(state): State<AppState>,
    ApiPath(venue_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<EventListQuery>,
) -> AppResult<ApiResponse<Vec<EventDetails>>> {
    let limit = LimitQuery { limit: query.limit }.resolve(DEFAULT_EVENT_LIMIT);
    let events = state
        .services
        .events
        .by_venue(venue_id, query.upcoming.unwrap_or(true), limit)
        .await?;
    Ok(ApiResponse::new(events))
}

/// Events by a band
#[utoipa::path(
    get,
    path = "/events/band/{band_id}",
    tag = "events",
    params(("band_id" = Uuid, Path, description = "Band ID"), EventListQuery),
    responses(
        (status = 200, description = "Events by the band", body = [EventDetails])
    )
)]
pub async fn band_events(
    State(state): State<AppState>,
    ApiPath(band_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<EventListQuery>,
) -> AppResult<ApiResponse<Vec<EventDetails>>> {
    let limit = LimitQuery { limit: query.limit }.resolve(DEFAULT_EVENT_LIMIT);
    let events = state
        .services
        .events
        .by_band(band_id, query.upcoming.unwrap_or(true), limit)
        .await?;
    Ok(ApiResponse::new(events))
}

/// Delete an event without check-ins
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 409, description = "Event has check-ins", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.services.events.delete(id).await?;
    Ok(ApiResponse::message("Event deleted successfully"))
}
