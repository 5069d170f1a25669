//! Bands API endpoints

use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        band::{Band, BandQuery, CreateBand, TrendingBand, UpdateBand},
        LimitQuery, Paginated,
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse};

/// Search bands with filters and pagination
#[utoipa::path(
    get,
    path = "/bands",
    tag = "bands",
    params(BandQuery),
    responses(
        (status = 200, description = "Paginated bands (items, total, page, limit, totalPages)", body = [Band])
    )
)]
pub async fn list_bands(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BandQuery>,
) -> AppResult<ApiResponse<Paginated<Band>>> {
    let page = state.services.bands.search(&query).await?;
    Ok(ApiResponse::new(page))
}

/// Highest rated bands
#[utoipa::path(
    get,
    path = "/bands/popular",
    tag = "bands",
    params(LimitQuery),
    responses(
        (status = 200, description = "Popular bands", body = [Band])
    )
)]
pub async fn popular_bands(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<ApiResponse<Vec<Band>>> {
    let bands = state.services.bands.popular(query.resolve(10)).await?;
    Ok(ApiResponse::new(bands))
}

/// Bands with the most reviews in the last 30 days
#[utoipa::path(
    get,
    path = "/bands/trending",
    tag = "bands",
    params(LimitQuery),
    responses(
        (status = 200, description = "Trending bands", body = [TrendingBand])
    )
)]
pub async fn trending_bands(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<ApiResponse<Vec<TrendingBand>>> {
    let bands = state.services.bands.trending(query.resolve(10)).await?;
    Ok(ApiResponse::new(bands))
}

/// Distinct genres
#[utoipa::path(
    get,
    path = "/bands/genres",
    tag = "bands",
    responses(
        (status = 200, description = "Genres", body = [String])
    )
)]
pub async fn genres(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<String>>> {
    let genres = state.services.bands.genres().await?;
    Ok(ApiResponse::new(genres))
}

/// Get band by ID
#[utoipa::path(
    get,
    path = "/bands/{id}",
    tag = "bands",
    params(("id" = Uuid, Path, description = "Band ID")),
    responses(
        (status = 200, description = "Band details", body = Band),
        (status = 404, description = "Band not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_band(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<ApiResponse<Band>> {
    let band = state.services.bands.get(id).await?;
    Ok(ApiResponse::new(band))
}

/// Create a band
#[utoipa::path(
    post,
    path = "/bands",
    tag = "bands",
    request_body = CreateBand,
    responses(
        (status = 201, description = "Band created", body = Band),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_band(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateBand>,
) -> AppResult<(StatusCode, ApiResponse<Band>)> {
    let band = state.services.bands.create(data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::new(band).with_message("Band created successfully"),
    ))
}

/// Update a band
#[utoipa::path(
    put,
    path = "/bands/{id}",
    tag = "bands",
    params(("id" = Uuid, Path, description = "Band ID")),
    request_body = UpdateBand,
    responses(
        (status = 200, description = "Band updated", body = Band)
    )
)]
pub async fn update_band(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(data): ApiJson<UpdateBand>,
) -> AppResult<ApiResponse<Band>> {
    let band = state.services.bands.update(id, data).await?;
    Ok(ApiResponse::new(band).with_message("Band updated successfully"))
}

/// Deactivate a band
#[utoipa::path(
    delete,
    path = "/bands/{id}",
    tag = "bands",
    params(("id" = Uuid, Path, description = "Band ID")),
    responses(
        (status = 200, description = "Band deleted")
    )
)]
pub async fn delete_band(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<ApiResponse<()>> {
    state.services.bands.delete(id).await?;
    Ok(ApiResponse::message("Band deleted successfully"))
}
