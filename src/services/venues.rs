//! Venues service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        validate_coordinates,
        venue::{CreateVenue, NearbyQuery, NearbyVenue, UpdateVenue, Venue, VenueQuery},
        PageRequest, Paginated,
    },
    repository::Repository,
};

/// Default search radius for nearby lookups, in kilometres
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

#[derive(Clone)]
pub struct VenuesService {
    repository: Repository,
}

impl VenuesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, data: CreateVenue) -> AppResult<Venue> {
        data.validate()?;
        if data.name.trim().is_empty() {
            return Err(AppError::Validation("Venue name is required".to_string()));
        }
        let venue = self.repository.venues.create(&data).await?;
        tracing::info!(venue_id = %venue.id, name = %venue.name, "Venue created");
        Ok(venue)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Venue> {
        self.repository.venues.get_by_id(id).await
    }

    pub async fn search(&self, query: &VenueQuery) -> AppResult<Paginated<Venue>> {
        let page = PageRequest::new(query.page, query.limit);
        let (venues, total) = self.repository.venues.search(query, page).await?;
        Ok(Paginated::new(venues, total, page))
    }

    pub async fn update(&self, id: Uuid, data: UpdateVenue) -> AppResult<Venue> {
        data.validate()?;
        if data.is_empty() {
            return Err(AppError::Validation("No valid fields to update".to_string()));
        }
        self.repository.venues.update(id, &data).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.venues.deactivate(id).await?;
        tracing::info!(venue_id = %id, "Venue deactivated");
        Ok(())
    }

    pub async fn popular(&self, limit: i64) -> AppResult<Vec<Venue>> {
        self.repository.venues.popular(limit).await
    }

    pub async fn near(&self, query: &NearbyQuery, limit: i64) -> AppResult<Vec<NearbyVenue>> {
        validate_coordinates(query.lat, query.lng)?;
        let radius = resolve_radius(query.radius)?;
        self.repository.venues.near(query.lat, query.lng, radius, limit).await
    }
}

/// Radius in kilometres, defaulting to [`DEFAULT_RADIUS_KM`]
pub fn resolve_radius(radius: Option<f64>) -> AppResult<f64> {
    match radius {
        None => Ok(DEFAULT_RADIUS_KM),
        Some(r) if r.is_finite() && r > 0.0 => Ok(r),
        Some(_) => Err(AppError::Validation("Radius must be a positive number".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_radius() {
        assert_eq!(resolve_radius(None).unwrap(), DEFAULT_RADIUS_KM);
        assert_eq!(resolve_radius(Some(5.5)).unwrap(), 5.5);
        assert!(resolve_radius(Some(0.0)).is_err());
        assert!(resolve_radius(Some(-3.0)).is_err());
        assert!(resolve_radius(Some(f64::NAN)).is_err());
    }
}
