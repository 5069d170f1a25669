//! Venue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{DataSource, SortOrder};

/// Venue record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub website_url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<i32>,
    /// club, arena, bar, theater, outdoor...
    pub venue_type: Option<String>,
    pub image_url: Option<String>,
    /// Mean of all review and check-in venue ratings
    pub average_rating: f64,
    pub total_reviews: i32,
    /// Place id at the external provider the record was imported from
    pub external_id: Option<String>,
    pub source: DataSource,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Venue fields embedded in events and check-ins
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueSummary {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub image_url: Option<String>,
}

/// Venue with its distance from a search point
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearbyVenue {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub venue: Venue,
    pub distance_km: f64,
}

/// Create venue request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVenue {
    #[validate(length(min = 1, max = 255, message = "Venue name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
    #[validate(url)]
    pub website_url: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,
    pub venue_type: Option<String>,
    pub image_url: Option<String>,
    pub external_id: Option<String>,
    pub source: Option<DataSource>,
}

/// Update venue request (the field list is the allow-list)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVenue {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(url)]
    pub website_url: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    pub venue_type: Option<String>,
    pub image_url: Option<String>,
}

impl UpdateVenue {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.postal_code.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.website_url.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.capacity.is_none()
            && self.venue_type.is_none()
            && self.image_url.is_none()
    }
}

/// Sortable venue columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum VenueSort {
    Name,
    #[default]
    AverageRating,
    TotalReviews,
    CreatedAt,
    City,
}

impl VenueSort {
    pub fn column(&self) -> &'static str {
        match self {
            VenueSort::Name => "name",
            VenueSort::AverageRating => "average_rating",
            VenueSort::TotalReviews => "total_reviews",
            VenueSort::CreatedAt => "created_at",
            VenueSort::City => "city",
        }
    }
}

/// Query parameters for venue search
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VenueQuery {
    /// Free text search on name, city and description
    pub q: Option<String>,
    pub city: Option<String>,
    pub venue_type: Option<String>,
    /// Minimum average rating
    pub rating: Option<f64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[param(value_type = Option<String>)]
    pub sort: Option<VenueSort>,
    #[param(value_type = Option<String>)]
    pub order: Option<SortOrder>,
}

/// Query parameters for the nearby search
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    /// Radius in kilometres (default 50)
    pub radius: Option<f64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_from_query_string() {
        let q: VenueQuery = serde_json::from_str(r#"{"sort": "totalReviews", "order": "asc"}"#).unwrap();
        assert_eq!(q.sort.unwrap().column(), "total_reviews");
        assert_eq!(q.order.unwrap().as_sql(), "ASC");

        // Unknown sort columns are rejected rather than interpolated
        assert!(serde_json::from_str::<VenueQuery>(r#"{"sort": "name; DROP TABLE venues"}"#).is_err());
    }

    #[test]
    fn test_create_venue_validation() {
        let venue: CreateVenue = serde_json::from_str(
            r#"{"name": "The Crocodile", "city": "Seattle", "latitude": 47.61, "longitude": -122.34}"#,
        )
        .unwrap();
        assert!(venue.validate().is_ok());
        assert_eq!(venue.source, None);

        let venue: CreateVenue = serde_json::from_str(r#"{"name": "", "latitude": 123.0}"#).unwrap();
        let errors = venue.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("latitude"));
    }

    #[test]
    fn test_update_venue_empty() {
        assert!(UpdateVenue::default().is_empty());
        let update: UpdateVenue = serde_json::from_str(r#"{"averageRating": 5, "capacity": 500}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.capacity, Some(500));
    }
}
