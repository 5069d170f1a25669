//! Band model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{DataSource, SortOrder};

/// Band record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub formed_year: Option<i32>,
    pub website_url: Option<String>,
    pub spotify_url: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub image_url: Option<String>,
    pub hometown: Option<String>,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub musicbrainz_id: Option<String>,
    pub source: DataSource,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BandSummary {
    pub id: Uuid,
    pub name: String,
    pub genre: Option<String>,
    pub image_url: Option<String>,
}

/// Band with its review activity over the trending window
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendingBand {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub band: Band,
    pub recent_reviews: i64,
}

/// Create band request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBand {
    #[validate(length(min = 1, max = 255, message = "Band name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Formed year is out of range"))]
    pub formed_year: Option<i32>,
    #[validate(url)]
    pub website_url: Option<String>,
    #[validate(url)]
    pub spotify_url: Option<String>,
    #[validate(url)]
    pub instagram_url: Option<String>,
    #[validate(url)]
    pub facebook_url: Option<String>,
    pub image_url: Option<String>,
    pub hometown: Option<String>,
    pub musicbrainz_id: Option<String>,
    pub source: Option<DataSource>,
}

/// Update band request (the field list is the allow-list)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBand {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub formed_year: Option<i32>,
    #[validate(url)]
    pub website_url: Option<String>,
    #[validate(url)]
    pub spotify_url: Option<String>,
    #[validate(url)]
    pub instagram_url: Option<String>,
    #[validate(url)]
    pub facebook_url: Option<String>,
    pub image_url: Option<String>,
    pub hometown: Option<String>,
}

impl UpdateBand {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.genre.is_none()
            && self.formed_year.is_none()
            && self.website_url.is_none()
            && self.spotify_url.is_none()
            && self.instagram_url.is_none()
            && self.facebook_url.is_none()
            && self.image_url.is_none()
            && self.hometown.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum BandSort {
    Name,
    #[default]
    AverageRating,
    TotalReviews,
    CreatedAt,
    FormedYear,
}

impl BandSort {
    pub fn column(&self) -> &'static str {
        match self {
            BandSort::Name => "name",
            BandSort::AverageRating => "average_rating",
            BandSort::TotalReviews => "total_reviews",
            BandSort::CreatedAt => "created_at",
            BandSort::FormedYear => "formed_year",
        }
    }
}

/// Query parameters for band search
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BandQuery {
    /// Free text search on name, genre, hometown and description
    pub q: Option<String>,
    pub genre: Option<String>,
    /// Minimum average rating
    pub rating: Option<f64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[param(value_type = Option<String>)]
    pub sort: Option<BandSort>,
    #[param(value_type = Option<String>)]
    pub order: Option<SortOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_sort_columns() {
        let q: BandQuery = serde_json::from_str(r#"{"sort": "formedYear"}"#).unwrap();
        assert_eq!(q.sort.unwrap().column(), "formed_year");
        assert_eq!(BandSort::default().column(), "average_rating");
    }

    #[test]
    fn test_create_band_validation() {
        let band: CreateBand =
            serde_json::from_str(r#"{"name": "Idles", "genre": "punk", "formedYear": 2009}"#).unwrap();
        assert!(band.validate().is_ok());

        let band: CreateBand =
            serde_json::from_str(r#"{"name": "Idles", "formedYear": 1066, "spotifyUrl": "nope"}"#).unwrap();
        let errors = band.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("formed_year"));
        assert!(errors.field_errors().contains_key("spotify_url"));
    }
}
