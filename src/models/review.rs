//! Review model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{BandSummary, SortOrder, UserSummary, VenueSummary};
use crate::error::AppError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Review record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub venue_id: Option<Uuid>,
    pub band_id: Option<Uuid>,
    pub rating: i32,
    pub title: Option<String>,
    pub content: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub image_urls: Vec<String>,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn target(&self) -> Option<ReviewTarget> {
        match (self.venue_id, self.band_id) {
            (Some(id), None) => Some(ReviewTarget::Venue(id)),
            (None, Some(id)) => Some(ReviewTarget::Band(id)),
            _ => None,
        }
    }
}

/// What a review is about: exactly one venue or one band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewTarget {
    Venue(Uuid),
    Band(Uuid),
}

impl ReviewTarget {
    /// Build a target from the optional ids of a request, rejecting both or neither
    pub fn from_ids(venue_id: Option<Uuid>, band_id: Option<Uuid>) -> Result<Self, AppError> {
        match (venue_id, band_id) {
            (Some(id), None) => Ok(ReviewTarget::Venue(id)),
            (None, Some(id)) => Ok(ReviewTarget::Band(id)),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "Review cannot be for both venue and band".to_string(),
            )),
            (None, None) => Err(AppError::Validation(
                "Either venueId or bandId is required".to_string(),
            )),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReviewTarget::Venue(_) => "venue",
            ReviewTarget::Band(_) => "band",
        }
    }
}

/// Flat row of a review joined with its author and target
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    #[sqlx(flatten)]
    review: Review,
    username: String,
    user_profile_image_url: Option<String>,
    venue_name: Option<String>,
    venue_city: Option<String>,
    venue_state: Option<String>,
    venue_image_url: Option<String>,
    band_name: Option<String>,
    band_genre: Option<String>,
    band_image_url: Option<String>,
}

impl From<ReviewRow> for ReviewDetails {
    fn from(row: ReviewRow) -> Self {
        let user = UserSummary {
            id: row.review.user_id,
            username: row.username,
            profile_image_url: row.user_profile_image_url,
        };
        let venue = row.review.venue_id.zip(row.venue_name).map(|(id, name)| VenueSummary {
            id,
            name,
            city: row.venue_city,
            state: row.venue_state,
            image_url: row.venue_image_url,
        });
        let band = row.review.band_id.zip(row.band_name).map(|(id, name)| BandSummary {
            id,
            name,
            genre: row.band_genre,
            image_url: row.band_image_url,
        });
        ReviewDetails {
            review: row.review,
            user,
            venue,
            band,
        }
    }
}

/// Review with author and target summaries
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    #[serde(flatten)]
    pub review: Review,
    pub user: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<VenueSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<BandSummary>,
}

/// Create review request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub venue_id: Option<Uuid>,
    pub band_id: Option<Uuid>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub content: Option<String>,
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Update review request (the field list is the allow-list)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub content: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub image_urls: Option<Vec<String>>,
}

impl UpdateReview {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none()
            && self.title.is_none()
            && self.content.is_none()
            && self.event_date.is_none()
            && self.image_urls.is_none()
    }
}

/// Helpfulness vote
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HelpfulRequest {
    pub is_helpful: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ReviewSort {
    #[default]
    CreatedAt,
    Rating,
    HelpfulCount,
}

impl ReviewSort {
    pub fn column(&self) -> &'static str {
        match self {
            ReviewSort::CreatedAt => "r.created_at",
            ReviewSort::Rating => "r.rating",
            ReviewSort::HelpfulCount => "r.helpful_count",
        }
    }
}

/// Query parameters for review listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    pub venue_id: Option<Uuid>,
    pub band_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    /// Exact rating filter
    pub rating: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[param(value_type = Option<String>)]
    pub sort: Option<ReviewSort>,
    #[param(value_type = Option<String>)]
    pub order: Option<SortOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_requires_exactly_one() {
        let id = Uuid::new_v4();
        assert_eq!(ReviewTarget::from_ids(Some(id), None).unwrap(), ReviewTarget::Venue(id));
        assert_eq!(ReviewTarget::from_ids(None, Some(id)).unwrap(), ReviewTarget::Band(id));
        assert!(matches!(
            ReviewTarget::from_ids(Some(id), Some(Uuid::new_v4())),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(ReviewTarget::from_ids(None, None), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (3, true), (5, true), (6, false), (-2, false)] {
            let review = CreateReview {
                venue_id: Some(Uuid::new_v4()),
                band_id: None,
                rating,
                title: None,
                content: None,
                event_date: None,
                image_urls: vec![],
            };
            assert_eq!(review.validate().is_ok(), ok, "rating {}", rating);
        }
    }

    #[test]
    fn test_non_integer_rating_rejected_at_parse() {
        let parsed = serde_json::from_str::<CreateReview>(r#"{"venueId": null, "bandId": null, "rating": 4.5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_update_review_allow_list() {
        let update: UpdateReview =
            serde_json::from_str(r#"{"userId": "00000000-0000-0000-0000-000000000000", "helpfulCount": 99}"#)
                .unwrap();
        assert!(update.is_empty());

        let update: UpdateReview = serde_json::from_str(r#"{"rating": 6}"#).unwrap();
        assert!(!update.is_empty());
        assert!(update.validate().is_err());
    }
}
