//! Check-in model and social relations (toasts, comments)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{BandSummary, UserSummary, VenueSummary, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Check-in record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Checkin {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub venue_rating: Option<i32>,
    pub band_rating: Option<i32>,
    pub review_text: Option<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event fields embedded in a check-in
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: Uuid,
    pub event_date: NaiveDate,
    pub event_name: Option<String>,
    pub venue: VenueSummary,
    pub band: BandSummary,
}

/// Flat row of a check-in joined with user, event, venue and band
#[derive(Debug, Clone, FromRow)]
pub struct CheckinRow {
    #[sqlx(flatten)]
    checkin: Checkin,
    username: String,
    user_profile_image_url: Option<String>,
    event_date: NaiveDate,
    event_name: Option<String>,
    venue_id: Uuid,
    venue_name: String,
    venue_city: Option<String>,
    venue_state: Option<String>,
    venue_image_url: Option<String>,
    band_id: Uuid,
    band_name: String,
    band_genre: Option<String>,
    band_image_url: Option<String>,
    toast_count: i64,
    comment_count: i64,
    has_user_toasted: bool,
}

impl From<CheckinRow> for CheckinDetails {
    fn from(row: CheckinRow) -> Self {
        let checkin = row.checkin;
        CheckinDetails {
            id: checkin.id,
            user: UserSummary {
                id: checkin.user_id,
                username: row.username,
                profile_image_url: row.user_profile_image_url,
            },
            event: EventSummary {
                id: checkin.event_id,
                event_date: row.event_date,
                event_name: row.event_name,
                venue: VenueSummary {
                    id: row.venue_id,
                    name: row.venue_name,
                    city: row.venue_city,
                    state: row.venue_state,
                    image_url: row.venue_image_url,
                },
                band: BandSummary {
                    id: row.band_id,
                    name: row.band_name,
                    genre: row.band_genre,
                    image_url: row.band_image_url,
                },
            },
            venue_rating: checkin.venue_rating,
            band_rating: checkin.band_rating,
            review_text: checkin.review_text,
            image_urls: checkin.image_urls,
            toast_count: row.toast_count,
            comment_count: row.comment_count,
            has_user_toasted: row.has_user_toasted,
            created_at: checkin.created_at,
        }
    }
}

/// Check-in as shown in feeds and detail views
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckinDetails {
    pub id: Uuid,
    pub user: UserSummary,
    pub event: EventSummary,
    pub venue_rating: Option<i32>,
    pub band_rating: Option<i32>,
    pub review_text: Option<String>,
    pub image_urls: Vec<String>,
    pub toast_count: i64,
    pub comment_count: i64,
    /// Whether the requesting user has toasted this check-in
    pub has_user_toasted: bool,
    pub created_at: DateTime<Utc>,
}

/// Create check-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckin {
    pub venue_id: Uuid,
    pub band_id: Uuid,
    pub event_date: NaiveDate,
    #[validate(range(min = 1, max = 5, message = "Venue rating must be between 1 and 5"))]
    pub venue_rating: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Band rating must be between 1 and 5"))]
    pub band_rating: Option<i32>,
    #[validate(length(max = 5000))]
    pub review_text: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Flat row of a comment joined with its author
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    id: Uuid,
    checkin_id: Uuid,
    user_id: Uuid,
    comment_text: String,
    created_at: DateTime<Utc>,
    username: String,
    user_profile_image_url: Option<String>,
}

impl From<CommentRow> for CheckinComment {
    fn from(row: CommentRow) -> Self {
        CheckinComment {
            id: row.id,
            checkin_id: row.checkin_id,
            user: UserSummary {
                id: row.user_id,
                username: row.username,
                profile_image_url: row.user_profile_image_url,
            },
            comment_text: row.comment_text,
            created_at: row.created_at,
        }
    }
}

/// Comment on a check-in; immutable once created
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckinComment {
    pub id: Uuid,
    pub checkin_id: Uuid,
    pub user: UserSummary,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub comment_text: String,
}

/// A toast with the user who gave it
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub user_id: Uuid,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Activity feed scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedFilter {
    /// Check-ins by users the caller follows
    Friends,
    /// Check-ins at venues within a radius of the given point
    Nearby,
    #[default]
    Global,
}

/// Query parameters for the activity feed
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    #[param(value_type = Option<String>)]
    pub filter: Option<FeedFilter>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Latitude for the nearby filter
    pub lat: Option<f64>,
    /// Longitude for the nearby filter
    pub lng: Option<f64>,
    /// Radius in kilometres for the nearby filter (default 50)
    pub radius: Option<f64>,
}

/// Limit/offset parameters for per-user check-in lists
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OffsetQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OffsetQuery {
    /// `(limit, offset)` with the limit clamped to `1..=MAX_PAGE_SIZE`
    pub fn window(&self) -> (i64, i64) {
        window(self.limit, self.offset)
    }
}

impl FeedQuery {
    pub fn window(&self) -> (i64, i64) {
        window(self.limit, self.offset)
    }
}

fn window(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset.unwrap_or(0).max(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_filter_parsing() {
        let q: FeedQuery = serde_json::from_str(r#"{"filter": "friends"}"#).unwrap();
        assert_eq!(q.filter, Some(FeedFilter::Friends));
        let q: FeedQuery = serde_json::from_str(r#"{"filter": "nearby", "lat": 1.0, "lng": 2.0}"#).unwrap();
        assert_eq!(q.filter, Some(FeedFilter::Nearby));
        assert_eq!(FeedFilter::default(), FeedFilter::Global);
        assert!(serde_json::from_str::<FeedQuery>(r#"{"filter": "everyone"}"#).is_err());
    }

    #[test]
    fn test_window_defaults_and_clamps() {
        assert_eq!(OffsetQuery::default().window(), (DEFAULT_PAGE_SIZE, 0));
        let q = OffsetQuery {
            limit: Some(500),
            offset: Some(-4),
        };
        assert_eq!(q.window(), (MAX_PAGE_SIZE, 0));
    }

    #[test]
    fn test_checkin_rating_bounds() {
        let base = |venue_rating, band_rating| CreateCheckin {
            venue_id: Uuid::new_v4(),
            band_id: Uuid::new_v4(),
            event_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            venue_rating,
            band_rating,
            review_text: None,
            image_urls: vec![],
        };
        assert!(base(None, None).validate().is_ok());
        assert!(base(Some(1), Some(5)).validate().is_ok());
        assert!(base(Some(0), None).validate().is_err());
        assert!(base(None, Some(6)).validate().is_err());
    }
}
