//! Event model (one band playing one venue on one date)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{BandSummary, VenueSummary};

/// Event record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub band_id: Uuid,
    pub event_date: NaiveDate,
    pub event_name: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
    pub created_by_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row of an event joined with venue, band and check-in count
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    #[sqlx(flatten)]
    event: Event,
    venue_name: String,
    venue_city: Option<String>,
    venue_state: Option<String>,
    venue_image_url: Option<String>,
    band_name: String,
    band_genre: Option<String>,
    band_image_url: Option<String>,
    checkin_count: i64,
}

impl From<EventRow> for EventDetails {
    fn from(row: EventRow) -> Self {
        EventDetails {
            venue: VenueSummary {
                id: row.event.venue_id,
                name: row.venue_name,
                city: row.venue_city,
                state: row.venue_state,
                image_url: row.venue_image_url,
            },
            band: BandSummary {
                id: row.event.band_id,
                name: row.band_name,
                genre: row.band_genre,
                image_url: row.band_image_url,
            },
            checkin_count: row.checkin_count,
            event: row.event,
        }
    }
}

/// Event enriched with venue/band summaries and a live check-in count
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub venue: VenueSummary,
    pub band: BandSummary,
    pub checkin_count: i64,
}

/// Resolve-or-create event request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub venue_id: Uuid,
    pub band_id: Uuid,
    /// Show date (YYYY-MM-DD)
    pub event_date: NaiveDate,
    #[validate(length(max = 255))]
    pub event_name: Option<String>,
}

/// Query parameters for per-venue and per-band event lists
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Upcoming (today or later, ascending) when true, past events (descending) otherwise
    pub upcoming: Option<bool>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_event_requires_iso_date() {
        let venue = Uuid::new_v4();
        let band = Uuid::new_v4();
        let ok = format!(r#"{{"venueId": "{}", "bandId": "{}", "eventDate": "2024-06-01"}}"#, venue, band);
        let parsed: CreateEvent = serde_json::from_str(&ok).unwrap();
        assert_eq!(parsed.event_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        let bad = format!(r#"{{"venueId": "{}", "bandId": "{}", "eventDate": "06/01/2024"}}"#, venue, band);
        assert!(serde_json::from_str::<CreateEvent>(&bad).is_err());
    }

    #[test]
    fn test_details_serialize_flat_with_nested_summaries() {
        let now = Utc::now();
        let details = EventDetails {
            event: Event {
                id: Uuid::new_v4(),
                venue_id: Uuid::new_v4(),
                band_id: Uuid::new_v4(),
                event_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                event_name: None,
                description: None,
                is_verified: false,
                created_by_user_id: None,
                created_at: now,
                updated_at: now,
            },
            venue: VenueSummary {
                id: Uuid::new_v4(),
                name: "Roadhouse".to_string(),
                city: None,
                state: None,
                image_url: None,
            },
            band: BandSummary {
                id: Uuid::new_v4(),
                name: "The Regulars".to_string(),
                genre: Some("rock".to_string()),
                image_url: None,
            },
            checkin_count: 3,
        };
        let json = serde_json::to_value(details).unwrap();
        assert_eq!(json["eventDate"], "2024-06-01");
        assert_eq!(json["venue"]["name"], "Roadhouse");
        assert_eq!(json["band"]["genre"], "rock");
        assert_eq!(json["checkinCount"], 3);
        assert_eq!(json["isVerified"], false);
    }
}
