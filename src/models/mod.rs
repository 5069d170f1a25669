//! Data models for PitPulse

pub mod badge;
pub mod band;
pub mod checkin;
pub mod event;
pub mod review;
pub mod user;
pub mod venue;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Re-export commonly used types
pub use badge::{Badge, BadgeProgress, BadgeType, EarnedBadge};
pub use band::{Band, BandSummary};
pub use checkin::{CheckinComment, CheckinDetails, FeedFilter};
pub use event::{Event, EventDetails};
pub use review::{Review, ReviewDetails, ReviewTarget};
pub use user::{User, UserSummary};
pub use venue::{Venue, VenueSummary};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page number accepted; keeps `offset()` within `i64`
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Normalized page/limit pair from optional query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Simple limit parameter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn resolve(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Paginated list returned by search endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: (total + request.limit - 1) / request.limit,
        }
    }
}

/// Sort direction for list endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Origin of a venue or band record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    UserCreated,
    Foursquare,
    Setlistfm,
    Musicbrainz,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::UserCreated => "user_created",
            DataSource::Foursquare => "foursquare",
            DataSource::Setlistfm => "setlistfm",
            DataSource::Musicbrainz => "musicbrainz",
        }
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_created" => Ok(DataSource::UserCreated),
            "foursquare" => Ok(DataSource::Foursquare),
            "setlistfm" => Ok(DataSource::Setlistfm),
            "musicbrainz" => Ok(DataSource::Musicbrainz),
            other => Err(format!("Invalid data source: {}", other)),
        }
    }
}

// SQLx conversion for DataSource (stored as VARCHAR)
impl sqlx::Type<sqlx::Postgres> for DataSource {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for DataSource {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for DataSource {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

/// Great-circle distance in kilometres, as a SQL expression over the
/// `latitude`/`longitude` columns of `alias` and the bound `$lat`/`$lng`
/// placeholders. `LEAST` guards `acos` against rounding above 1.0.
pub fn haversine_sql(alias: &str, lat_param: usize, lng_param: usize) -> String {
    format!(
        "(6371.0 * acos(LEAST(1.0, \
         cos(radians(${lat})) * cos(radians({a}.latitude)) * cos(radians({a}.longitude) - radians(${lng})) \
         + sin(radians(${lat})) * sin(radians({a}.latitude)))))",
        a = alias,
        lat = lat_param,
        lng = lng_param
    )
}

/// Validate a coordinate pair
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), crate::error::AppError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(crate::error::AppError::Validation(
            "Latitude must be between -90 and 90".to_string(),
        ));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(crate::error::AppError::Validation(
            "Longitude must be between -180 and 180".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamps() {
        let req = PageRequest::new(None, None);
        assert_eq!(req, PageRequest { page: 1, limit: DEFAULT_PAGE_SIZE });
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, MAX_PAGE_SIZE);

        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn test_huge_page_does_not_overflow_offset() {
        let req = PageRequest::new(Some(i64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(req.page, MAX_PAGE);
        assert_eq!(req.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);

        let req = PageRequest::new(Some(i64::MAX), Some(20));
        assert!(req.offset() > 0);
    }

    #[test]
    fn test_total_pages() {
        let req = PageRequest::new(Some(1), Some(10));
        assert_eq!(Paginated::<i32>::new(vec![], 0, req).total_pages, 0);
        assert_eq!(Paginated::<i32>::new(vec![], 10, req).total_pages, 1);
        assert_eq!(Paginated::<i32>::new(vec![], 11, req).total_pages, 2);
    }

    #[test]
    fn test_coordinates() {
        assert!(validate_coordinates(45.5, -122.6).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(0.0, -180.5).is_err());
    }

    #[test]
    fn test_haversine_sql_placeholders() {
        let sql = haversine_sql("v", 2, 3);
        assert!(sql.contains("radians($2)"));
        assert!(sql.contains("radians($3)"));
        assert!(sql.contains("v.latitude"));
    }

    #[test]
    fn test_data_source_round_trip() {
        for source in [
            DataSource::UserCreated,
            DataSource::Foursquare,
            DataSource::Setlistfm,
            DataSource::Musicbrainz,
        ] {
            assert_eq!(source.as_str().parse::<DataSource>().unwrap(), source);
        }
        assert!("myspace".parse::<DataSource>().is_err());
    }
}
