//! Badge catalog and awards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Activity metric a badge threshold is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    /// Reviews written
    ReviewCount,
    /// Distinct venues reviewed
    VenueExplorer,
    /// Distinct bands reviewed
    MusicLover,
    /// Check-ins
    EventAttendance,
    /// Helpful votes received on own reviews
    HelpfulCount,
}

impl BadgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::ReviewCount => "review_count",
            BadgeType::VenueExplorer => "venue_explorer",
            BadgeType::MusicLover => "music_lover",
            BadgeType::EventAttendance => "event_attendance",
            BadgeType::HelpfulCount => "helpful_count",
        }
    }

    /// Query computing the user's current metric; `$1` is the user id
    pub fn metric_sql(&self) -> &'static str {
        match self {
            BadgeType::ReviewCount => "SELECT COUNT(*) FROM reviews WHERE user_id = $1",
            BadgeType::VenueExplorer => {
                "SELECT COUNT(DISTINCT venue_id) FROM reviews WHERE user_id = $1 AND venue_id IS NOT NULL"
            }
            BadgeType::MusicLover => {
                "SELECT COUNT(DISTINCT band_id) FROM reviews WHERE user_id = $1 AND band_id IS NOT NULL"
            }
            BadgeType::EventAttendance => "SELECT COUNT(*) FROM checkins WHERE user_id = $1",
            BadgeType::HelpfulCount => {
                "SELECT COALESCE(SUM(helpful_count), 0)::BIGINT FROM reviews WHERE user_id = $1"
            }
        }
    }
}

impl std::fmt::Display for BadgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BadgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review_count" => Ok(BadgeType::ReviewCount),
            "venue_explorer" => Ok(BadgeType::VenueExplorer),
            "music_lover" => Ok(BadgeType::MusicLover),
            "event_attendance" => Ok(BadgeType::EventAttendance),
            "helpful_count" => Ok(BadgeType::HelpfulCount),
            _ => Err(format!("Invalid badge type: {}", s)),
        }
    }
}

// SQLx conversion for BadgeType (stored as VARCHAR)
impl sqlx::Type<Postgres> for BadgeType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BadgeType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<Postgres>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BadgeType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Badge definition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub badge_type: BadgeType,
    /// Threshold the metric must reach
    pub requirement_value: i32,
    pub created_at: DateTime<Utc>,
}

/// Badge held by a user
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub badge: Badge,
    pub earned_at: DateTime<Utc>,
}

/// Progress toward a badge not yet held
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub badge: Badge,
    pub current_value: i64,
    /// Percentage in [0, 100]
    pub progress: f64,
}

impl BadgeProgress {
    pub fn new(badge: Badge, current_value: i64) -> Self {
        let progress = progress_percent(current_value, badge.requirement_value);
        Self {
            badge,
            current_value,
            progress,
        }
    }
}

/// `current / threshold * 100`, capped at 100
pub fn progress_percent(current: i64, threshold: i32) -> f64 {
    if threshold <= 0 {
        return 100.0;
    }
    (current.max(0) as f64 / threshold as f64 * 100.0).min(100.0)
}

/// Whether the metric reaches the badge threshold
pub fn meets_threshold(current: i64, threshold: i32) -> bool {
    current >= i64::from(threshold)
}

/// Result of an award pass
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardResult {
    pub badges: Vec<Badge>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BadgeType; 5] = [
        BadgeType::ReviewCount,
        BadgeType::VenueExplorer,
        BadgeType::MusicLover,
        BadgeType::EventAttendance,
        BadgeType::HelpfulCount,
    ];

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 10), 0.0);
        assert_eq!(progress_percent(5, 10), 50.0);
        assert_eq!(progress_percent(10, 10), 100.0);
        assert_eq!(progress_percent(25, 10), 100.0);
        assert!((progress_percent(1, 3) - 33.333).abs() < 0.01);
        assert_eq!(progress_percent(3, 0), 100.0);
    }

    #[test]
    fn test_meets_threshold() {
        assert!(!meets_threshold(9, 10));
        assert!(meets_threshold(10, 10));
        assert!(meets_threshold(11, 10));
    }

    #[test]
    fn test_badge_type_round_trip_and_metric_queries() {
        for badge_type in ALL {
            assert_eq!(badge_type.as_str().parse::<BadgeType>().unwrap(), badge_type);
            let sql = badge_type.metric_sql();
            assert!(sql.starts_with("SELECT"));
            assert!(sql.contains("$1"));
        }
        assert!("streak".parse::<BadgeType>().is_err());
    }

    #[test]
    fn test_badge_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(BadgeType::VenueExplorer).unwrap(),
            serde_json::json!("venue_explorer")
        );
    }
}
