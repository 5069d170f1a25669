//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{badges, bands, checkins, events, health, reviews, users, venues};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PitPulse API",
        version = "0.3.0",
        description = "Live music venue and band reviews, check-ins and badges. \
                       Successful responses are wrapped in {success, data, message?}; \
                       errors in {success: false, error, message?}."
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::register,
        users::login,
        users::me,
        users::update_me,
        users::delete_me,
        users::check_availability,
        users::get_user,
        users::follow,
        users::unfollow,
        users::followers,
        users::following,
        // Venues
        venues::list_venues,
        venues::popular_venues,
        venues::nearby_venues,
        venues::get_venue,
        venues::create_venue,
        venues::update_venue,
        venues::delete_venue,
        // Bands
        bands::list_bands,
        bands::popular_bands,
        bands::trending_bands,
        bands::genres,
        bands::get_band,
        bands::create_band,
        bands::update_band,
        bands::delete_band,
        // Reviews
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        reviews::mark_helpful,
        // Events
        events::create_event,
        events::trending_events,
        events::get_event,
        events::venue_events,
        events::band_events,
        events::delete_event,
        // Check-ins
        checkins::create_checkin,
        checkins::feed,
        checkins::user_checkins,
        checkins::get_checkin,
        checkins::delete_checkin,
        checkins::toast,
        checkins::untoast,
        checkins::list_toasts,
        checkins::list_comments,
        checkins::add_comment,
        checkins::delete_comment,
        // Badges
        badges::list_badges,
        badges::my_badges,
        badges::user_badges,
        badges::progress,
        badges::check_awards,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::UserSummary,
            crate::models::user::UserStats,
            crate::models::user::UserProfile,
            crate::models::user::PublicProfile,
            crate::models::user::CreateUser,
            crate::models::user::LoginRequest,
            crate::models::user::AuthResponse,
            crate::models::user::UpdateProfile,
            crate::models::user::Availability,
            // Venues
            crate::models::venue::Venue,
            crate::models::venue::VenueSummary,
            crate::models::venue::NearbyVenue,
            crate::models::venue::CreateVenue,
            crate::models::venue::UpdateVenue,
            crate::models::DataSource,
            // Bands
            crate::models::band::Band,
            crate::models::band::BandSummary,
            crate::models::band::TrendingBand,
            crate::models::band::CreateBand,
            crate::models::band::UpdateBand,
            // Reviews
            crate::models::review::Review,
            crate::models::review::ReviewDetails,
            crate::models::review::CreateReview,
            crate::models::review::UpdateReview,
            crate::models::review::HelpfulRequest,
            // Events
            crate::models::event::Event,
            crate::models::event::EventDetails,
            crate::models::event::CreateEvent,
            // Check-ins
            crate::models::checkin::CheckinDetails,
            crate::models::checkin::EventSummary,
            crate::models::checkin::CreateCheckin,
            crate::models::checkin::CheckinComment,
            crate::models::checkin::CreateComment,
            crate::models::checkin::Toast,
            // Badges
            crate::models::badge::Badge,
            crate::models::badge::BadgeType,
            crate::models::badge::EarnedBadge,
            crate::models::badge::BadgeProgress,
            crate::models::badge::AwardResult,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Accounts, profiles and follows"),
        (name = "venues", description = "Venue catalog"),
        (name = "bands", description = "Band catalog"),
        (name = "reviews", description = "Venue and band reviews"),
        (name = "events", description = "Shows (venue, band, date)"),
        (name = "checkins", description = "Check-ins, toasts and comments"),
        (name = "badges", description = "Achievement badges")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by secured paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_security() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/checkins/{id}/toast"));
        assert!(doc.paths.paths.contains_key("/badges/check-awards"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
