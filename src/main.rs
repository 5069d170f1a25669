//! PitPulse Server - live music reviews and check-ins
//!
//! Binary entry point: configuration, logging, database pool, background
//! rating worker and the HTTP router.

use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitpulse_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::{
        ratings::{RatingQueue, RatingWorker},
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    init_tracing(&config.logging);

    tracing::info!("Starting PitPulse Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("Database migrations completed");
    }

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let repository = Repository::new(pool);

    // Background rating recomputation
    let (rating_queue, rating_jobs) = RatingQueue::channel(config.ratings.queue_capacity);
    let worker = RatingWorker::new(repository.clone(), rating_jobs, &config.ratings);
    tokio::spawn(worker.run());

    let services = Services::new(repository, config.auth.clone(), rating_queue);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    let addr = SocketAddr::new(server_host.parse()?, server_port);
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pitpulse_server={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Health
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Users
        .route("/users/register", post(api::users::register))
        .route("/users/login", post(api::users::login))
        .route(
            "/users/me",
            get(api::users::me).put(api::users::update_me).delete(api::users::delete_me),
        )
        .route("/users/check-availability", get(api::users::check_availability))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id/follow", post(api::users::follow).delete(api::users::unfollow))
        .route("/users/:id/followers", get(api::users::followers))
        .route("/users/:id/following", get(api::users::following))
        // Venues
        .route("/venues", get(api::venues::list_venues).post(api::venues::create_venue))
        .route("/venues/popular", get(api::venues::popular_venues))
        .route("/venues/near", get(api::venues::nearby_venues))
        .route(
            "/venues/:id",
            get(api::venues::get_venue)
                .put(api::venues::update_venue)
                .delete(api::venues::delete_venue),
        )
        // Bands
        .route("/bands", get(api::bands::list_bands).post(api::bands::create_band))
        .route("/bands/popular", get(api::bands::popular_bands))
        .route("/bands/trending", get(api::bands::trending_bands))
        .route("/bands/genres", get(api::bands::genres))
        .route(
            "/bands/:id",
            get(api::bands::get_band)
                .put(api::bands::update_band)
                .delete(api::bands::delete_band),
        )
        // Reviews
        .route("/reviews", get(api::reviews::list_reviews).post(api::reviews::create_review))
        .route(
            "/reviews/:id",
            get(api::reviews::get_review)
                .put(api::reviews::update_review)
                .delete(api::reviews::delete_review),
        )
        .route("/reviews/:id/helpful", post(api::reviews::mark_helpful))
        // Events
        .route("/events", post(api::events::create_event))
        .route("/events/trending", get(api::events::trending_events))
        .route("/events/venue/:venue_id", get(api::events::venue_events))
        .route("/events/band/:band_id", get(api::events::band_events))
        .route("/events/:id", get(api::events::get_event).delete(api::events::delete_event))
        // Check-ins
        .route("/checkins", post(api::checkins::create_checkin))
        .route("/checkins/feed", get(api::checkins::feed))
        .route("/checkins/user/:user_id", get(api::checkins::user_checkins))
        .route(
            "/checkins/:id",
            get(api::checkins::get_checkin).delete(api::checkins::delete_checkin),
        )
        .route("/checkins/:id/toast", post(api::checkins::toast).delete(api::checkins::untoast))
        .route("/checkins/:id/toasts", get(api::checkins::list_toasts))
        .route(
            "/checkins/:id/comments",
            get(api::checkins::list_comments).post(api::checkins::add_comment),
        )
        .route("/checkins/:id/comments/:comment_id", delete(api::checkins::delete_comment))
        // Badges
        .route("/badges", get(api::badges::list_badges))
        .route("/badges/me", get(api::badges::my_badges))
        .route("/badges/user/:user_id", get(api::badges::user_badges))
        .route("/badges/progress", get(api::badges::progress))
        .route("/badges/check-awards", post(api::badges::check_awards))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
