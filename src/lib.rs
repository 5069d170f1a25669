//! PitPulse server
//!
//! REST JSON backend for reviewing live-music venues and bands: accounts,
//! venue/band catalogs, reviews, shows, check-ins with toasts and comments,
//! and achievement badges.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
