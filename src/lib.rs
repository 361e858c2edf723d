// Yatube - blog service with groups, comments, follows and feeds

// Core types and primitives
pub mod core;
pub mod models;

// Infrastructure - store, cache, middleware and viewer context
pub mod infrastructure;

// Privacy rules for mutations
pub mod access;

// Business logic
pub mod services;

// HTTP surface
pub mod app_state;
pub mod auth_interface;
pub mod blog_interface;

// Common utilities
pub mod config;
pub mod error;
pub mod data_seeder;

// Re-exports for convenience
pub use app_state::AppState;
pub use blog_interface::create_blog_router;
pub use config::Config;
pub use error::{AppError, AppResult};
