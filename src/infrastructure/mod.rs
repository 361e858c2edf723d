// Core infrastructure modules
pub mod cache;              // TTL page cache
pub mod database;           // Store interface
pub mod middleware;         // Viewer resolution and page caching
pub mod security;           // Password hashing and session tokens
pub mod sqlite_database;    // SQLite-backed store
pub mod viewer;             // Viewer context

pub use cache::{Cache, CachedPage, PageCache};
pub use database::{DatabaseInterface, FeedScope, PostQuery};
pub use sqlite_database::SqliteDatabase;
pub use viewer::ViewerContext;
