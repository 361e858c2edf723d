use std::sync::Arc;

use crate::{
    config::Config,
    infrastructure::{
        cache::PageCache,
        database::DatabaseInterface,
        sqlite_database::SqliteDatabase,
    },
    services::{AuthService, BlogService},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DatabaseInterface>,
    pub blog: BlogService,
    pub auth: AuthService,
    pub page_cache: Arc<PageCache>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let database =
            SqliteDatabase::connect(&config.database.url, config.database.max_connections).await?;
        database.initialize().await?;

        Ok(Self::with_store(Arc::new(database), config))
    }

    /// State over an already initialized store.
    pub fn with_store(store: Arc<dyn DatabaseInterface>, config: Config) -> Self {
        let page_cache = Arc::new(PageCache::new(
            config.cache.capacity,
            config.index_cache_ttl(),
        ));

        Self {
            blog: BlogService::new(store.clone(), &config),
            auth: AuthService::new(store.clone()),
            store,
            page_cache,
            config,
        }
    }

    pub async fn clear_page_cache(&self) {
        self.page_cache.clear().await;
    }
}
