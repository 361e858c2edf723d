use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub feed: FeedConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
    /// Lifetime of a cached home page response.
    pub index_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub login_url: String,
    pub session_cookie: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/yatube.db".to_string(),
                max_connections: 5,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            cache: CacheConfig {
                capacity: 1000,
                index_ttl_secs: 20,
            },
            feed: FeedConfig { page_size: 10 },
            auth: AuthConfig {
                login_url: "/auth/login/".to_string(),
                session_cookie: "sessionid".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port),
            },
            cache: CacheConfig {
                capacity: parse_var("CACHE_CAPACITY", defaults.cache.capacity),
                index_ttl_secs: parse_var("INDEX_CACHE_TTL_SECS", defaults.cache.index_ttl_secs),
            },
            feed: FeedConfig {
                page_size: parse_var("POSTS_PER_PAGE", defaults.feed.page_size).max(1),
            },
            auth: AuthConfig {
                login_url: env::var("LOGIN_URL").unwrap_or(defaults.auth.login_url),
                session_cookie: defaults.auth.session_cookie,
            },
        })
    }

    /// Defaults pointed at a specific database, used by tests and tools.
    pub fn with_database_url(url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.database.url = url.into();
        config
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn index_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.index_ttl_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.feed.page_size, 10);
        assert_eq!(config.index_cache_ttl(), Duration::from_secs(20));
        assert_eq!(config.auth.login_url, "/auth/login/");
        assert_eq!(config.server_address(), "0.0.0.0:3000");
    }

    #[test]
    fn with_database_url_keeps_other_defaults() {
        let config = Config::with_database_url("sqlite::memory:");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.cache.capacity, 1000);
    }
}
