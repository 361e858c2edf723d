// BlogService - feed composition and mutation handling over the store
// Feeds live in feed_service.rs, mutations in post_service.rs.

use std::sync::Arc;

use crate::access::{Denial, PrivacyContext, PrivacyRegistry};
use crate::config::Config;
use crate::core::Paginator;
use crate::infrastructure::database::DatabaseInterface;
use crate::models::PostId;

/// Either a document to render or a place to send the actor.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Render(T),
    Redirect(String),
}

impl<T> Outcome<T> {
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Outcome::Redirect(location) => Some(location),
            Outcome::Render(_) => None,
        }
    }

    pub fn into_rendered(self) -> Option<T> {
        match self {
            Outcome::Render(value) => Some(value),
            Outcome::Redirect(_) => None,
        }
    }
}

pub fn post_path(post_id: PostId) -> String {
    format!("/posts/{}/", post_id)
}

pub fn profile_path(username: &str) -> String {
    format!("/profile/{}/", username)
}

#[derive(Clone)]
pub struct BlogService {
    pub(crate) store: Arc<dyn DatabaseInterface>,
    pub(crate) privacy: Arc<PrivacyRegistry>,
    pub(crate) paginator: Paginator,
    pub(crate) login_url: String,
}

impl BlogService {
    pub fn new(store: Arc<dyn DatabaseInterface>, config: &Config) -> Self {
        Self {
            store,
            privacy: Arc::new(PrivacyRegistry::with_default_rules()),
            paginator: Paginator::new(config.feed.page_size),
            login_url: config.auth.login_url.clone(),
        }
    }

    pub fn with_privacy(mut self, privacy: PrivacyRegistry) -> Self {
        self.privacy = Arc::new(privacy);
        self
    }

    pub fn store(&self) -> &Arc<dyn DatabaseInterface> {
        &self.store
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    /// Ok when allowed, otherwise the redirect target for the refusal.
    pub(crate) fn authorize(&self, ctx: &PrivacyContext<'_>) -> Result<(), String> {
        self.privacy
            .check(ctx)
            .map_err(|denial: Denial| denial.location(&self.login_url))
    }
}
