// Page cache middleware - serves whole GET responses from the TTL page cache
// Entries are never invalidated by writes; a new post shows up once the entry expires.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::app_state::AppState;
use crate::error::AppError;
use crate::infrastructure::cache::CachedPage;

const KEY_PREFIX: &str = "index_page:";

/// Largest body the cache will buffer.
const MAX_CACHED_BODY: usize = 2 * 1024 * 1024;

/// Path and query together, so every page of the feed is cached apart.
pub fn page_cache_key(request: &Request) -> String {
    let uri = request.uri();
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}{}", KEY_PREFIX, path)
}

pub async fn page_cache_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = page_cache_key(&request);
    if let Some(page) = state.page_cache.get(&key).await {
        debug!("Page cache hit for {}", key);
        return cached_response(page);
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match to_bytes(body, MAX_CACHED_BODY).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Could not buffer response for {}: {}", key, e);
            return AppError::Internal("Failed to read response body".to_string()).into_response();
        }
    };

    state
        .page_cache
        .insert(
            key,
            CachedPage {
                body: body.clone(),
                content_type: parts.headers.get(CONTENT_TYPE).cloned(),
            },
        )
        .await;

    Response::from_parts(parts, Body::from(body))
}

fn cached_response(page: CachedPage) -> Response {
    let mut response = Response::new(Body::from(page.body));
    if let Some(content_type) = page.content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}
