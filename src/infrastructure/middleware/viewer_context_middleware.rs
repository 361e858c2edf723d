// ViewerContext Middleware - resolves the session and injects the viewer
// Handlers only ever see the ViewerContext, never cookies or headers.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::debug;

use crate::app_state::AppState;
use crate::infrastructure::viewer::ViewerContext;

/// Where the request's session token came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    Cookie(String),
    Bearer(String),
}

impl SessionSource {
    pub fn token(&self) -> &str {
        match self {
            SessionSource::Cookie(token) | SessionSource::Bearer(token) => token,
        }
    }
}

/// Cookie first, then an `Authorization: Bearer` header.
pub fn extract_session(jar: &CookieJar, headers: &HeaderMap, cookie_name: &str) -> Option<SessionSource> {
    if let Some(cookie) = jar.get(cookie_name) {
        if !cookie.value().is_empty() {
            return Some(SessionSource::Cookie(cookie.value().to_string()));
        }
    }

    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| SessionSource::Bearer(token.to_string()))
}

/// Unknown or logged-out tokens fall back to an anonymous viewer.
pub async fn viewer_context_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = extract_session(&jar, request.headers(), &state.config.auth.session_cookie);

    let viewer = match session {
        Some(source) => match state.auth.resolve(source.token()).await {
            Ok(Some(user)) => ViewerContext::authenticated(user, source.token()),
            Ok(None) => {
                debug!("Ignoring unknown session token");
                ViewerContext::anonymous()
            }
            Err(e) => return e.into_response(),
        },
        None => ViewerContext::anonymous(),
    };

    request.extensions_mut().insert(Arc::new(viewer));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn cookie_wins_over_bearer() {
        let jar = CookieJar::new().add(Cookie::new("sessionid", "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(
            extract_session(&jar, &headers, "sessionid"),
            Some(SessionSource::Cookie("from-cookie".into()))
        );
        assert_eq!(
            extract_session(&CookieJar::new(), &headers, "sessionid"),
            Some(SessionSource::Bearer("from-header".into()))
        );
    }

    #[test]
    fn no_credentials_means_no_session() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session(&CookieJar::new(), &headers, "sessionid"), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_session(&CookieJar::new(), &headers, "sessionid"), None);
    }
}
