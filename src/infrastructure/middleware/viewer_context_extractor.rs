// ViewerContext Extractor - hands the request's viewer to handlers

use crate::infrastructure::viewer::ViewerContext;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use std::sync::Arc;

/// Cheap-to-clone handle on the request's ViewerContext.
///
/// ```ignore
/// async fn handler(vc: Vc) -> impl IntoResponse {
///     vc.user_id()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

impl Vc {
    pub fn new(vc: Arc<ViewerContext>) -> Self {
        Self(vc)
    }

    pub fn arc(self) -> Arc<ViewerContext> {
        self.0
    }
}

impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<ViewerContext> for Vc {
    fn as_ref(&self) -> &ViewerContext {
        &self.0
    }
}

// Routes outside the viewer middleware see an anonymous viewer.
impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let vc = parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .cloned()
            .unwrap_or_else(|| Arc::new(ViewerContext::anonymous()));
        Ok(Vc(vc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use axum::http::Request;

    #[tokio::test]
    async fn extracts_injected_viewer() {
        let user = User {
            id: 7,
            username: "admin".into(),
            date_joined: chrono::Utc::now(),
        };
        let mut request = Request::new(());
        request
            .extensions_mut()
            .insert(Arc::new(ViewerContext::authenticated(user, "token")));
        let (mut parts, _) = request.into_parts();

        let vc = Vc::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(vc.user_id(), Some(7));
    }

    #[tokio::test]
    async fn missing_viewer_is_anonymous() {
        let (mut parts, _) = Request::new(()).into_parts();
        let vc = Vc::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(!vc.is_authenticated());
    }
}
