// Shared harness: the full router over a throwaway SQLite file
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use yatube::{
    app_state::AppState,
    blog_interface::create_blog_router,
    config::Config,
    infrastructure::database::DatabaseInterface,
    models::{Group, NewPost, Post, User},
};

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("yatube.db").display());
        let mut config = Config::with_database_url(url);
        adjust(&mut config);

        let state = AppState::new(config).await.unwrap();
        let router = create_blog_router(state.clone());
        TestApp {
            state,
            router,
            _dir: dir,
        }
    }

    pub fn store(&self) -> &Arc<dyn DatabaseInterface> {
        &self.state.store
    }

    /// A user with an open session; the token goes in the `sessionid` cookie.
    pub async fn user(&self, username: &str) -> (User, String) {
        let user = self.store().create_user(username, "!").await.unwrap();
        let token = format!("{}-session", username);
        self.store().create_session(&token, user.id).await.unwrap();
        (user, token)
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.store()
            .create_group(slug, "Test group", "Test description")
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.store()
            .create_post(NewPost {
                author_id: author.id,
                text: text.to_string(),
                group_id: group.map(|g| g.id),
                image: None,
            })
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("sessionid={}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)], token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("sessionid={}", token));
        }
        self.send(builder.body(Body::from(form_body(fields))).unwrap()).await
    }
}

pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn assert_redirect(response: &Response<Body>, location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        location
    );
}

/// The `sessionid` value from a Set-Cookie header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .filter_map(|pair| pair.trim().strip_prefix("sessionid="))
        .map(str::to_string)
        .next()
}
