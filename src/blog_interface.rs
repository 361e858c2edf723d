// Blog HTTP interface - feed pages, post mutations and follow edges
// Handlers only translate HTTP to BlogService calls; rendering is JSON, redirects are 303.

use axum::{
    extract::{rejection::FormRejection, OriginalUri, Path as AxumPath, Query, State},
    http::Uri,
    middleware,
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    app_state::AppState,
    auth_interface::create_auth_router,
    core::PageQuery,
    error::{AppError, AppResult},
    infrastructure::middleware::{page_cache_middleware, viewer_context_middleware, Vc},
    models::PostId,
    services::{
        CommentForm, FeedPage, GroupFeed, Outcome, PostDetail, PostForm, PostFormView, ProfileFeed,
    },
};

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Render(value) => Json(value).into_response(),
            Outcome::Redirect(location) => Redirect::to(&location).into_response(),
        }
    }
}

/// Path plus query, used as the `next` target of login redirects.
pub fn requested_path(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

// A missing or unreadable body counts as an empty form, so privacy checks still run first.
fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Treating unreadable form body as empty: {}", rejection);
            T::default()
        }
    }
}

// Non-numeric ids never match a post.
fn parse_post_id(raw: &str) -> AppResult<PostId> {
    raw.parse::<PostId>()
        .map_err(|_| AppError::NotFound(format!("Post {} not found", raw)))
}

// HTTP Handlers

pub async fn index_handler(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<FeedPage>, AppError> {
    Ok(Json(state.blog.global_feed(page.number()).await?))
}

pub async fn group_handler(
    State(state): State<AppState>,
    AxumPath(slug): AxumPath<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<GroupFeed>, AppError> {
    Ok(Json(state.blog.group_feed(&slug, page.number()).await?))
}

pub async fn profile_handler(
    State(state): State<AppState>,
    vc: Vc,
    AxumPath(username): AxumPath<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ProfileFeed>, AppError> {
    Ok(Json(state.blog.profile_feed(&vc, &username, page.number()).await?))
}

pub async fn post_detail_handler(
    State(state): State<AppState>,
    AxumPath(post_id): AxumPath<String>,
) -> Result<Json<PostDetail>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    Ok(Json(state.blog.post_detail(post_id).await?))
}

pub async fn post_create_form_handler(
    State(state): State<AppState>,
    vc: Vc,
    OriginalUri(uri): OriginalUri,
) -> Result<Outcome<PostFormView>, AppError> {
    state.blog.new_post_form(&vc, &requested_path(&uri)).await
}

pub async fn post_create_handler(
    State(state): State<AppState>,
    vc: Vc,
    OriginalUri(uri): OriginalUri,
    form: Result<Form<PostForm>, FormRejection>,
) -> Result<Outcome<PostFormView>, AppError> {
    state
        .blog
        .create_post(&vc, &requested_path(&uri), form_or_default(form))
        .await
}

pub async fn post_edit_form_handler(
    State(state): State<AppState>,
    vc: Vc,
    OriginalUri(uri): OriginalUri,
    AxumPath(post_id): AxumPath<String>,
) -> Result<Outcome<PostFormView>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    state
        .blog
        .edit_post_form(&vc, &requested_path(&uri), post_id)
        .await
}

pub async fn post_edit_handler(
    State(state): State<AppState>,
    vc: Vc,
    OriginalUri(uri): OriginalUri,
    AxumPath(post_id): AxumPath<String>,
    form: Result<Form<PostForm>, FormRejection>,
) -> Result<Outcome<PostFormView>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    state
        .blog
        .edit_post(&vc, &requested_path(&uri), post_id, form_or_default(form))
        .await
}

pub async fn add_comment_handler(
    State(state): State<AppState>,
    vc: Vc,
    OriginalUri(uri): OriginalUri,
    AxumPath(post_id): AxumPath<String>,
    form: Result<Form<CommentForm>, FormRejection>,
) -> Result<Outcome<()>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    state
        .blog
        .add_comment(&vc, &requested_path(&uri), post_id, form_or_default(form))
        .await
}

pub async fn follow_index_handler(
    State(state): State<AppState>,
    vc: Vc,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageQuery>,
) -> Result<Outcome<FeedPage>, AppError> {
    state
        .blog
        .follow_feed(&vc, &requested_path(&uri), page.number())
        .await
}

pub async fn profile_follow_handler(
    State(state): State<AppState>,
    vc: Vc,
    OriginalUri(uri): OriginalUri,
    AxumPath(username): AxumPath<String>,
) -> Result<Outcome<()>, AppError> {
    state.blog.follow(&vc, &requested_path(&uri), &username).await
}

pub async fn profile_unfollow_handler(
    State(state): State<AppState>,
    vc: Vc,
    OriginalUri(uri): OriginalUri,
    AxumPath(username): AxumPath<String>,
) -> Result<Outcome<()>, AppError> {
    state.blog.unfollow(&vc, &requested_path(&uri), &username).await
}

pub async fn not_found_handler() -> AppError {
    AppError::NotFound("Page not found".to_string())
}

// Create blog router
pub fn create_blog_router(state: AppState) -> Router {
    // Only the home page goes through the page cache
    let cached = Router::new()
        .route("/", get(index_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            page_cache_middleware,
        ));

    Router::new()
        .merge(cached)

        // Feeds
        .route("/group/{slug}/", get(group_handler))
        .route("/profile/{username}/", get(profile_handler))
        .route("/follow/", get(follow_index_handler))

        // Posts and comments
        .route("/create/", get(post_create_form_handler).post(post_create_handler))
        .route("/posts/{post_id}/", get(post_detail_handler))
        .route(
            "/posts/{post_id}/edit/",
            get(post_edit_form_handler).post(post_edit_handler),
        )
        .route("/posts/{post_id}/comment/", post(add_comment_handler))

        // Follow edges
        .route("/profile/{username}/follow/", get(profile_follow_handler))
        .route("/profile/{username}/unfollow/", get(profile_unfollow_handler))

        .merge(create_auth_router())
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
