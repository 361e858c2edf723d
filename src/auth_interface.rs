// Auth HTTP interface - signup, login and logout over session cookies

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    app_state::AppState,
    error::AppError,
    infrastructure::middleware::Vc,
    services::{CredentialsForm, FormErrors, Session},
};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Context of the signup and login pages
#[derive(Debug, Serialize)]
pub struct CredentialsView {
    pub form: CredentialsForm,
    pub errors: FormErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

fn session_cookie(name: &str, token: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn signed_in(state: &AppState, jar: CookieJar, session: Session, location: &str) -> Response {
    let jar = jar.add(session_cookie(&state.config.auth.session_cookie, session.token));
    (jar, Redirect::to(location)).into_response()
}

// HTTP Handlers

pub async fn signup_form_handler() -> Json<CredentialsView> {
    Json(CredentialsView {
        form: CredentialsForm::default(),
        errors: FormErrors::default(),
        next: None,
    })
}

pub async fn signup_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    match state.auth.signup(&form).await? {
        Ok(session) => Ok(signed_in(&state, jar, session, "/")),
        Err(errors) => Ok(Json(CredentialsView {
            form,
            errors,
            next: None,
        })
        .into_response()),
    }
}

pub async fn login_form_handler(Query(query): Query<NextQuery>) -> Json<CredentialsView> {
    Json(CredentialsView {
        form: CredentialsForm::default(),
        errors: FormErrors::default(),
        next: query.next,
    })
}

pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    match state.auth.login(&form).await? {
        Ok(session) => {
            info!("User {} logged in", session.user.username);
            let location = safe_next(query.next.as_deref()).to_string();
            Ok(signed_in(&state, jar, session, &location))
        }
        Err(errors) => Ok(Json(CredentialsView {
            form,
            errors,
            next: query.next,
        })
        .into_response()),
    }
}

pub async fn logout_handler(
    State(state): State<AppState>,
    vc: Vc,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if let Some(token) = vc.session_token.as_deref() {
        state.auth.logout(token).await?;
    }
    let removal = Cookie::build((state.config.auth.session_cookie.clone(), "")).path("/");
    let jar = jar.remove(removal);
    Ok((jar, Json(serde_json::json!({ "logged_out": true }))).into_response())
}

// Create auth router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup/", get(signup_form_handler).post(signup_handler))
        .route("/auth/login/", get(login_form_handler).post(login_handler))
        .route("/auth/logout/", get(logout_handler).post(logout_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_a_local_path() {
        assert_eq!(safe_next(Some("/create/")), "/create/");
        assert_eq!(safe_next(Some("/follow/?page=2")), "/follow/?page=2");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
