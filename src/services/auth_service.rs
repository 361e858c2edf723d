// AuthService - signup, login and session lookup

use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::forms::{CredentialsForm, FormErrors, INVALID_LOGIN, NON_FIELD_ERRORS, USERNAME_TAKEN};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::DatabaseInterface;
use crate::infrastructure::security::{hash_password, new_session_token, verify_password};
use crate::models::User;

/// A user with a freshly opened session
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn DatabaseInterface>,
}

impl AuthService {
    pub fn new(store: Arc<dyn DatabaseInterface>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn signup(&self, form: &CredentialsForm) -> AppResult<Result<Session, FormErrors>> {
        let (username, password) = match form.validate_signup() {
            Ok(fields) => fields,
            Err(errors) => return Ok(Err(errors)),
        };

        if self.store.get_user_by_username(&username).await?.is_some() {
            let mut errors = FormErrors::default();
            errors.add("username", USERNAME_TAKEN);
            return Ok(Err(errors));
        }

        // Hashing blocks; run it off the async workers.
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

        let user = match self.store.create_user(&username, &password_hash).await {
            Ok(user) => user,
            Err(AppError::Validation(_)) => {
                let mut errors = FormErrors::default();
                errors.add("username", USERNAME_TAKEN);
                return Ok(Err(errors));
            }
            Err(e) => return Err(e),
        };
        info!("Signed up user {}", user.username);

        Ok(Ok(self.open_session(user).await?))
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &CredentialsForm) -> AppResult<Result<Session, FormErrors>> {
        let (username, password) = match form.validate_login() {
            Ok(fields) => fields,
            Err(errors) => return Ok(Err(errors)),
        };

        let credentials = self.store.get_credentials(&username).await?;
        let Some(credentials) = credentials else {
            warn!("Login attempt for unknown user");
            return Ok(Err(invalid_login()));
        };

        let stored_hash = credentials.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?;
        if !verified {
            warn!("Login attempt with a wrong password");
            return Ok(Err(invalid_login()));
        }

        Ok(Ok(self.open_session(credentials.user).await?))
    }

    pub async fn open_session(&self, user: User) -> AppResult<Session> {
        let token = new_session_token();
        self.store.create_session(&token, user.id).await?;
        Ok(Session { user, token })
    }

    pub async fn logout(&self, token: &str) -> AppResult<bool> {
        self.store.delete_session(token).await
    }

    pub async fn resolve(&self, token: &str) -> AppResult<Option<User>> {
        self.store.get_session_user(token).await
    }
}

fn invalid_login() -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add(NON_FIELD_ERRORS, INVALID_LOGIN);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite_database::SqliteDatabase;

    async fn service() -> AuthService {
        AuthService::new(Arc::new(SqliteDatabase::new_in_memory().await.unwrap()))
    }

    fn form(username: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn signup_then_login() {
        let auth = service().await;
        let session = auth.signup(&form("admin", "s3cret-pass")).await.unwrap().unwrap();
        assert_eq!(
            auth.resolve(&session.token).await.unwrap().map(|u| u.username),
            Some("admin".to_string())
        );

        let again = auth.login(&form("admin", "s3cret-pass")).await.unwrap().unwrap();
        assert_ne!(again.token, session.token);

        assert!(auth.logout(&again.token).await.unwrap());
        assert!(auth.resolve(&again.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_form_error() {
        let auth = service().await;
        auth.signup(&form("admin", "s3cret-pass")).await.unwrap().unwrap();
        let errors = auth
            .signup(&form("admin", "other-pass"))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(errors.field("username"), [USERNAME_TAKEN.to_string()]);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = service().await;
        auth.signup(&form("admin", "s3cret-pass")).await.unwrap().unwrap();
        let errors = auth.login(&form("admin", "nope-nope")).await.unwrap().unwrap_err();
        assert_eq!(errors.field(NON_FIELD_ERRORS), [INVALID_LOGIN.to_string()]);
        let errors = auth.login(&form("ghost", "nope-nope")).await.unwrap().unwrap_err();
        assert_eq!(errors.field(NON_FIELD_ERRORS), [INVALID_LOGIN.to_string()]);
    }
}
