use uuid::Uuid;

use crate::models::{User, UserId};

/// Request-scoped record of who is acting.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub user: Option<User>,
    pub session_token: Option<String>,
    pub request_id: String,
}

impl ViewerContext {
    pub fn anonymous() -> Self {
        ViewerContext {
            user: None,
            session_token: None,
            request_id: new_request_id(),
        }
    }

    pub fn authenticated(user: User, session_token: impl Into<String>) -> Self {
        ViewerContext {
            user: Some(user),
            session_token: Some(session_token.into()),
            request_id: new_request_id(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }
}

fn new_request_id() -> String {
    format!("req-{}", Uuid::new_v4())
}
