// Privacy rules - ordered allow/deny decisions for blog mutations
// Refusals never raise errors; they become redirects.

use crate::infrastructure::viewer::ViewerContext;
use crate::models::UserId;

/// Operations guarded by privacy rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivacyOperation {
    CreatePost,
    EditPost,
    CreateComment,
    Follow,
    Unfollow,
    ViewFollowFeed,
}

impl PrivacyOperation {
    pub const ALL: [PrivacyOperation; 6] = [
        PrivacyOperation::CreatePost,
        PrivacyOperation::EditPost,
        PrivacyOperation::CreateComment,
        PrivacyOperation::Follow,
        PrivacyOperation::Unfollow,
        PrivacyOperation::ViewFollowFeed,
    ];
}

/// Everything a rule may look at when deciding
#[derive(Debug, Clone)]
pub struct PrivacyContext<'a> {
    pub operation: PrivacyOperation,
    pub viewer: &'a ViewerContext,
    /// Author of the resource being mutated, if it has one.
    pub owner_id: Option<UserId>,
    /// Path and query the actor requested; the login return target.
    pub requested_path: String,
    /// Canonical page of the resource; where a refused actor is sent.
    pub resource_path: Option<String>,
}

impl<'a> PrivacyContext<'a> {
    pub fn new(
        operation: PrivacyOperation,
        viewer: &'a ViewerContext,
        requested_path: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            viewer,
            owner_id: None,
            requested_path: requested_path.into(),
            resource_path: None,
        }
    }

    pub fn owned_by(mut self, owner_id: UserId, resource_path: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id);
        self.resource_path = Some(resource_path.into());
        self
    }
}

/// Why an operation was refused and where the actor goes instead
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    LoginRequired { next: String },
    Redirect { to: String },
}

impl Denial {
    pub fn location(&self, login_url: &str) -> String {
        match self {
            Denial::LoginRequired { next } => login_redirect_url(login_url, next),
            Denial::Redirect { to } => to.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivacyResult {
    Allow,
    Deny(Denial),
    Skip, // Skip this rule, continue to next
}

pub trait PrivacyRule: Send + Sync {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult;

    fn name(&self) -> &str;

    fn operations(&self) -> Vec<PrivacyOperation>;

    /// Higher priority rules are evaluated first
    fn priority(&self) -> i32;
}

/// Privacy policy registry
#[derive(Default)]
pub struct PrivacyRegistry {
    rules: Vec<Box<dyn PrivacyRule>>,
}

impl PrivacyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The blog's policy: log in for every mutation, authors alone edit their posts.
    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();
        registry.register_rule(Box::new(LoginRequiredRule));
        registry.register_rule(Box::new(AuthorOnlyRule));
        registry.register_rule(Box::new(AuthenticatedRule));
        registry
    }

    pub fn register_rule(&mut self, rule: Box<dyn PrivacyRule>) {
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// First non-skip answer wins. With no answer the operation is refused.
    pub fn check(&self, ctx: &PrivacyContext<'_>) -> Result<(), Denial> {
        for rule in &self.rules {
            if !rule.operations().contains(&ctx.operation) {
                continue;
            }
            let decision = rule.evaluate(ctx);
            if decision != PrivacyResult::Skip {
                tracing::debug!(
                    rule = rule.name(),
                    operation = ?ctx.operation,
                    request_id = %ctx.viewer.request_id,
                    "privacy decision: {:?}",
                    decision
                );
            }
            match decision {
                PrivacyResult::Allow => return Ok(()),
                PrivacyResult::Deny(denial) => return Err(denial),
                PrivacyResult::Skip => continue,
            }
        }

        if ctx.viewer.is_authenticated() {
            Err(Denial::Redirect {
                to: ctx.resource_path.clone().unwrap_or_else(|| "/".to_string()),
            })
        } else {
            Err(Denial::LoginRequired {
                next: ctx.requested_path.clone(),
            })
        }
    }
}

/// Anonymous actors are sent to log in.
pub struct LoginRequiredRule;

impl PrivacyRule for LoginRequiredRule {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult {
        if ctx.viewer.is_authenticated() {
            PrivacyResult::Skip
        } else {
            PrivacyResult::Deny(Denial::LoginRequired {
                next: ctx.requested_path.clone(),
            })
        }
    }

    fn name(&self) -> &str {
        "login_required"
    }

    fn operations(&self) -> Vec<PrivacyOperation> {
        PrivacyOperation::ALL.to_vec()
    }

    fn priority(&self) -> i32 {
        200
    }
}

/// Only the author may edit a post; anyone else goes back to the post page.
pub struct AuthorOnlyRule;

impl PrivacyRule for AuthorOnlyRule {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult {
        match (ctx.viewer.user_id(), ctx.owner_id) {
            (Some(viewer_id), Some(owner_id)) if viewer_id == owner_id => PrivacyResult::Allow,
            _ => PrivacyResult::Deny(Denial::Redirect {
                to: ctx.resource_path.clone().unwrap_or_else(|| "/".to_string()),
            }),
        }
    }

    fn name(&self) -> &str {
        "author_only"
    }

    fn operations(&self) -> Vec<PrivacyOperation> {
        vec![PrivacyOperation::EditPost]
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Any logged-in actor may perform the remaining operations.
pub struct AuthenticatedRule;

impl PrivacyRule for AuthenticatedRule {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult {
        if ctx.viewer.is_authenticated() {
            PrivacyResult::Allow
        } else {
            PrivacyResult::Skip
        }
    }

    fn name(&self) -> &str {
        "authenticated"
    }

    fn operations(&self) -> Vec<PrivacyOperation> {
        PrivacyOperation::ALL.to_vec()
    }

    fn priority(&self) -> i32 {
        0
    }
}

/// `/auth/login/?next=/create/`: slashes stay literal, everything else reserved is escaped.
pub fn login_redirect_url(login_url: &str, next: &str) -> String {
    let encoded = next
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}?next={}", login_url, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use chrono::Utc;

    fn member(id: UserId) -> ViewerContext {
        ViewerContext::authenticated(
            User {
                id,
                username: format!("user{}", id),
                date_joined: Utc::now(),
            },
            "token",
        )
    }

    #[test]
    fn anonymous_actor_is_sent_to_login_for_every_operation() {
        let registry = PrivacyRegistry::with_default_rules();
        let anonymous = ViewerContext::anonymous();
        for operation in PrivacyOperation::ALL {
            let ctx = PrivacyContext::new(operation, &anonymous, "/create/");
            assert_eq!(
                registry.check(&ctx),
                Err(Denial::LoginRequired { next: "/create/".into() })
            );
        }
    }

    #[test]
    fn author_may_edit_own_post() {
        let registry = PrivacyRegistry::with_default_rules();
        let author = member(1);
        let ctx = PrivacyContext::new(PrivacyOperation::EditPost, &author, "/posts/7/edit/")
            .owned_by(1, "/posts/7/");
        assert_eq!(registry.check(&ctx), Ok(()));
    }

    #[test]
    fn non_author_is_redirected_to_post() {
        let registry = PrivacyRegistry::with_default_rules();
        let stranger = member(2);
        let ctx = PrivacyContext::new(PrivacyOperation::EditPost, &stranger, "/posts/7/edit/")
            .owned_by(1, "/posts/7/");
        assert_eq!(
            registry.check(&ctx),
            Err(Denial::Redirect { to: "/posts/7/".into() })
        );
    }

    #[test]
    fn authenticated_actor_may_comment_and_follow() {
        let registry = PrivacyRegistry::with_default_rules();
        let viewer = member(3);
        for operation in [
            PrivacyOperation::CreatePost,
            PrivacyOperation::CreateComment,
            PrivacyOperation::Follow,
            PrivacyOperation::Unfollow,
            PrivacyOperation::ViewFollowFeed,
        ] {
            let ctx = PrivacyContext::new(operation, &viewer, "/");
            assert_eq!(registry.check(&ctx), Ok(()));
        }
    }

    #[test]
    fn empty_registry_refuses() {
        let registry = PrivacyRegistry::new();
        let viewer = member(3);
        let ctx = PrivacyContext::new(PrivacyOperation::CreatePost, &viewer, "/create/");
        assert_eq!(registry.check(&ctx), Err(Denial::Redirect { to: "/".into() }));
    }

    #[test]
    fn login_redirect_keeps_slashes_and_escapes_query() {
        assert_eq!(
            login_redirect_url("/auth/login/", "/posts/1/edit/"),
            "/auth/login/?next=/posts/1/edit/"
        );
        assert_eq!(
            login_redirect_url("/auth/login/", "/follow/?page=2"),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }
}
