// Access control - who may perform which mutation

pub mod privacy;

pub use privacy::{
    login_redirect_url, AuthenticatedRule, AuthorOnlyRule, Denial, LoginRequiredRule,
    PrivacyContext, PrivacyOperation, PrivacyRegistry, PrivacyResult, PrivacyRule,
};
