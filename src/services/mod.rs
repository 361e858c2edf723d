// Application services - feeds, mutations, forms and authentication

pub mod auth_service;
pub mod blog_service;
pub mod feed_service;
pub mod forms;
pub mod post_service;

pub use auth_service::{AuthService, Session};
pub use blog_service::{post_path, profile_path, BlogService, Outcome};
pub use feed_service::{FeedPage, GroupFeed, PostDetail, ProfileFeed};
pub use forms::{CommentForm, CredentialsForm, FormErrors, PostForm};
pub use post_service::PostFormView;
