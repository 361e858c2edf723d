// Blog domain models - rows of the relational store as the service sees them

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{Comment, NewComment};
pub use follow::{Follow, FollowStats};
pub use group::{Group, GroupSummary};
pub use post::{NewPost, Post, PostChanges};
pub use user::{Credentials, User, UserSummary};

use chrono::{DateTime, Utc};

pub type UserId = i64;
pub type GroupId = i64;
pub type PostId = i64;
pub type CommentId = i64;

/// Milliseconds since the Unix epoch, the storage format of every timestamp.
pub fn current_time_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn datetime_from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
