use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, GroupSummary, PostId, UserId, UserSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub author: UserSummary,
    pub group: Option<GroupSummary>,
}

/// Validated input for inserting a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: UserId,
    pub text: String,
    pub group_id: Option<GroupId>,
    pub image: Option<String>,
}

/// Validated replacement values for an edited post. Author and date never change.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<GroupId>,
    pub image: Option<String>,
}
