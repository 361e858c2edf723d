use serde::{Deserialize, Serialize};

use super::UserId;

/// Directed edge: `user_id` receives posts of `author_id` in their follow feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub user_id: UserId,
    pub author_id: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowStats {
    pub followers_count: i64,
    pub following_count: i64,
}
