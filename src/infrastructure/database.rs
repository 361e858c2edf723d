// Database interface - storage operations the blog service is written against

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    Comment, Credentials, Follow, FollowStats, Group, GroupId, NewComment, NewPost, Post,
    PostChanges, PostId, User, UserId,
};

/// Which posts a feed query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Every post.
    Global,
    /// Posts assigned to one group.
    Group(GroupId),
    /// Posts written by one author.
    Author(UserId),
    /// Posts written by anyone the given user follows.
    FollowedBy(UserId),
}

/// One offset window of a feed, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostQuery {
    pub scope: FeedScope,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait DatabaseInterface: Send + Sync {
    // Users
    /// Fails with `AppError::Validation` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User>;
    async fn get_user(&self, id: UserId) -> AppResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn get_credentials(&self, username: &str) -> AppResult<Option<Credentials>>;
    /// Deletes the user together with their posts, comments and follow edges.
    async fn delete_user(&self, id: UserId) -> AppResult<bool>;

    // Groups
    async fn create_group(&self, slug: &str, title: &str, description: &str) -> AppResult<Group>;
    async fn get_group(&self, id: GroupId) -> AppResult<Option<Group>>;
    async fn get_group_by_slug(&self, slug: &str) -> AppResult<Option<Group>>;
    async fn list_groups(&self) -> AppResult<Vec<Group>>;

    // Posts
    async fn create_post(&self, post: NewPost) -> AppResult<Post>;
    async fn get_post(&self, id: PostId) -> AppResult<Option<Post>>;
    async fn update_post(&self, id: PostId, changes: PostChanges) -> AppResult<Post>;
    async fn list_posts(&self, query: PostQuery) -> AppResult<Vec<Post>>;
    async fn count_posts(&self, scope: FeedScope) -> AppResult<i64>;

    // Comments
    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment>;
    /// Comments of a post, oldest first.
    async fn list_comments(&self, post_id: PostId) -> AppResult<Vec<Comment>>;
    async fn count_comments(&self) -> AppResult<i64>;

    // Follow edges
    /// Returns false when the edge already existed.
    async fn create_follow(&self, follow: Follow) -> AppResult<bool>;
    /// Returns false when there was no edge to delete.
    async fn delete_follow(&self, follow: Follow) -> AppResult<bool>;
    async fn follow_exists(&self, follow: Follow) -> AppResult<bool>;
    async fn follow_stats(&self, user_id: UserId) -> AppResult<FollowStats>;
    async fn count_follows(&self) -> AppResult<i64>;

    // Sessions
    async fn create_session(&self, token: &str, user_id: UserId) -> AppResult<()>;
    async fn get_session_user(&self, token: &str) -> AppResult<Option<User>>;
    async fn delete_session(&self, token: &str) -> AppResult<bool>;
}
