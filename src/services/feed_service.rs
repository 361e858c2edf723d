// Feed composition - global, group, profile and follow feeds plus post detail

use serde::Serialize;
use tracing::instrument;

use super::blog_service::{BlogService, Outcome};
use super::forms::CommentForm;
use crate::access::{PrivacyContext, PrivacyOperation};
use crate::core::Page;
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{FeedScope, PostQuery};
use crate::infrastructure::viewer::ViewerContext;
use crate::models::{Comment, Follow, FollowStats, Group, Post, PostId, User};

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub page_obj: Page<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page_obj: Page<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    pub author: User,
    pub posts_count: i64,
    /// Whether the viewer follows this author.
    pub following: bool,
    #[serde(flatten)]
    pub stats: FollowStats,
    pub page_obj: Page<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    /// Number of posts by the same author.
    pub posts_count: i64,
    pub comments: Vec<Comment>,
    pub form: CommentForm,
}

impl BlogService {
    /// Page `number` of the posts selected by `scope`, newest first.
    pub async fn feed_page(&self, scope: FeedScope, number: i64) -> AppResult<Page<Post>> {
        let count = self.store.count_posts(scope).await?;
        let (limit, offset) = self.paginator.window(number);
        let posts = if offset >= count {
            Vec::new()
        } else {
            self.store
                .list_posts(PostQuery { scope, limit, offset })
                .await?
        };
        Ok(self.paginator.page(number, count, posts))
    }

    #[instrument(skip(self))]
    pub async fn global_feed(&self, number: i64) -> AppResult<FeedPage> {
        Ok(FeedPage {
            page_obj: self.feed_page(FeedScope::Global, number).await?,
        })
    }

    #[instrument(skip(self))]
    pub async fn group_feed(&self, slug: &str, number: i64) -> AppResult<GroupFeed> {
        let group = self
            .store
            .get_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", slug)))?;
        let page_obj = self.feed_page(FeedScope::Group(group.id), number).await?;
        Ok(GroupFeed { group, page_obj })
    }

    #[instrument(skip(self, viewer), fields(request_id = %viewer.request_id))]
    pub async fn profile_feed(
        &self,
        viewer: &ViewerContext,
        username: &str,
        number: i64,
    ) -> AppResult<ProfileFeed> {
        let author = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

        let following = async {
            match viewer.user_id() {
                Some(user_id) => {
                    self.store
                        .follow_exists(Follow { user_id, author_id: author.id })
                        .await
                }
                None => Ok(false),
            }
        };
        let (page_obj, stats, following) = futures::try_join!(
            self.feed_page(FeedScope::Author(author.id), number),
            self.store.follow_stats(author.id),
            following,
        )?;

        Ok(ProfileFeed {
            posts_count: page_obj.count,
            author,
            following,
            stats,
            page_obj,
        })
    }

    /// Posts of everyone the viewer follows. Following nobody yields an empty page.
    #[instrument(skip(self, viewer), fields(request_id = %viewer.request_id))]
    pub async fn follow_feed(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
        number: i64,
    ) -> AppResult<Outcome<FeedPage>> {
        let ctx = PrivacyContext::new(PrivacyOperation::ViewFollowFeed, viewer, requested_path);
        if let Err(location) = self.authorize(&ctx) {
            return Ok(Outcome::Redirect(location));
        }
        let Some(user_id) = viewer.user_id() else {
            return Ok(Outcome::Redirect(self.login_url.clone()));
        };

        let page_obj = self.feed_page(FeedScope::FollowedBy(user_id), number).await?;
        Ok(Outcome::Render(FeedPage { page_obj }))
    }

    #[instrument(skip(self))]
    pub async fn post_detail(&self, post_id: PostId) -> AppResult<PostDetail> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

        let (posts_count, comments) = futures::try_join!(
            self.store.count_posts(FeedScope::Author(post.author.id)),
            self.store.list_comments(post.id),
        )?;

        Ok(PostDetail {
            post,
            posts_count,
            comments,
            form: CommentForm::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::infrastructure::sqlite_database::SqliteDatabase;
    use crate::infrastructure::database::DatabaseInterface;
    use crate::models::NewPost;
    use std::sync::Arc;

    async fn service(page_size: usize) -> BlogService {
        let mut config = Config::with_database_url("sqlite::memory:");
        config.feed.page_size = page_size;
        let store: Arc<dyn DatabaseInterface> = Arc::new(SqliteDatabase::new_in_memory().await.unwrap());
        BlogService::new(store, &config)
    }

    async fn write_posts(service: &BlogService, author: &User, n: usize) {
        for i in 0..n {
            service
                .store()
                .create_post(NewPost {
                    author_id: author.id,
                    text: format!("post {}", i),
                    group_id: None,
                    image: None,
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn pages_are_bounded_by_page_size() {
        let service = service(10).await;
        let author = service.store().create_user("admin", "!").await.unwrap();
        write_posts(&service, &author, 13).await;

        let first = service.global_feed(1).await.unwrap().page_obj;
        assert_eq!(first.len(), 10);
        assert_eq!(first.object_list[0].text, "post 12");
        let second = service.global_feed(2).await.unwrap().page_obj;
        assert_eq!(second.len(), 3);
        let beyond = service.global_feed(5).await.unwrap().page_obj;
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn unknown_group_and_profile_are_not_found() {
        let service = service(10).await;
        let anonymous = ViewerContext::anonymous();
        assert!(matches!(
            service.group_feed("missing", 1).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.profile_feed(&anonymous, "nobody", 1).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.post_detail(99).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn follow_feed_tracks_followed_authors() {
        let service = service(10).await;
        let author = service.store().create_user("admin", "!").await.unwrap();
        let reader = service.store().create_user("Tolstoy", "!").await.unwrap();
        write_posts(&service, &author, 3).await;
        let viewer = ViewerContext::authenticated(reader.clone(), "token");

        let empty = service.follow_feed(&viewer, "/follow/", 1).await.unwrap();
        assert_eq!(empty.into_rendered().unwrap().page_obj.len(), 0);

        service
            .store()
            .create_follow(Follow { user_id: reader.id, author_id: author.id })
            .await
            .unwrap();
        let feed = service.follow_feed(&viewer, "/follow/", 1).await.unwrap();
        assert_eq!(feed.into_rendered().unwrap().page_obj.len(), 3);
    }

    #[tokio::test]
    async fn follow_feed_requires_login() {
        let service = service(10).await;
        let outcome = service
            .follow_feed(&ViewerContext::anonymous(), "/follow/", 1)
            .await
            .unwrap();
        assert_eq!(outcome.redirect_location(), Some("/auth/login/?next=/follow/"));
    }

    #[tokio::test]
    async fn profile_reports_counts_and_following() {
        let service = service(10).await;
        let author = service.store().create_user("admin", "!").await.unwrap();
        let reader = service.store().create_user("chel", "!").await.unwrap();
        write_posts(&service, &author, 2).await;
        service
            .store()
            .create_follow(Follow { user_id: reader.id, author_id: author.id })
            .await
            .unwrap();

        let viewer = ViewerContext::authenticated(reader, "token");
        let profile = service.profile_feed(&viewer, "admin", 1).await.unwrap();
        assert_eq!(profile.posts_count, 2);
        assert!(profile.following);
        assert_eq!(profile.stats.followers_count, 1);

        let anonymous = service
            .profile_feed(&ViewerContext::anonymous(), "admin", 1)
            .await
            .unwrap();
        assert!(!anonymous.following);
    }
}
