// Mutation handlers - posts, comments and follow edges
// Every handler checks privacy first and answers with a form to render or a redirect.

use serde::Serialize;
use tracing::{info, instrument};

use super::blog_service::{post_path, profile_path, BlogService, Outcome};
use super::forms::{CommentForm, FormErrors, PostForm};
use crate::access::{PrivacyContext, PrivacyOperation};
use crate::error::{AppError, AppResult};
use crate::infrastructure::viewer::ViewerContext;
use crate::models::{Follow, Group, NewComment, NewPost, Post, PostChanges, PostId, User};

/// Context of the create/edit post page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostFormView {
    pub form: PostForm,
    pub errors: FormErrors,
    pub is_edit: bool,
    pub post_id: Option<PostId>,
    /// Choices for the group field.
    pub groups: Vec<Group>,
}

impl BlogService {
    async fn post_form_view(
        &self,
        form: PostForm,
        errors: FormErrors,
        post_id: Option<PostId>,
    ) -> AppResult<PostFormView> {
        Ok(PostFormView {
            form,
            errors,
            is_edit: post_id.is_some(),
            post_id,
            groups: self.store.list_groups().await?,
        })
    }

    fn actor<'a>(&self, viewer: &'a ViewerContext) -> AppResult<&'a User> {
        viewer
            .user
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }

    pub async fn new_post_form(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
    ) -> AppResult<Outcome<PostFormView>> {
        let ctx = PrivacyContext::new(PrivacyOperation::CreatePost, viewer, requested_path);
        if let Err(location) = self.authorize(&ctx) {
            return Ok(Outcome::Redirect(location));
        }
        let view = self
            .post_form_view(PostForm::default(), FormErrors::default(), None)
            .await?;
        Ok(Outcome::Render(view))
    }

    /// Valid input is stored under the actor and leads to their profile.
    #[instrument(skip(self, viewer, form), fields(request_id = %viewer.request_id))]
    pub async fn create_post(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
        form: PostForm,
    ) -> AppResult<Outcome<PostFormView>> {
        let ctx = PrivacyContext::new(PrivacyOperation::CreatePost, viewer, requested_path);
        if let Err(location) = self.authorize(&ctx) {
            return Ok(Outcome::Redirect(location));
        }
        let author = self.actor(viewer)?;

        let cleaned = match form.validate(self.store.as_ref()).await? {
            Ok(cleaned) => cleaned,
            Err(errors) => {
                return Ok(Outcome::Render(self.post_form_view(form, errors, None).await?));
            }
        };

        let post = self
            .store
            .create_post(NewPost {
                author_id: author.id,
                text: cleaned.text,
                group_id: cleaned.group_id,
                image: cleaned.image,
            })
            .await?;
        info!("Created post {} by {}", post.id, author.username);

        Ok(Outcome::Redirect(profile_path(&author.username)))
    }

    pub async fn edit_post_form(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
        post_id: PostId,
    ) -> AppResult<Outcome<PostFormView>> {
        let post = match self.authorize_edit(viewer, requested_path, post_id).await? {
            Ok(post) => post,
            Err(location) => return Ok(Outcome::Redirect(location)),
        };
        let view = self
            .post_form_view(PostForm::from_post(&post), FormErrors::default(), Some(post.id))
            .await?;
        Ok(Outcome::Render(view))
    }

    /// Only the author gets through; everyone else is redirected and nothing changes.
    #[instrument(skip(self, viewer, form), fields(request_id = %viewer.request_id))]
    pub async fn edit_post(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
        post_id: PostId,
        form: PostForm,
    ) -> AppResult<Outcome<PostFormView>> {
        let post = match self.authorize_edit(viewer, requested_path, post_id).await? {
            Ok(post) => post,
            Err(location) => return Ok(Outcome::Redirect(location)),
        };

        let cleaned = match form.validate(self.store.as_ref()).await? {
            Ok(cleaned) => cleaned,
            Err(errors) => {
                return Ok(Outcome::Render(
                    self.post_form_view(form, errors, Some(post.id)).await?,
                ));
            }
        };

        self.store
            .update_post(
                post.id,
                PostChanges {
                    text: cleaned.text,
                    group_id: cleaned.group_id,
                    image: cleaned.image,
                },
            )
            .await?;
        info!("Edited post {}", post.id);

        Ok(Outcome::Redirect(post_path(post.id)))
    }

    /// Anonymous actors are sent to log in before the post is looked up;
    /// a missing post is a 404 for everyone else.
    async fn authorize_edit(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
        post_id: PostId,
    ) -> AppResult<Result<Post, String>> {
        let post = self.store.get_post(post_id).await?;

        let mut ctx = PrivacyContext::new(PrivacyOperation::EditPost, viewer, requested_path);
        if let Some(post) = &post {
            ctx = ctx.owned_by(post.author.id, post_path(post.id));
        }
        if let Err(location) = self.authorize(&ctx) {
            if post.is_some() || !viewer.is_authenticated() {
                return Ok(Err(location));
            }
        }

        post.map(Ok)
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))
    }

    /// Stores a valid comment; valid or not, the actor lands on the post page.
    #[instrument(skip(self, viewer, form), fields(request_id = %viewer.request_id))]
    pub async fn add_comment(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
        post_id: PostId,
        form: CommentForm,
    ) -> AppResult<Outcome<()>> {
        let ctx = PrivacyContext::new(PrivacyOperation::CreateComment, viewer, requested_path);
        if let Err(location) = self.authorize(&ctx) {
            return Ok(Outcome::Redirect(location));
        }
        let author = self.actor(viewer)?;

        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

        match form.validate() {
            Ok(text) => {
                let comment = self
                    .store
                    .create_comment(NewComment {
                        post_id: post.id,
                        author_id: author.id,
                        text,
                    })
                    .await?;
                info!("Created comment {} on post {}", comment.id, post.id);
            }
            Err(errors) => {
                tracing::debug!("Discarding invalid comment on post {}: {:?}", post.id, errors);
            }
        }

        Ok(Outcome::Redirect(post_path(post.id)))
    }

    /// Idempotent: a repeated follow finds the existing edge and changes nothing.
    #[instrument(skip(self, viewer), fields(request_id = %viewer.request_id))]
    pub async fn follow(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
        username: &str,
    ) -> AppResult<Outcome<()>> {
        let ctx = PrivacyContext::new(PrivacyOperation::Follow, viewer, requested_path);
        if let Err(location) = self.authorize(&ctx) {
            return Ok(Outcome::Redirect(location));
        }
        let user = self.actor(viewer)?;
        let author = self.lookup_author(username).await?;

        if author.id == user.id {
            tracing::debug!("{} tried to follow themself", user.username);
        } else {
            let created = self
                .store
                .create_follow(Follow {
                    user_id: user.id,
                    author_id: author.id,
                })
                .await?;
            if created {
                info!("{} now follows {}", user.username, author.username);
            }
        }

        Ok(Outcome::Redirect(profile_path(&author.username)))
    }

    #[instrument(skip(self, viewer), fields(request_id = %viewer.request_id))]
    pub async fn unfollow(
        &self,
        viewer: &ViewerContext,
        requested_path: &str,
        username: &str,
    ) -> AppResult<Outcome<()>> {
        let ctx = PrivacyContext::new(PrivacyOperation::Unfollow, viewer, requested_path);
        if let Err(location) = self.authorize(&ctx) {
            return Ok(Outcome::Redirect(location));
        }
        let user = self.actor(viewer)?;
        let author = self.lookup_author(username).await?;

        let removed = self
            .store
            .delete_follow(Follow {
                user_id: user.id,
                author_id: author.id,
            })
            .await?;
        if removed {
            info!("{} unfollowed {}", user.username, author.username);
        }

        Ok(Outcome::Redirect(profile_path(&author.username)))
    }

    async fn lookup_author(&self, username: &str) -> AppResult<User> {
        self.store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))
    }
}
