// Form payloads and their validation
// Invalid input is reported per field and re-rendered, never raised as an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AppResult;
use crate::infrastructure::database::DatabaseInterface;
use crate::models::{GroupId, Post};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const PASSWORD_TOO_SHORT: &str =
    "This password is too short. It must contain at least 8 characters.";
pub const INVALID_LOGIN: &str = "Please enter a correct username and password.";

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD_ERRORS: &str = "__all__";

const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));
static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[\w./-]+\.(gif|jpe?g|png|webp|bmp)$").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Fields of the create/edit post form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<GroupId>,
    pub image: Option<String>,
}

impl PostForm {
    /// The form pre-filled with a post's current values
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group.as_ref().map(|g| g.id.to_string()),
            image: post.image.clone(),
        }
    }

    /// The outer result carries store failures, the inner one field errors.
    pub async fn validate(
        &self,
        store: &dyn DatabaseInterface,
    ) -> AppResult<Result<CleanedPost, FormErrors>> {
        let mut errors = FormErrors::default();

        let text = self.text.trim().to_string();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        let group_id = match blank_to_none(self.group.as_deref()) {
            None => None,
            Some(raw) => {
                let found = match raw.parse::<GroupId>() {
                    Ok(id) => store.get_group(id).await?.map(|group| group.id),
                    Err(_) => None,
                };
                if found.is_none() {
                    errors.add("group", INVALID_CHOICE);
                }
                found
            }
        };

        let image = blank_to_none(self.image.as_deref());
        if let Some(path) = &image {
            if !IMAGE_RE.is_match(path) {
                errors.add("image", INVALID_IMAGE);
            }
        }

        if errors.is_empty() {
            Ok(Ok(CleanedPost {
                text,
                group_id,
                image,
            }))
        } else {
            Ok(Err(errors))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<String, FormErrors> {
        let text = self.text.trim();
        if text.is_empty() {
            let mut errors = FormErrors::default();
            errors.add("text", REQUIRED);
            return Err(errors);
        }
        Ok(text.to_string())
    }
}

/// Signup and login share the same two fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl CredentialsForm {
    /// Shape checks for signup; uniqueness is left to the store.
    pub fn validate_signup(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::default();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > USERNAME_MAX_LEN || !USERNAME_RE.is_match(username) {
            errors.add("username", INVALID_USERNAME);
        }

        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        } else if self.password.chars().count() < PASSWORD_MIN_LEN {
            errors.add("password", PASSWORD_TOO_SHORT);
        }

        if errors.is_empty() {
            Ok((username.to_string(), self.password.clone()))
        } else {
            Err(errors)
        }
    }

    pub fn validate_login(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::default();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        if errors.is_empty() {
            Ok((username.to_string(), self.password.clone()))
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite_database::SqliteDatabase;

    #[tokio::test]
    async fn empty_text_is_required() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let form = PostForm {
            text: "   ".into(),
            ..Default::default()
        };
        let errors = form.validate(&db).await.unwrap().unwrap_err();
        assert_eq!(errors.field("text"), [REQUIRED.to_string()]);
    }

    #[tokio::test]
    async fn unknown_group_is_an_invalid_choice() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        for group in ["42", "not-a-number"] {
            let form = PostForm {
                text: "Text".into(),
                group: Some(group.into()),
                image: None,
            };
            let errors = form.validate(&db).await.unwrap().unwrap_err();
            assert_eq!(errors.field("group"), [INVALID_CHOICE.to_string()]);
        }
    }

    #[tokio::test]
    async fn valid_form_is_cleaned() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let group = db.create_group("test-slug", "Group", "").await.unwrap();
        let form = PostForm {
            text: "  Test post \n".into(),
            group: Some(group.id.to_string()),
            image: Some("posts/small.gif".into()),
        };
        let cleaned = form.validate(&db).await.unwrap().unwrap();
        assert_eq!(cleaned.text, "Test post");
        assert_eq!(cleaned.group_id, Some(group.id));
        assert_eq!(cleaned.image.as_deref(), Some("posts/small.gif"));
    }

    #[tokio::test]
    async fn blank_group_and_image_mean_none() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let form = PostForm {
            text: "Text".into(),
            group: Some("".into()),
            image: Some(" ".into()),
        };
        let cleaned = form.validate(&db).await.unwrap().unwrap();
        assert_eq!(cleaned.group_id, None);
        assert_eq!(cleaned.image, None);
    }

    #[tokio::test]
    async fn non_image_reference_is_rejected() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let form = PostForm {
            text: "Text".into(),
            group: None,
            image: Some("posts/notes.txt".into()),
        };
        let errors = form.validate(&db).await.unwrap().unwrap_err();
        assert_eq!(errors.field("image"), [INVALID_IMAGE.to_string()]);
    }

    #[test]
    fn comment_text_is_required() {
        assert!(CommentForm { text: "".into() }.validate().is_err());
        assert_eq!(
            CommentForm { text: " New comment ".into() }.validate().unwrap(),
            "New comment"
        );
    }

    #[test]
    fn signup_checks_username_and_password() {
        let bad = CredentialsForm {
            username: "bad name!".into(),
            password: "short".into(),
        };
        let errors = bad.validate_signup().unwrap_err();
        assert_eq!(errors.field("username"), [INVALID_USERNAME.to_string()]);
        assert_eq!(errors.field("password"), [PASSWORD_TOO_SHORT.to_string()]);

        let good = CredentialsForm {
            username: "leo.tolstoy".into(),
            password: "war-and-peace".into(),
        };
        assert!(good.validate_signup().is_ok());
    }
}
