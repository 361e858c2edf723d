use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row};
use std::str::FromStr;
use tracing::{debug, info, instrument};

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{DatabaseInterface, FeedScope, PostQuery};
use crate::models::{
    current_time_millis, datetime_from_millis, Comment, Credentials, Follow, FollowStats, Group,
    GroupId, GroupSummary, NewComment, NewPost, Post, PostChanges, PostId, User, UserId,
    UserSummary,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        date_joined INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS post_groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL CHECK (length(text) > 0),
        pub_date INTEGER NOT NULL,
        image TEXT,
        author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        group_id INTEGER REFERENCES post_groups(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        text TEXT NOT NULL CHECK (length(text) > 0),
        created INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS follows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created INTEGER NOT NULL,
        CONSTRAINT unique_followings UNIQUE (user_id, author_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_posts_pub_date ON posts(pub_date DESC, id DESC)",
    "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id, pub_date DESC)",
    "CREATE INDEX IF NOT EXISTS idx_posts_group ON posts(group_id, pub_date DESC)",
    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, created)",
    "CREATE INDEX IF NOT EXISTS idx_follows_author ON follows(author_id)",
];

const POST_SELECT: &str = "SELECT p.id, p.text, p.pub_date, p.image, \
     u.id AS author_id, u.username AS author_username, \
     g.id AS group_id, g.slug AS group_slug, g.title AS group_title \
     FROM posts p \
     JOIN users u ON u.id = p.author_id \
     LEFT JOIN post_groups g ON g.id = p.group_id";

/// SQLite implementation of the blog store
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open a pool for `url`, creating the database file when it is missing.
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid database URL {}: {}", url, e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:");
        if !in_memory {
            // The driver creates the file but not its directory.
            let filename = options.clone().get_filename();
            if let Some(dir) = filename.parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir).map_err(|e| {
                        AppError::ConfigurationError(format!(
                            "Cannot create database directory {}: {}",
                            dir.display(),
                            e
                        ))
                    })?;
                }
            }
        }
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            // Every connection to :memory: is its own database, so pin exactly one.
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            pool_options = pool_options.max_connections(max_connections.max(1));
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to {}: {}", url, e)))?;

        info!("Connected to SQLite database at {}", url);
        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        let db = Self::connect("sqlite::memory:", 1).await?;
        db.initialize().await?;
        Ok(db)
    }

    /// Create the blog tables and indexes if they do not exist yet
    pub async fn initialize(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to initialize schema: {}", e)))?;
        }
        debug!("Schema initialized");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        date_joined: datetime_from_millis(row.get("date_joined")),
    }
}

fn row_to_group(row: &SqliteRow) -> Group {
    Group {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        description: row.get("description"),
    }
}

fn row_to_post(row: &SqliteRow) -> Post {
    let group = row.get::<Option<i64>, _>("group_id").map(|id| GroupSummary {
        id,
        slug: row.get("group_slug"),
        title: row.get("group_title"),
    });

    Post {
        id: row.get("id"),
        text: row.get("text"),
        pub_date: datetime_from_millis(row.get("pub_date")),
        image: row.get("image"),
        author: UserSummary {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        group,
    }
}

fn row_to_comment(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author: UserSummary {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        text: row.get("text"),
        created: datetime_from_millis(row.get("created")),
    }
}

fn push_scope(qb: &mut QueryBuilder<'_, Sqlite>, scope: FeedScope) {
    match scope {
        FeedScope::Global => {}
        FeedScope::Group(group_id) => {
            qb.push(" WHERE p.group_id = ");
            qb.push_bind(group_id);
        }
        FeedScope::Author(author_id) => {
            qb.push(" WHERE p.author_id = ");
            qb.push_bind(author_id);
        }
        FeedScope::FollowedBy(user_id) => {
            qb.push(" WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ");
            qb.push_bind(user_id);
            qb.push(")");
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl DatabaseInterface for SqliteDatabase {
    #[instrument(skip(self, password_hash))]
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let now = current_time_millis();
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, date_joined) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Validation(format!("A user with username {} already exists", username))
            } else {
                AppError::DatabaseError(format!("Failed to create user {}: {}", username, e))
            }
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            date_joined: datetime_from_millis(now),
        })
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT id, username, date_joined FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user {}: {}", id, e)))?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT id, username, date_joined FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user {}: {}", username, e)))?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn get_credentials(&self, username: &str) -> AppResult<Option<Credentials>> {
        let row = sqlx::query(
            "SELECT id, username, date_joined, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get credentials for {}: {}", username, e)))?;

        Ok(row.map(|row| Credentials {
            user: row_to_user(&row),
            password_hash: row.get("password_hash"),
        }))
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete user {}: {}", id, e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_group(&self, slug: &str, title: &str, description: &str) -> AppResult<Group> {
        let result = sqlx::query("INSERT INTO post_groups (slug, title, description) VALUES (?, ?, ?)")
            .bind(slug)
            .bind(title)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Validation(format!("A group with slug {} already exists", slug))
                } else {
                    AppError::DatabaseError(format!("Failed to create group {}: {}", slug, e))
                }
            })?;

        Ok(Group {
            id: result.last_insert_rowid(),
            slug: slug.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    async fn get_group(&self, id: GroupId) -> AppResult<Option<Group>> {
        let row = sqlx::query("SELECT id, slug, title, description FROM post_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get group {}: {}", id, e)))?;
        Ok(row.as_ref().map(row_to_group))
    }

    async fn get_group_by_slug(&self, slug: &str) -> AppResult<Option<Group>> {
        let row = sqlx::query("SELECT id, slug, title, description FROM post_groups WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get group {}: {}", slug, e)))?;
        Ok(row.as_ref().map(row_to_group))
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        let rows = sqlx::query("SELECT id, slug, title, description FROM post_groups ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list groups: {}", e)))?;
        Ok(rows.iter().map(row_to_group).collect())
    }

    #[instrument(skip(self, post), fields(author_id = post.author_id))]
    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        let result = sqlx::query(
            "INSERT INTO posts (text, pub_date, image, author_id, group_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&post.text)
        .bind(current_time_millis())
        .bind(&post.image)
        .bind(post.author_id)
        .bind(post.group_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create post: {}", e)))?;

        let id = result.last_insert_rowid();
        self.get_post(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Post {} vanished after insert", id)))
    }

    async fn get_post(&self, id: PostId) -> AppResult<Option<Post>> {
        let mut qb = QueryBuilder::<Sqlite>::new(POST_SELECT);
        qb.push(" WHERE p.id = ");
        qb.push_bind(id);

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get post {}: {}", id, e)))?;
        Ok(row.as_ref().map(row_to_post))
    }

    #[instrument(skip(self, changes))]
    async fn update_post(&self, id: PostId, changes: PostChanges) -> AppResult<Post> {
        let result = sqlx::query("UPDATE posts SET text = ?, group_id = ?, image = ? WHERE id = ?")
            .bind(&changes.text)
            .bind(changes.group_id)
            .bind(&changes.image)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update post {}: {}", id, e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", id)));
        }

        self.get_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }

    async fn list_posts(&self, query: PostQuery) -> AppResult<Vec<Post>> {
        let mut qb = QueryBuilder::<Sqlite>::new(POST_SELECT);
        push_scope(&mut qb, query.scope);
        qb.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ");
        qb.push_bind(query.limit);
        qb.push(" OFFSET ");
        qb.push_bind(query.offset);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list posts: {}", e)))?;
        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn count_posts(&self, scope: FeedScope) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS n FROM posts p");
        push_scope(&mut qb, scope);

        let row = qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count posts: {}", e)))?;
        Ok(row.get("n"))
    }

    #[instrument(skip(self, comment), fields(post_id = comment.post_id))]
    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let now = current_time_millis();
        let result = sqlx::query(
            "INSERT INTO comments (post_id, author_id, text, created) VALUES (?, ?, ?, ?)",
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create comment: {}", e)))?;

        let author = self
            .get_user(comment.author_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", comment.author_id)))?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            post_id: comment.post_id,
            author: author.summary(),
            text: comment.text,
            created: datetime_from_millis(now),
        })
    }

    async fn list_comments(&self, post_id: PostId) -> AppResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT c.id, c.post_id, c.text, c.created, u.id AS author_id, u.username AS author_username \
             FROM comments c JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = ? ORDER BY c.created, c.id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list comments of post {}: {}", post_id, e)))?;
        Ok(rows.iter().map(row_to_comment).collect())
    }

    async fn count_comments(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM comments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count comments: {}", e)))?;
        Ok(row.get("n"))
    }

    #[instrument(skip(self))]
    async fn create_follow(&self, follow: Follow) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (user_id, author_id, created) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, author_id) DO NOTHING",
        )
        .bind(follow.user_id)
        .bind(follow.author_id)
        .bind(current_time_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create follow: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_follow(&self, follow: Follow) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(follow.user_id)
            .bind(follow.author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete follow: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn follow_exists(&self, follow: Follow) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(follow.user_id)
            .bind(follow.author_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to check follow: {}", e)))?;
        Ok(row.is_some())
    }

    async fn follow_stats(&self, user_id: UserId) -> AppResult<FollowStats> {
        let row = sqlx::query(
            "SELECT \
             (SELECT COUNT(*) FROM follows WHERE author_id = ?) AS followers_count, \
             (SELECT COUNT(*) FROM follows WHERE user_id = ?) AS following_count",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get follow stats of {}: {}", user_id, e)))?;

        Ok(FollowStats {
            followers_count: row.get("followers_count"),
            following_count: row.get("following_count"),
        })
    }

    async fn count_follows(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM follows")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count follows: {}", e)))?;
        Ok(row.get("n"))
    }

    async fn create_session(&self, token: &str, user_id: UserId) -> AppResult<()> {
        sqlx::query("INSERT INTO sessions (token, user_id, created) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(current_time_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create session: {}", e)))?;
        Ok(())
    }

    async fn get_session_user(&self, token: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT u.id, u.username, u.date_joined FROM sessions s \
             JOIN users u ON u.id = s.user_id WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to resolve session: {}", e)))?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn delete_session(&self, token: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete session: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(db: &SqliteDatabase, name: &str) -> User {
        db.create_user(name, "!").await.unwrap()
    }

    async fn post(db: &SqliteDatabase, author: &User, text: &str) -> Post {
        db.create_post(NewPost {
            author_id: author.id,
            text: text.to_string(),
            group_id: None,
            image: None,
        })
        .await
        .unwrap()
    }

    fn page(scope: FeedScope) -> PostQuery {
        PostQuery { scope, limit: 10, offset: 0 }
    }

    #[tokio::test]
    async fn duplicate_username_is_a_validation_error() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        user(&db, "admin").await;
        let err = db.create_user("admin", "!").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn posts_are_listed_newest_first() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let author = user(&db, "admin").await;
        let first = post(&db, &author, "first").await;
        let second = post(&db, &author, "second").await;

        let posts = db.list_posts(page(FeedScope::Global)).await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn group_scope_filters_posts() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let author = user(&db, "admin").await;
        let group = db.create_group("test-slug", "Test group", "About").await.unwrap();
        db.create_post(NewPost {
            author_id: author.id,
            text: "in group".into(),
            group_id: Some(group.id),
            image: Some("posts/small.gif".into()),
        })
        .await
        .unwrap();
        post(&db, &author, "outside").await;

        let posts = db.list_posts(page(FeedScope::Group(group.id))).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].group.as_ref().map(|g| g.slug.as_str()), Some("test-slug"));
        assert_eq!(posts[0].image.as_deref(), Some("posts/small.gif"));
        assert_eq!(db.count_posts(FeedScope::Group(group.id)).await.unwrap(), 1);
        assert_eq!(db.count_posts(FeedScope::Global).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn follow_edges_are_unique() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let reader = user(&db, "reader").await;
        let author = user(&db, "author").await;
        let edge = Follow { user_id: reader.id, author_id: author.id };

        assert!(db.create_follow(edge).await.unwrap());
        assert!(!db.create_follow(edge).await.unwrap());
        assert_eq!(db.count_follows().await.unwrap(), 1);

        assert!(db.delete_follow(edge).await.unwrap());
        assert!(!db.delete_follow(edge).await.unwrap());
        assert_eq!(db.count_follows().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn followed_by_scope_selects_followed_authors() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let reader = user(&db, "reader").await;
        let author = user(&db, "author").await;
        let other = user(&db, "other").await;
        post(&db, &author, "followed").await;
        post(&db, &other, "not followed").await;

        let scope = FeedScope::FollowedBy(reader.id);
        assert!(db.list_posts(page(scope)).await.unwrap().is_empty());

        db.create_follow(Follow { user_id: reader.id, author_id: author.id })
            .await
            .unwrap();
        let posts = db.list_posts(page(scope)).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author.username, "author");

        let stats = db.follow_stats(author.id).await.unwrap();
        assert_eq!(stats.followers_count, 1);
        assert_eq!(stats.following_count, 0);
    }

    #[tokio::test]
    async fn deleting_a_user_cascades() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let author = user(&db, "author").await;
        let reader = user(&db, "reader").await;
        let p = post(&db, &author, "text").await;
        db.create_comment(NewComment {
            post_id: p.id,
            author_id: reader.id,
            text: "nice".into(),
        })
        .await
        .unwrap();
        db.create_follow(Follow { user_id: reader.id, author_id: author.id })
            .await
            .unwrap();

        assert!(db.delete_user(author.id).await.unwrap());
        assert_eq!(db.count_posts(FeedScope::Global).await.unwrap(), 0);
        assert_eq!(db.count_comments().await.unwrap(), 0);
        assert_eq!(db.count_follows().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sessions_resolve_to_users() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let admin = user(&db, "admin").await;
        db.create_session("token-1", admin.id).await.unwrap();

        let resolved = db.get_session_user("token-1").await.unwrap();
        assert_eq!(resolved.map(|u| u.username), Some("admin".to_string()));

        assert!(db.delete_session("token-1").await.unwrap());
        assert!(db.get_session_user("token-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn connect_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("yatube.db");
        let url = format!("sqlite://{}", path.display());

        let db = SqliteDatabase::connect(&url, 2).await.unwrap();
        db.initialize().await.unwrap();
        user(&db, "admin").await;

        assert!(path.exists());
        drop(db);
        let reopened = SqliteDatabase::connect(&url, 2).await.unwrap();
        assert!(reopened.get_user_by_username("admin").await.unwrap().is_some());
    }
}
