//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use blog_core::{Article, ArticleStatus, ArticleStore, StoreError, User, UserStore};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        // Use SqliteConnectOptions for better control
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        // Run migrations (inline for simplicity)
        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        // Users table. AUTOINCREMENT keeps ids monotonic and never reused,
        // matching the in-memory store's id policy.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                email TEXT NOT NULL DEFAULT '',
                nickname TEXT NOT NULL DEFAULT '',
                avatar TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Articles table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                slug TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'draft',
                views INTEGER NOT NULL DEFAULT 0,
                user_id INTEGER NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

const ARTICLE_SELECT: &str = r#"
    SELECT a.id, a.title, a.content, a.slug, a.category, a.tags, a.status,
           a.views, a.user_id, a.created_at, a.updated_at,
           u.id AS owner_id, u.username AS owner_username,
           u.email AS owner_email, u.nickname AS owner_nickname,
           u.avatar AS owner_avatar, u.created_at AS owner_created_at,
           u.updated_at AS owner_updated_at
    FROM articles a
    LEFT JOIN users u ON u.id = a.user_id
"#;

#[async_trait]
impl ArticleStore for Database {
    async fn list_articles(
        &self,
        limit: i64,
        offset: i64,
        status: Option<ArticleStatus>,
    ) -> blog_core::Result<Vec<Article>> {
        let rows: Vec<ArticleRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "{} WHERE a.status = ?1 ORDER BY a.created_at DESC LIMIT ?2 OFFSET ?3",
                    ARTICLE_SELECT
                ))
                .bind(status.to_string())
                .bind(limit)
                .bind(offset)
                .fetch_all(&*self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "{} ORDER BY a.created_at DESC LIMIT ?1 OFFSET ?2",
                    ARTICLE_SELECT
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&*self.pool)
                .await
            }
        }
        .map_err(db_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get_article(&self, id: i64) -> blog_core::Result<Option<Article>> {
        let row: Option<ArticleRow> =
            sqlx::query_as(&format!("{} WHERE a.id = ?1", ARTICLE_SELECT))
                .bind(id)
                .fetch_optional(&*self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.map(|r| r.into()))
    }

    async fn create_article(&self, article: &Article) -> blog_core::Result<Article> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, content, slug, category, tags, status,
                                  views, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.slug)
        .bind(&article.category)
        .bind(&article.tags)
        .bind(article.status.to_string())
        .bind(article.views)
        .bind(article.user_id)
        .bind(now)
        .bind(now)
        .execute(&*self.pool)
        .await
        .map_err(db_err)?;

        let mut stored = article.clone();
        stored.id = result.last_insert_rowid();
        stored.created_at = now;
        stored.updated_at = now;
        stored.user = None;
        Ok(stored)
    }

    async fn update_article(&self, article: &Article) -> blog_core::Result<()> {
        sqlx::query(
            r#"
            UPDATE articles
            SET title = ?1, content = ?2, slug = ?3, category = ?4, tags = ?5,
                status = ?6, views = ?7, user_id = ?8, updated_at = ?9
            WHERE id = ?10
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.slug)
        .bind(&article.category)
        .bind(&article.tags)
        .bind(article.status.to_string())
        .bind(article.views)
        .bind(article.user_id)
        .bind(Utc::now())
        .bind(article.id)
        .execute(&*self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete_article(&self, id: i64) -> blog_core::Result<()> {
        sqlx::query("DELETE FROM articles WHERE id = ?1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn increment_article_views(&self, id: i64) -> blog_core::Result<()> {
        sqlx::query("UPDATE articles SET views = views + 1 WHERE id = ?1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for Database {
    async fn create_user(&self, user: &User) -> blog_core::Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, email, nickname, avatar,
                               created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.nickname)
        .bind(&user.avatar)
        .bind(now)
        .bind(now)
        .execute(&*self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UsernameTaken(user.username.clone())
            }
            _ => db_err(e),
        })?;

        let mut stored = user.clone();
        stored.id = result.last_insert_rowid();
        stored.created_at = now;
        stored.updated_at = now;
        Ok(stored)
    }

    async fn list_users(&self) -> blog_core::Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, email, nickname, avatar,
                   created_at, updated_at
            FROM users ORDER BY id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get_user_by_username(&self, username: &str) -> blog_core::Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, email, nickname, avatar,
                   created_at, updated_at
            FROM users WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| r.into()))
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    content: String,
    slug: String,
    category: String,
    tags: String,
    status: String,
    views: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    // Owner columns from the LEFT JOIN, NULL when the user is gone
    owner_id: Option<i64>,
    owner_username: Option<String>,
    owner_email: Option<String>,
    owner_nickname: Option<String>,
    owner_avatar: Option<String>,
    owner_created_at: Option<DateTime<Utc>>,
    owner_updated_at: Option<DateTime<Utc>>,
}

impl From<ArticleRow> for Article {
    fn from(r: ArticleRow) -> Self {
        let user = r.owner_id.map(|owner_id| User {
            id: owner_id,
            username: r.owner_username.unwrap_or_default(),
            password_hash: String::new(),
            email: r.owner_email.unwrap_or_default(),
            nickname: r.owner_nickname.unwrap_or_default(),
            avatar: r.owner_avatar.unwrap_or_default(),
            created_at: r.owner_created_at.unwrap_or(r.created_at),
            updated_at: r.owner_updated_at.unwrap_or(r.updated_at),
        });

        Article {
            id: r.id,
            title: r.title,
            content: r.content,
            slug: r.slug,
            category: r.category,
            tags: r.tags,
            status: parse_status(&r.status),
            views: r.views,
            user_id: r.user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
            user,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    email: String,
    nickname: String,
    avatar: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            email: r.email,
            nickname: r.nickname,
            avatar: r.avatar,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn parse_status(s: &str) -> ArticleStatus {
    ArticleStatus::parse(s).unwrap_or(ArticleStatus::Draft)
}
