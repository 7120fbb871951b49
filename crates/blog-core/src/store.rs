//! Store traits for the blog collections

use crate::types::{Article, ArticleStatus, User};
use crate::Result;
use async_trait::async_trait;

/// Article store
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// List articles filtered by status (`None` keeps everything), newest
    /// first, windowed to `[offset, offset + limit)`. An offset past the end
    /// yields an empty vec. Returned articles carry the owner snapshot when
    /// the referenced user exists.
    async fn list_articles(
        &self,
        limit: i64,
        offset: i64,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<Article>>;

    async fn get_article(&self, id: i64) -> Result<Option<Article>>;

    /// Insert a new article. The store assigns the id and both timestamps;
    /// caller-supplied values for them are ignored. Returns the stored copy.
    async fn create_article(&self, article: &Article) -> Result<Article>;

    /// Overwrite the stored article with the same id, refreshing
    /// `updated_at`. Succeeds without effect when the id is absent.
    async fn update_article(&self, article: &Article) -> Result<()>;

    /// Succeeds without effect when the id is absent.
    async fn delete_article(&self, id: i64) -> Result<()>;

    /// Succeeds without effect when the id is absent.
    async fn increment_article_views(&self, id: i64) -> Result<()>;
}

/// User store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. The store assigns the id and both timestamps and
    /// rejects a duplicate username with `StoreError::UsernameTaken`; the
    /// existence check and the insert share one critical section. Returns
    /// the stored copy.
    async fn create_user(&self, user: &User) -> Result<User>;

    /// All users, ascending id.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// First case-sensitive exact match, `None` when absent.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Everything the handler layer needs, behind one object
pub trait BlogStore: ArticleStore + UserStore {}

impl<T: ArticleStore + UserStore> BlogStore for T {}
