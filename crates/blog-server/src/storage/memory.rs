//! In-memory store emulating the relational backend
//!
//! Used when no database is configured (or the configured one cannot be
//! reached) and as a test double. Both collections live behind a single
//! reader/writer lock and the query semantics mirror the SQLite backend:
//! status filtering, newest-first ordering, limit/offset windows, and owner
//! snapshot hydration.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use blog_core::{Article, ArticleStatus, ArticleStore, Result, StoreError, User, UserStore};
use chrono::Utc;

/// Both collections and their id counters, guarded as one unit so reads can
/// hydrate owner snapshots without taking a second lock.
struct Collections {
    articles: HashMap<i64, Article>,
    users: HashMap<i64, User>,
    next_article_id: i64,
    next_user_id: i64,
}

impl Collections {
    /// Clone an article and attach the owner snapshot when the user exists.
    fn hydrate(&self, article: &Article) -> Article {
        let mut copy = article.clone();
        copy.user = self.users.get(&article.user_id).cloned();
        copy
    }
}

/// In-memory relational store emulator.
///
/// Every read returns an independent copy of the stored entry, so mutating a
/// returned value never changes what a later read observes. Ids come from
/// dedicated monotonic counters and are never reused, even after deletion.
/// All reads take the shared lock and all writes the exclusive lock, so no
/// caller observes a partially written entry.
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections {
                articles: HashMap::new(),
                users: HashMap::new(),
                next_article_id: 1,
                next_user_id: 1,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn list_articles(
        &self,
        limit: i64,
        offset: i64,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<Article>> {
        let inner = self.read()?;

        let mut matching: Vec<&Article> = inner
            .articles
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|a| inner.hydrate(a))
            .collect())
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let inner = self.read()?;
        Ok(inner.articles.get(&id).map(|a| inner.hydrate(a)))
    }

    async fn create_article(&self, article: &Article) -> Result<Article> {
        let mut inner = self.write()?;

        let now = Utc::now();
        let mut stored = article.clone();
        stored.id = inner.next_article_id;
        inner.next_article_id += 1;
        stored.created_at = now;
        stored.updated_at = now;
        stored.user = None;

        inner.articles.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_article(&self, article: &Article) -> Result<()> {
        let mut inner = self.write()?;

        if let Some(existing) = inner.articles.get_mut(&article.id) {
            let created_at = existing.created_at;
            *existing = article.clone();
            existing.created_at = created_at;
            existing.updated_at = Utc::now();
            existing.user = None;
        }
        Ok(())
    }

    async fn delete_article(&self, id: i64) -> Result<()> {
        self.write()?.articles.remove(&id);
        Ok(())
    }

    async fn increment_article_views(&self, id: i64) -> Result<()> {
        if let Some(article) = self.write()?.articles.get_mut(&id) {
            article.views += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User> {
        // Uniqueness check and insert share one exclusive critical section.
        let mut inner = self.write()?;

        if inner.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UsernameTaken(user.username.clone()));
        }

        let now = Utc::now();
        let mut stored = user.clone();
        stored.id = inner.next_user_id;
        inner.next_user_id += 1;
        stored.created_at = now;
        stored.updated_at = now;

        inner.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn article(title: &str, user_id: i64, status: ArticleStatus) -> Article {
        let mut a = Article::new(title.to_string(), format!("{} body", title), user_id);
        a.status = status;
        a
    }

    fn user(name: &str) -> User {
        User::new(name.to_string(), "hash".to_string(), name.to_string())
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryStore::new();

        let created = store
            .create_article(&article("First", 7, ArticleStatus::Draft))
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        let fetched = store.get_article(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "First");
        assert_eq!(fetched.content, "First body");
        assert_eq!(fetched.user_id, 7);
        assert_eq!(fetched.status, ArticleStatus::Draft);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.updated_at, created.updated_at);

        // Caller-supplied ids are ignored
        let mut with_id = article("Second", 7, ArticleStatus::Draft);
        with_id.id = 999;
        let created = store.create_article(&with_id).await.unwrap();
        assert_eq!(created.id, 2);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.get_article(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_window_and_filter() {
        let store = MemoryStore::new();

        for i in 0..3 {
            store
                .create_article(&article(&format!("pub-{}", i), 1, ArticleStatus::Published))
                .await
                .unwrap();
            store
                .create_article(&article(&format!("draft-{}", i), 1, ArticleStatus::Draft))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let published = store
            .list_articles(10, 0, Some(ArticleStatus::Published))
            .await
            .unwrap();
        assert_eq!(published.len(), 3);
        assert!(published.iter().all(|a| a.status == ArticleStatus::Published));

        // Newest first, window [1, 3)
        let window = store
            .list_articles(2, 1, Some(ArticleStatus::Published))
            .await
            .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].title, "pub-1");
        assert_eq!(window[1].title, "pub-0");

        // No filter keeps everything
        let all = store.list_articles(10, 0, None).await.unwrap();
        assert_eq!(all.len(), 6);

        // Limit clips the tail
        let clipped = store.list_articles(4, 4, None).await.unwrap();
        assert_eq!(clipped.len(), 2);
    }

    #[tokio::test]
    async fn test_list_offset_past_end_is_empty() {
        let store = MemoryStore::new();
        store
            .create_article(&article("Only", 1, ArticleStatus::Published))
            .await
            .unwrap();

        let out = store.list_articles(10, 100, None).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryStore::new();

        store
            .create_article(&article("Older", 1, ArticleStatus::Published))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        store
            .create_article(&article("Newer", 1, ArticleStatus::Published))
            .await
            .unwrap();

        let top = store.list_articles(1, 0, None).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "Newer");
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp() {
        let store = MemoryStore::new();

        let created = store
            .create_article(&article("Before", 1, ArticleStatus::Draft))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;

        let mut changed = created.clone();
        changed.title = "After".to_string();
        changed.status = ArticleStatus::Published;
        store.update_article(&changed).await.unwrap();

        let fetched = store.get_article(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "After");
        assert_eq!(fetched.status, ArticleStatus::Published);
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_noop() {
        let store = MemoryStore::new();

        let mut ghost = article("Ghost", 1, ArticleStatus::Draft);
        ghost.id = 42;
        store.update_article(&ghost).await.unwrap();
        assert!(store.get_article(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let store = MemoryStore::new();

        let created = store
            .create_article(&article("Doomed", 1, ArticleStatus::Draft))
            .await
            .unwrap();
        store.delete_article(created.id).await.unwrap();
        assert!(store.get_article(created.id).await.unwrap().is_none());

        // Deleting an absent id is still success
        store.delete_article(created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_ids_never_reused() {
        let store = MemoryStore::new();

        let first = store
            .create_article(&article("First", 1, ArticleStatus::Draft))
            .await
            .unwrap();
        store.delete_article(first.id).await.unwrap();

        let second = store
            .create_article(&article("Second", 1, ArticleStatus::Draft))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_copy_isolation() {
        let store = MemoryStore::new();
        store.create_user(&user("owner")).await.unwrap();

        let created = store
            .create_article(&article("Pristine", 1, ArticleStatus::Published))
            .await
            .unwrap();

        let mut fetched = store.get_article(created.id).await.unwrap().unwrap();
        fetched.title = "Tampered".to_string();
        if let Some(owner) = fetched.user.as_mut() {
            owner.username = "tampered".to_string();
        }

        let mut listed = store.list_articles(10, 0, None).await.unwrap();
        listed[0].title = "Tampered too".to_string();

        let again = store.get_article(created.id).await.unwrap().unwrap();
        assert_eq!(again.title, "Pristine");
        assert_eq!(again.user.unwrap().username, "owner");
    }

    #[tokio::test]
    async fn test_admin_scenario() {
        let store = MemoryStore::new();

        let admin = store.create_user(&user("admin")).await.unwrap();
        assert_eq!(admin.id, 1);

        store
            .create_article(&article("T", admin.id, ArticleStatus::Published))
            .await
            .unwrap();

        let listed = store
            .list_articles(10, 0, Some(ArticleStatus::Published))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_id, 1);
        assert_eq!(listed[0].user.as_ref().unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_snapshot_absent_when_owner_missing() {
        let store = MemoryStore::new();

        store
            .create_article(&article("Orphan", 99, ArticleStatus::Published))
            .await
            .unwrap();

        let listed = store.list_articles(10, 0, None).await.unwrap();
        assert!(listed[0].user.is_none());
    }

    #[tokio::test]
    async fn test_increment_views() {
        let store = MemoryStore::new();

        let created = store
            .create_article(&article("Counted", 1, ArticleStatus::Published))
            .await
            .unwrap();
        assert_eq!(created.views, 0);

        store.increment_article_views(created.id).await.unwrap();
        store.increment_article_views(created.id).await.unwrap();
        let fetched = store.get_article(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.views, 2);

        // Absent id is a no-op
        store.increment_article_views(1234).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_users_ascending_id() {
        let store = MemoryStore::new();

        store.create_user(&user("banana")).await.unwrap();
        store.create_user(&user("apple")).await.unwrap();
        store.create_user(&user("cherry")).await.unwrap();

        let users = store.list_users().await.unwrap();
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_get_user_by_username_exact_match() {
        let store = MemoryStore::new();
        store.create_user(&user("Admin")).await.unwrap();

        assert!(store.get_user_by_username("admin").await.unwrap().is_none());
        assert!(store.get_user_by_username("Admin").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.create_user(&user("admin")).await.unwrap();

        let err = store.create_user(&user("admin")).await.unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(_)));
    }

    #[tokio::test]
    async fn test_concurrent_same_username_single_winner() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_user(&user("dup")).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
