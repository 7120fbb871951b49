//! Article types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::user::User;

/// Publication status of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    /// Parse the query-string form of a status
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ArticleStatus::Draft),
            "published" => Some(ArticleStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArticleStatus::Draft => write!(f, "draft"),
            ArticleStatus::Published => write!(f, "published"),
        }
    }
}

/// A blog article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Assigned by the store on insert, never reused
    pub id: i64,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub category: String,
    /// Comma-joined tag list
    pub tags: String,
    pub status: ArticleStatus,
    pub views: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner snapshot attached on reads, never persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Article {
    pub fn new(title: String, content: String, user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            content,
            slug: String::new(),
            category: String::new(),
            tags: String::new(),
            status: ArticleStatus::Draft,
            views: 0,
            user_id,
            created_at: now,
            updated_at: now,
            user: None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self.status, ArticleStatus::Published)
    }
}

/// Article create/update request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlePayload {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: String,
    pub status: Option<ArticleStatus>,
}
