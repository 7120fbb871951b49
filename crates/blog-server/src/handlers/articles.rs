//! Article handlers

use crate::extractors::AuthUser;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use blog_core::{Article, ArticlePayload, ArticleStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    article: Article,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ArticleListResponse>, StatusCode> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).max(0);
    let offset = (page - 1) * limit;

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(s) => Some(ArticleStatus::parse(s).ok_or(StatusCode::BAD_REQUEST)?),
    };

    match state.store.list_articles(limit, offset, status).await {
        Ok(articles) => Ok(Json(ArticleListResponse { articles })),
        Err(e) => {
            tracing::error!("Failed to list articles: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArticleResponse>, StatusCode> {
    match state.store.get_article(id).await {
        Ok(Some(article)) => {
            // Count the view off the request path
            let store = state.store.clone();
            tokio::spawn(async move {
                if let Err(e) = store.increment_article_views(id).await {
                    tracing::warn!("Failed to count view for article {}: {}", id, e);
                }
            });

            Ok(Json(ArticleResponse { article }))
        }
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get article: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ArticlePayload>,
) -> Result<Json<ArticleResponse>, StatusCode> {
    if payload.title.is_empty() || payload.content.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut article = Article::new(payload.title, payload.content, auth.user_id);
    article.slug = payload.slug;
    article.category = payload.category;
    article.tags = payload.tags;
    if let Some(status) = payload.status {
        article.status = status;
    }

    match state.store.create_article(&article).await {
        Ok(article) => Ok(Json(ArticleResponse { article })),
        Err(e) => {
            tracing::error!("Failed to create article: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _auth: AuthUser,
    Json(payload): Json<ArticlePayload>,
) -> Result<Json<ArticleResponse>, StatusCode> {
    if payload.title.is_empty() || payload.content.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Fetch first so an unknown id maps to 404 rather than a silent no-op
    let mut article = match state.store.get_article(id).await {
        Ok(Some(article)) => article,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get article: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    article.title = payload.title;
    article.content = payload.content;
    article.slug = payload.slug;
    article.category = payload.category;
    article.tags = payload.tags;
    if let Some(status) = payload.status {
        article.status = status;
    }

    if let Err(e) = state.store.update_article(&article).await {
        tracing::error!("Failed to update article: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    // Re-read so the response carries the refreshed timestamp
    match state.store.get_article(id).await {
        Ok(Some(article)) => Ok(Json(ArticleResponse { article })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get article: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _auth: AuthUser,
) -> Result<StatusCode, StatusCode> {
    match state.store.get_article(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get article: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    match state.store.delete_article(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            tracing::error!("Failed to delete article: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
