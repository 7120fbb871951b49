//! Home page handler

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use blog_core::{Article, ArticleStatus};
use serde::Serialize;

/// How many of the latest published articles the home page shows
const HOME_ARTICLE_COUNT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    title: String,
    articles: Vec<Article>,
}

pub async fn home(State(state): State<AppState>) -> Result<Json<HomeResponse>, StatusCode> {
    match state
        .store
        .list_articles(HOME_ARTICLE_COUNT, 0, Some(ArticleStatus::Published))
        .await
    {
        Ok(articles) => Ok(Json(HomeResponse {
            title: "My Blog".to_string(),
            articles,
        })),
        Err(e) => {
            tracing::error!("Failed to load home articles: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
