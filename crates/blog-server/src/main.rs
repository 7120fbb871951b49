//! Blog Backend Server
//!
//! A small blog backend exposing CRUD endpoints for articles and users plus
//! login/register. Backed by SQLite when a database is configured, and by an
//! in-memory relational store emulator otherwise.

mod config;
mod extractors;
mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use blog_core::{Article, ArticleStatus, BlogStore, User};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

// `crate::` disambiguates from the config crate
use crate::config::Settings;
use services::AuthService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub auth_service: Arc<AuthService>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting blog server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let settings = Settings::load().context("Failed to load configuration")?;
    info!("Config loaded: bind={}", settings.server.bind_address);

    // Select the storage backend
    let store = storage::connect_store(settings.database.path.as_deref()).await;

    // Seed demo data on first start
    seed_demo_data(store.as_ref())
        .await
        .context("Failed to seed demo data")?;

    // Initialize services
    let auth_service = Arc::new(AuthService::new(
        store.clone(),
        settings.auth.jwt_secret.clone(),
    ));

    // Create app state
    let state = AppState {
        store,
        auth_service,
    };

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Home page
        .route("/", get(handlers::home))
        // REST API routes
        .nest("/api", api_routes())
        // Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings
        .server
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/article",
            get(handlers::articles::list).post(handlers::articles::create),
        )
        .route(
            "/article/:id",
            get(handlers::articles::get)
                .put(handlers::articles::update)
                .delete(handlers::articles::delete),
        )
        .route("/user", get(handlers::users::list))
        .route("/user/login", post(handlers::auth::login))
        .route("/user/register", post(handlers::auth::register))
}

/// Create a demo account and a welcome article when the store is empty.
async fn seed_demo_data(store: &dyn BlogStore) -> Result<()> {
    if !store.list_users().await?.is_empty() {
        return Ok(());
    }

    let password_hash = AuthService::hash_password("123456")?;
    let mut admin = User::new(
        "admin".to_string(),
        password_hash,
        "Administrator".to_string(),
    );
    admin.email = "admin@example.com".to_string();
    let admin = store.create_user(&admin).await?;

    let mut welcome = Article::new(
        "Welcome to my blog".to_string(),
        "A personal blog for notes and articles. Thanks for stopping by!".to_string(),
        admin.id,
    );
    welcome.slug = "welcome-to-my-blog".to_string();
    welcome.category = "blog".to_string();
    welcome.tags = "blog,rust,axum".to_string();
    welcome.status = ArticleStatus::Published;
    store.create_article(&welcome).await?;

    info!("Demo data created (user: admin)");
    Ok(())
}
