pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use crate::services::auth::AuthService;
use crate::services::token::TokenSigner;
use crate::services::user::UserService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<AuthService<Database>>,
    pub users: Arc<UserService<Database>>,
}

impl AppState {
    pub fn new(db: Database, signer: TokenSigner) -> Self {
        Self {
            auth: Arc::new(AuthService::new(db.clone(), signer)),
            users: Arc::new(UserService::new(db.clone())),
            db: Arc::new(db),
        }
    }
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/user/profile", get(routes::profile::profile))
        .route("/api/user/progress", post(routes::profile::progress))
        .route("/api/user/words", get(routes::words::list))
        .route("/api/user/words/learn", post(routes::words::learn))
        .route("/api/user/inventory", get(routes::inventory::list))
        .route(
            "/api/user/inventory/purchase",
            post(routes::inventory::purchase),
        )
        .route("/api/user/inventory/item", put(routes::inventory::update_item))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/refresh", post(routes::auth::refresh))
        .route("/api/auth/logout", post(routes::auth::logout))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let jwt_secret =
        std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let state = AppState::new(db, TokenSigner::new(jwt_secret.as_bytes()));
    let app = build_router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
