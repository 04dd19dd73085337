pub mod config;
pub mod data;
pub mod db;
pub mod features;
pub mod handlers;
pub mod schema;
pub mod utils;

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use axum::{Json, Router};
use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::features::generation::{FlashcardGenerator, GeminiGenerator};
use crate::features::storage::{LocalStorage, StorageAdapter, StorageRegistry};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub storage: StorageRegistry,
    pub generator: Arc<dyn FlashcardGenerator>,
}

impl AppState {
    pub fn from_config(pool: DbPool, config: Config) -> Self {
        let client = reqwest::Client::new();

        let app_storage = config.app_storage_dir.as_ref().map(|dir| {
            log::info!("App-managed storage at {}", dir.display());
            Arc::new(LocalStorage::new(dir)) as Arc<dyn StorageAdapter>
        });
        let storage = StorageRegistry::new(client.clone(), app_storage, config.google_oauth.clone());
        let generator = Arc::new(GeminiGenerator::new(
            client,
            config.gemini_api_key.clone(),
            &config.gemini_model,
        ));

        Self {
            pool,
            config: Arc::new(config),
            storage,
            generator,
        }
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Flashcard API", "version": env!("CARGO_PKG_VERSION") }))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(config.frontend_url.as_str())
        .chain(config.cors_allowed_origin.as_deref())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/auth", handlers::auth::router())
        .nest("/cards", handlers::cards::router())
        .nest("/decks", handlers::decks::router())
        .nest("/search", handlers::search::router())
        .nest("/books", handlers::books::router())
        .nest("/generate", handlers::generation::router())
        .nest("/storage", handlers::storage::router())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
