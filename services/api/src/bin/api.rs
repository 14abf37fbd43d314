//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FileKeyValueStore, OpenAiEssayAdapter},
    config::Config,
    error::ApiError,
    web::{
        clear_history_handler, delete_history_entry_handler, download_history_entry_handler,
        export_essay_handler, list_history_handler, list_samples_handler, rest::ApiDoc,
        state::AppState, ws_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use essay_writer_core::{EssayGenerator, HistoryStore};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Local Storage & Load History ---
    info!("Opening essay history in {}", config.data_dir.display());
    let kv_store = Arc::new(FileKeyValueStore::open(&config.data_dir)?);
    let history = HistoryStore::open(kv_store);
    info!("Loaded {} history entries.", history.len());

    // --- 3. Initialize the Generation Adapter ---
    let mut openai_config = OpenAIConfig::new().with_api_key(&config.openai_api_key);
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url);
    }
    let openai_client = Client::with_config(openai_config);
    let essay_adapter = Arc::new(OpenAiEssayAdapter::new(
        openai_client,
        config.essay_model.clone(),
    ));
    let generator = EssayGenerator::new(essay_adapter);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), generator, history));

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/ws", get(ws_handler))
        .route(
            "/history",
            get(list_history_handler).delete(clear_history_handler),
        )
        .route("/history/{id}", delete(delete_history_entry_handler))
        .route("/history/{id}/download", get(download_history_entry_handler))
        .route("/export", post(export_essay_handler))
        .route("/samples", get(list_samples_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
