mod agents;
mod cache;
mod config;
mod data;
mod db;
mod errors;
mod llm_client;
mod models;
mod orchestrator;
mod registry;
mod routes;
mod scoring;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agents::LogNotifier;
use crate::cache::{Cache, RedisCache};
use crate::config::Config;
use crate::data::PgDataSource;
use crate::db::create_pool;
use crate::llm_client::{DisabledModel, LanguageModel, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Conductor v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (lazy: the first query opens a connection)
    let pool = create_pool(&config.database_url)?;
    let source = Arc::new(PgDataSource::new(pool));

    // Cache backend
    let cache = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis cache initialized");
            Cache::new(Arc::new(RedisCache::new(client)))
        }
        None => {
            warn!("REDIS_URL not set, using in-process memory cache");
            Cache::in_memory()
        }
    };

    // Language model
    let llm: Arc<dyn LanguageModel> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), config.llm_api_url.clone(), config.llm_timeout)?;
            info!(
                "LLM client initialized (model: {}, timeout: {:?})",
                llm_client::MODEL,
                config.llm_timeout
            );
            Arc::new(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, all agents run rule-based fallbacks");
            Arc::new(DisabledModel)
        }
    };

    let state = AppState::build(&config, source, cache, llm, Arc::new(LogNotifier)).await?;

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
