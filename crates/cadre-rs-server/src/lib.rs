//! Cadre server: HTTP API and WebSocket event stream over the delegator.
//!
//! This is a library crate; the binary starts it via [`start_server`].

use anyhow::Context;
use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use cadre_rs_config::CadreConfig;
use cadre_rs_core::{Delegator, InteractionLog, build_default_record_store};
use cadre_rs_llm::HttpCompletionClient;
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod event_bus;
pub mod routes;
pub mod ws;

pub use event_bus::EventBus;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Delegation pipeline handling inbound messages.
    pub delegator: Delegator,
    /// Broadcast bus feeding WebSocket subscribers.
    pub event_bus: EventBus,
}

/// Build the delegator and event bus from configuration.
pub fn build_state(config: &CadreConfig) -> anyhow::Result<AppState> {
    let completion = build_completion_client(config)?;
    let event_bus = EventBus::new(config.broadcast.buffer);

    let record_store = if config.interactions.enabled {
        Some(build_default_record_store(&config.interactions).context("record store")?)
    } else {
        warn!("interaction persistence disabled; records are in-memory only");
        None
    };

    let delegator = Delegator::new(completion, InteractionLog::new(record_store))
        .with_event_sink(Arc::new(event_bus.clone()));
    Ok(AppState {
        delegator,
        event_bus,
    })
}

/// Build the completion client from config and environment credentials.
fn build_completion_client(config: &CadreConfig) -> anyhow::Result<Arc<HttpCompletionClient>> {
    let completion = &config.completion;
    let mut client = HttpCompletionClient::new(
        completion.base_url.clone(),
        completion.model.clone(),
        Duration::from_secs(completion.timeout_secs),
    )
    .context("completion client")?
    .with_max_tokens(completion.max_tokens);

    match std::env::var(&completion.api_key_env) {
        Ok(api_key) if !api_key.is_empty() => {
            client = client.with_api_key(api_key);
        }
        _ => warn!(
            "no API key found in env (var={}); completion calls will likely fail",
            completion.api_key_env
        ),
    }
    Ok(Arc::new(client))
}

/// Build the Axum router over prepared application state.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/messages", post(routes::submit_message))
        .route("/api/interactions", get(routes::list_interactions))
        .route("/api/interactions/latest", get(routes::latest_interaction))
        .route(
            "/api/interactions/{id}",
            get(routes::get_interaction).delete(routes::delete_interaction),
        )
        .route("/api/events", get(ws::events_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server and block until shutdown.
pub async fn start_server(config: CadreConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("listen address")?;
    let state = build_state(&config)?;
    let app = build_router(state);

    info!("cadre server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind listener")?;
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
