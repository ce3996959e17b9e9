use std::{net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use tracing::info;

mod api;
mod app_state;
mod auth;
mod config;
mod interpreter;
mod peer;
mod registry;
mod sequencer;
mod ws;

use app_state::RelayState;
use auth::JwtVerifier;
use config::load_settings;
use interpreter::GeminiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let verifier = Arc::new(JwtVerifier::new(&settings.auth_secret));
    let gemini = Arc::new(GeminiClient::new(
        settings.gemini_api_key.clone(),
        settings.gemini_model.clone(),
    ));
    let state = Arc::new(RelayState::new(verifier, gemini.clone(), gemini));

    let app = build_router(state);
    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "relay server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/robots", get(api::list_robots))
        .route("/api/robots/:robot_id", get(api::robot_detail))
        .route("/api/ws/robot/:robot_id", get(ws::robot_ws))
        .route("/api/ws/operator/:robot_id", get(ws::operator_ws))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
