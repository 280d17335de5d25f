//! Gerund Master · English gerund trainer backend
//!
//! - Axum HTTP + WebSocket API
//! - Quiz generation and tutor chat via the Gemini API
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   GEMINI_API_KEY       : API key (also read at build time; see credentials.rs)
//!   GOOGLE_API_KEY       : build-time alternative key name
//!   API_KEY              : runtime alternative key name
//!   GEMINI_BASE_URL      : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL         : default "gemini-2.5-flash"
//!   GEMINI_TIMEOUT_SECS  : request timeout, default 30
//!   AGENT_CONFIG_PATH    : path to TOML config (prompts + canned replies)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod config;
mod credentials;
mod domain;
mod error;
mod gemini;
mod logic;
mod model;
mod protocol;
mod quiz;
mod routes;
mod seeds;
mod session;
mod state;
mod telemetry;
mod tutor;
mod util;

#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared, read-only state: prompts, key resolver, model backend.
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "gerund_master", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "gerund_master", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "gerund_master", "Shutdown signal received");
}
