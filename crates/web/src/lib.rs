//! tripQuest - public flight search and booking site.
//!
//! This crate serves the server-rendered booking site on port 1234.
//!
//! # Architecture
//!
//! - Axum web framework with Askama templates
//! - Amadeus Self-Service APIs for flight offers and airline lookups
//! - `PostgreSQL` for registered users and saved bookings
//! - Stateless HS256-signed session tokens in an http-only cookie;
//!   there is no server-side session store
//!
//! The router and application state live in the library so integration
//! tests can drive the whole site through `tower::ServiceExt` without
//! binding a socket. `main.rs` adds the process-level pieces: Sentry,
//! the tracing subscriber, the database pool, and the listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod amadeus;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;
pub mod services;
pub mod session;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the application router on top of `state`.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/web/static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK. State assembled
/// without a pool reports ready; there is nothing to probe.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
