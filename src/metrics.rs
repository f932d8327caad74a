//! Prometheus text rendering and the HTTP endpoints that serve it.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::fmt::Write;
use std::sync::Arc;

use crate::store::{BalanceStore, Snapshot};

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Shared state for request handlers. Handlers only ever read the store.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: BalanceStore,
}

impl AppState {
    pub fn new(store: BalanceStore) -> Self {
        Self { store }
    }
}

/// Renders one `crypto_balance` line per balance, in address then balance order,
/// followed by `crypto_load_seconds`. Balances never read successfully are left out.
pub fn render(snapshot: &Snapshot) -> String {
    let mut body = String::new();
    for tracked in &snapshot.addresses {
        for balance in tracked.balances.iter().filter(|b| b.fetched) {
            let _ = writeln!(
                body,
                "crypto_balance{{name=\"{}\",address=\"{}\",symbol=\"{}\"}} {}",
                escape_label(&tracked.name),
                tracked.address,
                escape_label(balance.symbol()),
                balance.amount
            );
        }
    }
    let _ = writeln!(
        body,
        "crypto_load_seconds {:.2}",
        snapshot.state.last_refresh.as_secs_f64()
    );
    body
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], render(&snapshot))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.store.snapshot().await;
    let refresh = &snapshot.state;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "addresses": snapshot.addresses.len(),
        "passes": refresh.passes,
        "last_strategy": refresh.last_strategy.map(|s| s.to_string()),
        "last_refresh_seconds": refresh.last_refresh.as_secs_f64(),
        "refreshed_at": refresh.refreshed_at.map(|t| t.to_rfc3339()),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(state)
}
