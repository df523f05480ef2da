use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::registry::{FilterBinding, HandlerBinding};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub server_info: String,
    pub api_version: String,
    pub handlers: usize,
    pub filters: usize,
    pub initialized: bool,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let registry = state.registry();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        server_info: registry.server_info(),
        api_version: format!("{}.{}", registry.major_version(), registry.minor_version()),
        handlers: registry.handler_count(),
        filters: registry.filter_count(),
        initialized: registry.is_initialized(),
    })
}

/// Filter bindings in chain order.
pub async fn get_filters(State(state): State<AppState>) -> Json<Vec<FilterBinding>> {
    let registry = state.registry();
    Json(registry.list_filters().into_iter().map(|(_, binding)| binding).collect())
}

pub async fn get_handlers(State(state): State<AppState>) -> Json<BTreeMap<String, HandlerBinding>> {
    let registry = state.registry();
    Json(registry.list_handlers().into_iter().collect())
}
