//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router whose fallback feeds every request into the registry
//! - Wire up middleware (tracing, timeout)
//! - Buffer request bodies up to the configured limit
//! - Swap in a rebuilt registry when the configuration changes
//! - Stop accepting once shutdown is triggered

use std::io;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{AdminConfig, DispatchConfig, LimitsConfig};
use crate::dispatch::DispatcherType;
use crate::error::Result;
use crate::http::request::{ensure_request_id, X_REQUEST_ID};
use crate::http::response::{error_response, into_axum_response, new_response};
use crate::lifecycle::{container, Shutdown};
use crate::observability::logging::encode_for_log;
use crate::registry::{ComponentFactories, Registry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live registry; replaced wholesale on reload.
    pub registry: Arc<ArcSwap<Registry>>,
    pub limits: LimitsConfig,
    pub admin: AdminConfig,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, config: &DispatchConfig) -> Self {
        Self {
            registry: Arc::new(ArcSwap::new(registry)),
            limits: config.limits.clone(),
            admin: config.admin.clone(),
        }
    }

    /// Snapshot of the registry serving requests right now.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.load_full()
    }

    /// Build and initialize a registry for `config`, then make it live.
    ///
    /// On failure the current registry keeps serving. Listener, limits and
    /// admin settings are fixed at startup and not reloaded.
    pub fn reload(&self, config: &DispatchConfig, factories: &ComponentFactories) -> Result<()> {
        // 1. Build outside the cache so a bad config leaves it untouched
        let registry = Registry::from_config(config, factories)?;
        registry.initialize()?;
        let registry = Arc::new(registry);

        // 2. Swap the container cache in one locked step
        container::replace(Arc::clone(&registry));

        // 3. Route new requests to it; in-flight ones finish on the old one
        self.registry.store(registry);
        tracing::info!(
            handlers = config.handlers.len(),
            filters = config.filters.len(),
            "Registry reloaded"
        );
        Ok(())
    }
}

/// HTTP front end for the dispatch engine.
pub struct HttpServer {
    router: Router,
    state: AppState,
    factories: ComponentFactories,
}

impl HttpServer {
    /// Create a new HTTP server serving `registry`.
    pub fn new(config: &DispatchConfig, registry: Arc<Registry>, factories: ComponentFactories) -> Self {
        let state = AppState::new(registry, config);
        let router = Self::build_router(config, state.clone());
        Self {
            router,
            state,
            factories,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DispatchConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The dispatch router, for serving or for driving with `oneshot`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The admin API router over the same state.
    pub fn admin_router(&self) -> Router {
        crate::admin::setup_admin_router(self.state.clone())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations arriving on `config_updates` are applied with
    /// [`AppState::reload`] until shutdown is triggered.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: Option<mpsc::UnboundedReceiver<DispatchConfig>>,
        shutdown: Shutdown,
    ) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(updates) = config_updates {
            tokio::spawn(reload_loop(
                updates,
                self.state.clone(),
                self.factories.clone(),
                shutdown.clone(),
            ));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn reload_loop(
    mut updates: mpsc::UnboundedReceiver<DispatchConfig>,
    state: AppState,
    factories: ComponentFactories,
    shutdown: Shutdown,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                if let Err(e) = state.reload(&config, &factories) {
                    tracing::error!(error = %e, "Failed to apply new configuration. Keeping current registry.");
                }
            }
            _ = shutdown.wait() => break,
        }
    }
    tracing::debug!("Reload loop stopped");
}

/// Fallback handler.
/// Buffers the body, dispatches through the live registry, and converts
/// the servlet response back to axum.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    // 1. Buffer the body
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.limits.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %encode_for_log(parts.uri.path()), error = %e, "Rejected request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };
    let mut req = Request::from_parts(parts, bytes);
    let request_id = ensure_request_id(&mut req);

    // 2. Dispatch against a registry snapshot
    let registry = state.registry();
    let path = req.uri().path().to_string();
    let mut res = new_response();
    let result = registry
        .request_dispatcher(&path)
        .dispatch(DispatcherType::Request, &mut req, &mut res);

    // 3. Convert
    let mut response = match result {
        Ok(()) => into_axum_response(res),
        Err(e) => {
            tracing::debug!(request_id = %request_id, path = %encode_for_log(&path), error = %e, "Dispatch error");
            error_response(&e)
        }
    };
    if let Ok(value) = request_id.as_str().parse() {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
