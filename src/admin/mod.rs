//! Admin API.
//!
//! Read-only JSON views of the live registry behind bearer-token auth:
//!
//! | route             | body                                   |
//! |-------------------|----------------------------------------|
//! | `/admin/status`   | version, server info, component counts |
//! | `/admin/filters`  | filter bindings in chain order         |
//! | `/admin/handlers` | handler bindings keyed by name         |

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/filters", get(get_filters))
        .route("/admin/handlers", get(get_handlers))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
