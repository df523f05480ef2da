//! Stock handlers and filters.
//!
//! Registered under fixed type names so a deployment descriptor can use
//! them without any Rust code:
//!
//! | type          | kind    | init parameters                  |
//! |---------------|---------|----------------------------------|
//! | `echo`        | handler |                                  |
//! | `static_text` | handler | `body`, `content_type`           |
//! | `not_found`   | handler |                                  |
//! | `access_log`  | filter  |                                  |
//! | `set_headers` | filter  | every parameter becomes a header |
//! | `deny`        | filter  | `status` (default 403)           |

pub mod filters;
pub mod handlers;

use std::sync::Arc;

use crate::dispatch::{Filter, Handler};
use crate::registry::ComponentFactories;

pub use filters::{AccessLogFilter, DenyFilter, SetHeadersFilter};
pub use handlers::{EchoHandler, NotFoundHandler, StaticTextHandler};

/// Add every stock component to `factories`.
pub fn register_builtins(factories: &mut ComponentFactories) {
    factories
        .register_handler_type("echo", || Ok(Arc::new(EchoHandler) as Arc<dyn Handler>))
        .register_handler_type("static_text", || {
            Ok(Arc::new(StaticTextHandler::default()) as Arc<dyn Handler>)
        })
        .register_handler_type("not_found", || Ok(Arc::new(NotFoundHandler) as Arc<dyn Handler>))
        .register_filter_type("access_log", || Ok(Arc::new(AccessLogFilter) as Arc<dyn Filter>))
        .register_filter_type("set_headers", || {
            Ok(Arc::new(SetHeadersFilter::default()) as Arc<dyn Filter>)
        })
        .register_filter_type("deny", || Ok(Arc::new(DenyFilter::default()) as Arc<dyn Filter>));
}
