//! In-process servlet-style request dispatch.
//!
//! A [`Registry`] maps URL path patterns to handlers and ordered filter
//! chains, resolves incoming paths, and drives forward / include / named
//! dispatch without a container process behind it.

pub mod admin;
pub mod builtin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod routing;

pub use config::schema::DispatchConfig;
pub use dispatch::{DispatcherType, Filter, FilterChain, Handler, RequestDispatcher};
pub use error::{DispatchError, Result};
pub use http::{HttpServer, ServletRequest, ServletResponse};
pub use lifecycle::Shutdown;
pub use registry::{ComponentFactories, Registry};
