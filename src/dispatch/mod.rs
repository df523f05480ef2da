//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDispatcher (path or name)
//!     → Registry lookup / routing::router::resolve
//!     → routing::router::matching_filters (registry order)
//!     → FilterChain: filter₁ → filter₂ → … → handler
//!     → shared ServletRequest / ServletResponse pair
//! ```
//!
//! # Design Decisions
//! - Chains are synchronous; nothing here blocks or performs I/O
//! - Handlers and filters are trait objects supplied by the caller
//! - The request/response pair is built by an [`ExchangeBuilder`] when the
//!   caller does not already have one

pub mod chain;
pub mod component;
pub mod dispatcher;
pub mod exchange;

pub use chain::FilterChain;
pub use component::{filter_fn, handler_fn, ComponentConfig, Filter, FilterFn, Handler, HandlerFn};
pub use dispatcher::{DispatchInfo, DispatcherType, RequestDispatcher};
pub use exchange::{DefaultExchangeBuilder, DispatchTarget, ExchangeBuilder};
