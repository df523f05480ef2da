//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / dispatch / http produce:
//!     → logging.rs (structured log events, log-safe encoding)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is recorded on every dispatch span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
