//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Container (container.rs):
//!     get_or_init → cached Arc<Registry>
//!     config reload → reset() → build new Registry → replace()
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - The container cache is explicit state with an explicit `reset()`
//! - Ordered shutdown: stop accept, drain, close

pub mod container;
pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
