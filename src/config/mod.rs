//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML deployment descriptor)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DispatchConfig (validated, immutable)
//!     → Registry::from_config builds handlers and filters
//!
//! On file change:
//!     watcher.rs sees a write or rename in the descriptor's directory
//!     → loader.rs loads new config
//!     → validation.rs validates, including component types
//!     → new Registry built and swapped into the container cache
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, ContextConfig, DispatchConfig, FilterConfig, HandlerConfig, LimitsConfig,
    ListenerConfig, ObservabilityConfig,
};
pub use validation::{validate_component_types, validate_config, ValidationError};
