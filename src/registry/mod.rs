//! Component registry subsystem.
//!
//! # Data Flow
//! ```text
//! Registration phase (serial, &mut Registry):
//!     register_handler / register_filter (instance, factory, or type name)
//!     → factory.rs resolves type names to constructors
//!     → handler.rs / filter.rs hold names, mappings, init parameters
//!
//! Request phase (shared, &Registry):
//!     context.rs → routing (resolve path) → dispatch (run chain)
//! ```
//!
//! # Design Decisions
//! - Names are unique per kind; lookups are O(1) through a name index
//! - Enumeration follows registration order for both kinds
//! - Construction goes through explicit factories, never runtime discovery

pub mod context;
pub mod factory;
pub mod filter;
pub mod handler;

pub use context::{AttributeValue, Registry, API_MAJOR_VERSION, API_MINOR_VERSION};
pub use factory::{ComponentFactories, ComponentType, FilterFactory, HandlerFactory};
pub use filter::{FilterBinding, FilterEntry};
pub use handler::{HandlerBinding, HandlerRegistration};
