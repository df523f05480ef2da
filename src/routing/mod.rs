//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → router.rs (walk registrations in registry order)
//!     → matcher.rs (compare pattern segments against path segments)
//!     → Return: matched HandlerRegistration or None
//!
//! Chain assembly:
//!     FilterEntry[] (registry order)
//!     → keep entries whose patterns or handler names apply
//!     → FilterChain
//! ```
//!
//! # Design Decisions
//! - Pure functions over registry state; no caching, no locks
//! - Deterministic: same registry and path always pick the same handler
//! - First match wins (registration order, not pattern specificity)

pub mod matcher;
pub mod router;

pub use matcher::{pattern_matches, split_segments, validate_pattern, PatternKind};
pub use router::{matching_filters, resolve};
