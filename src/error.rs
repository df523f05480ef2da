//! Error taxonomy for registration and dispatch.
//!
//! # Design Decisions
//! - Every failure is local to the call that raised it; nothing here rolls
//!   back other registry state
//! - No variant is retried internally, retry policy belongs to the caller
//! - `Unsupported` marks container features that are stubbed on purpose

use axum::http::StatusCode;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

/// Errors raised while registering components or dispatching requests.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Blank names, malformed patterns, or misuse of a registration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A handler or filter factory failed to build an instance.
    #[error("could not construct '{name}': {reason}")]
    Construction { name: String, reason: String },

    /// No factory is registered under this type name.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// The type name resolves to a handler, not a filter.
    #[error("{0} does not implement Filter")]
    NotAFilter(String),

    /// The type name resolves to a filter, not a handler.
    #[error("{0} does not implement Handler")]
    NotAHandler(String),

    /// Dispatch could not resolve its target.
    #[error("no handler for {} '{target}'", target_kind(.named))]
    TargetNotFound { target: String, named: bool },

    /// Container capability that is intentionally not provided.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Failure raised from inside a handler or filter body.
    #[error("handler failed: {0}")]
    Handler(String),
}

fn target_kind(named: &bool) -> &'static str {
    if *named {
        "name"
    } else {
        "path"
    }
}

impl DispatchError {
    /// Shorthand for a construction failure.
    pub fn construction(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        DispatchError::Construction {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status the front end answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::TargetNotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Configuration(_) => "configuration",
            DispatchError::Construction { .. } => "construction",
            DispatchError::TypeNotFound(_) => "type_not_found",
            DispatchError::NotAFilter(_) | DispatchError::NotAHandler(_) => "wrong_kind",
            DispatchError::TargetNotFound { .. } => "target_not_found",
            DispatchError::Unsupported(_) => "unsupported",
            DispatchError::Handler(_) => "handler",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_not_found_message() {
        let by_path = DispatchError::TargetNotFound {
            target: "/missing".into(),
            named: false,
        };
        assert_eq!(by_path.to_string(), "no handler for path '/missing'");

        let by_name = DispatchError::TargetNotFound {
            target: "api".into(),
            named: true,
        };
        assert_eq!(by_name.to_string(), "no handler for name 'api'");
    }

    #[test]
    fn test_status_codes() {
        let miss = DispatchError::TargetNotFound {
            target: "/x".into(),
            named: false,
        };
        assert_eq!(miss.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            DispatchError::Unsupported("jsp").status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            DispatchError::Handler("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
