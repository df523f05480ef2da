//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (filters bound to existing handlers)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject patterns the router cannot interpret
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DispatchConfig;
use crate::registry::{ComponentFactories, ComponentType};
use crate::routing::validate_pattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} #{index} has a blank name")]
    BlankName { kind: &'static str, index: usize },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{owner}: {reason}")]
    InvalidPattern { owner: String, reason: String },

    #[error("filter '{filter}' is bound to unknown handler '{handler}'")]
    UnknownHandler { filter: String, handler: String },

    #[error("{owner}: unknown {kind} type '{type_name}'")]
    UnknownType { owner: String, kind: &'static str, type_name: String },

    #[error("{field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Validate everything that does not depend on the available factories.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // 1. Names
    let handler_names = check_names("handler", config.handlers.iter().map(|h| h.name.as_str()), &mut errors);
    check_names("filter", config.filters.iter().map(|f| f.name.as_str()), &mut errors);

    // 2. Patterns
    for handler in &config.handlers {
        for pattern in &handler.mappings {
            if let Err(reason) = validate_pattern(pattern) {
                errors.push(ValidationError::InvalidPattern {
                    owner: format!("handler '{}'", handler.name),
                    reason,
                });
            }
        }
    }
    for filter in &config.filters {
        for pattern in &filter.url_patterns {
            if let Err(reason) = validate_pattern(pattern) {
                errors.push(ValidationError::InvalidPattern {
                    owner: format!("filter '{}'", filter.name),
                    reason,
                });
            }
        }
        // 3. References
        for handler in &filter.handler_names {
            if !handler_names.contains(handler.as_str()) {
                errors.push(ValidationError::UnknownHandler {
                    filter: filter.name.clone(),
                    handler: handler.clone(),
                });
            }
        }
    }

    // 4. Values
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidValue {
            field: "listener.bind_address",
            reason: format!("'{}' is not a socket address", config.listener.bind_address),
        });
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::InvalidValue {
            field: "limits.request_timeout_secs",
            reason: "must be greater than zero".into(),
        });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::InvalidValue {
            field: "limits.max_body_bytes",
            reason: "must be greater than zero".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check every `type` against the factories that will build it.
pub fn validate_component_types(
    config: &DispatchConfig,
    factories: &ComponentFactories,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for handler in &config.handlers {
        if !matches!(factories.load_type(&handler.type_name), Ok(ComponentType::Handler(_))) {
            errors.push(ValidationError::UnknownType {
                owner: format!("handler '{}'", handler.name),
                kind: "handler",
                type_name: handler.type_name.clone(),
            });
        }
    }
    for filter in &config.filters {
        if !matches!(factories.load_type(&filter.type_name), Ok(ComponentType::Filter(_))) {
            errors.push(ValidationError::UnknownType {
                owner: format!("filter '{}'", filter.name),
                kind: "filter",
                type_name: filter.type_name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for (index, name) in names.enumerate() {
        if name.trim().is_empty() {
            errors.push(ValidationError::BlankName { kind, index });
        } else if !seen.insert(name) {
            errors.push(ValidationError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    seen
}
