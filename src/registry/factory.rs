//! Named component factories.
//!
//! # Responsibilities
//! - Map type names to handler and filter constructors
//! - Resolve a type name for the by-type registration overloads
//!
//! # Design Decisions
//! - Factories are supplied explicitly at startup; nothing is discovered at runtime
//! - One namespace for both kinds so a name cannot mean two things

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::{Filter, Handler};
use crate::error::{DispatchError, Result};

/// Constructor for a handler.
pub type HandlerFactory = Arc<dyn Fn() -> Result<Arc<dyn Handler>> + Send + Sync>;

/// Constructor for a filter.
pub type FilterFactory = Arc<dyn Fn() -> Result<Arc<dyn Filter>> + Send + Sync>;

/// A resolved type name.
#[derive(Clone)]
pub enum ComponentType {
    Handler(HandlerFactory),
    Filter(FilterFactory),
}

impl ComponentType {
    pub fn kind(&self) -> &'static str {
        match self {
            ComponentType::Handler(_) => "handler",
            ComponentType::Filter(_) => "filter",
        }
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType::{}", self.kind())
    }
}

/// Registry of constructors keyed by type name.
#[derive(Clone, Default)]
pub struct ComponentFactories {
    types: HashMap<String, ComponentType>,
}

impl ComponentFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factories pre-loaded with the stock components in [`crate::builtin`].
    pub fn with_builtins() -> Self {
        let mut factories = Self::new();
        crate::builtin::register_builtins(&mut factories);
        factories
    }

    /// Register a handler constructor. A later call replaces an earlier one.
    pub fn register_handler_type<F>(&mut self, type_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Arc<dyn Handler>> + Send + Sync + 'static,
    {
        self.types
            .insert(type_name.into(), ComponentType::Handler(Arc::new(factory)));
        self
    }

    /// Register a filter constructor. A later call replaces an earlier one.
    pub fn register_filter_type<F>(&mut self, type_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Arc<dyn Filter>> + Send + Sync + 'static,
    {
        self.types
            .insert(type_name.into(), ComponentType::Filter(Arc::new(factory)));
        self
    }

    /// Resolve a type name.
    pub fn load_type(&self, type_name: &str) -> Result<ComponentType> {
        self.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| DispatchError::TypeNotFound(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve the handler constructor for `type_name`.
    pub fn handler_factory(&self, type_name: &str) -> Result<HandlerFactory> {
        match self.load_type(type_name)? {
            ComponentType::Handler(factory) => Ok(factory),
            ComponentType::Filter(_) => Err(DispatchError::NotAHandler(type_name.to_string())),
        }
    }

    /// Resolve the filter constructor for `type_name`.
    pub fn filter_factory(&self, type_name: &str) -> Result<FilterFactory> {
        match self.load_type(type_name)? {
            ComponentType::Filter(factory) => Ok(factory),
            ComponentType::Handler(_) => Err(DispatchError::NotAFilter(type_name.to_string())),
        }
    }

    /// Build a handler instance.
    pub fn create_handler(&self, type_name: &str) -> Result<Arc<dyn Handler>> {
        let factory = self.handler_factory(type_name)?;
        factory().map_err(|e| into_construction(type_name, e))
    }

    /// Build a filter instance.
    pub fn create_filter(&self, type_name: &str) -> Result<Arc<dyn Filter>> {
        let factory = self.filter_factory(type_name)?;
        factory().map_err(|e| into_construction(type_name, e))
    }
}

impl fmt::Debug for ComponentFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactories")
            .field("types", &self.type_names())
            .finish()
    }
}

fn into_construction(type_name: &str, err: DispatchError) -> DispatchError {
    match err {
        e @ DispatchError::Construction { .. } => e,
        other => DispatchError::construction(type_name, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{filter_fn, handler_fn};

    fn factories() -> ComponentFactories {
        let mut f = ComponentFactories::new();
        f.register_handler_type("hello", || Ok(Arc::new(handler_fn(|_, _| Ok(()))) as Arc<dyn Handler>))
            .register_filter_type("pass", || {
                Ok(Arc::new(filter_fn(|req, res, chain| chain.do_filter(req, res))) as Arc<dyn Filter>)
            })
            .register_handler_type("broken", || Err(DispatchError::Handler("no database".into())));
        f
    }

    #[test]
    fn test_load_type() {
        let f = factories();
        assert_eq!(f.load_type("hello").unwrap().kind(), "handler");
        assert_eq!(f.load_type("pass").unwrap().kind(), "filter");
        assert!(matches!(f.load_type("nope"), Err(DispatchError::TypeNotFound(n)) if n == "nope"));
        assert_eq!(f.type_names(), vec!["broken", "hello", "pass"]);
    }

    #[test]
    fn test_wrong_kind() {
        let f = factories();
        assert!(matches!(f.create_filter("hello"), Err(DispatchError::NotAFilter(_))));
        assert!(matches!(f.create_handler("pass"), Err(DispatchError::NotAHandler(_))));
    }

    #[test]
    fn test_construction_failure_is_wrapped() {
        let f = factories();
        match f.create_handler("broken") {
            Err(DispatchError::Construction { name, reason }) => {
                assert_eq!(name, "broken");
                assert!(reason.contains("no database"));
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }
}
