//! Handler registrations.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::dispatch::Handler;

/// One registered handler and the path patterns mapped to it.
///
/// A registration with no patterns is never chosen by the path router;
/// it can still be reached through a named dispatcher.
pub struct HandlerRegistration {
    name: String,
    handler: Arc<dyn Handler>,
    mappings: Vec<String>,
    init_parameters: HashMap<String, String>,
    load_on_startup: Option<i32>,
}

impl HandlerRegistration {
    pub fn new(name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        Self {
            name: name.into(),
            handler,
            mappings: Vec::new(),
            init_parameters: HashMap::new(),
            load_on_startup: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Append patterns in order.
    ///
    /// Returns the patterns that were already mapped here; those are not
    /// added a second time.
    pub fn add_mapping<I, S>(&mut self, patterns: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut duplicates = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            if self.mappings.contains(&pattern) {
                duplicates.push(pattern);
            } else {
                self.mappings.push(pattern);
            }
        }
        duplicates
    }

    /// Patterns in the order they were added.
    pub fn mappings(&self) -> &[String] {
        &self.mappings
    }

    pub fn init_parameter(&self, name: &str) -> Option<&str> {
        self.init_parameters.get(name).map(String::as_str)
    }

    pub fn init_parameters(&self) -> &HashMap<String, String> {
        &self.init_parameters
    }

    /// Set an init parameter unless it is already present.
    pub fn set_init_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.init_parameters.contains_key(&name) {
            return false;
        }
        self.init_parameters.insert(name, value.into());
        true
    }

    pub fn load_on_startup(&self) -> Option<i32> {
        self.load_on_startup
    }

    pub fn set_load_on_startup(&mut self, order: i32) {
        self.load_on_startup = Some(order);
    }

    pub fn binding(&self) -> HandlerBinding {
        HandlerBinding {
            name: self.name.clone(),
            mappings: self.mappings.clone(),
            init_parameters: self.init_parameters.clone(),
            load_on_startup: self.load_on_startup,
        }
    }
}

impl fmt::Debug for HandlerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistration")
            .field("name", &self.name)
            .field("mappings", &self.mappings)
            .field("load_on_startup", &self.load_on_startup)
            .finish()
    }
}

/// Binding information reported by `Registry::list_handlers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerBinding {
    pub name: String,
    pub mappings: Vec<String>,
    pub init_parameters: HashMap<String, String>,
    pub load_on_startup: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::handler_fn;

    #[test]
    fn test_mappings_keep_addition_order() {
        let mut reg = HandlerRegistration::new("api", Arc::new(handler_fn(|_, _| Ok(()))));
        assert!(reg.mappings().is_empty());

        let dupes = reg.add_mapping(["/b", "/a"]);
        assert!(dupes.is_empty());
        let dupes = reg.add_mapping(["/c", "/a"]);
        assert_eq!(dupes, vec!["/a".to_string()]);

        assert_eq!(reg.mappings(), ["/b", "/a", "/c"]);
        assert_eq!(reg.binding().mappings, vec!["/b", "/a", "/c"]);
    }
}
