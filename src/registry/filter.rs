//! Filter entries and their mapping bindings.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::dispatch::{DispatcherType, Filter};
use crate::routing::matcher::{pattern_matches_segments, split_segments};

/// One registered filter with its configuration and URL bindings.
pub struct FilterEntry {
    name: String,
    filter: Arc<dyn Filter>,
    init_parameters: HashMap<String, String>,
    url_patterns: Vec<String>,
    handler_names: Vec<String>,
    /// Empty means every dispatch type.
    dispatch_types: BTreeSet<DispatcherType>,
}

impl FilterEntry {
    pub fn new(name: impl Into<String>, filter: Arc<dyn Filter>) -> Self {
        Self {
            name: name.into(),
            filter,
            init_parameters: HashMap::new(),
            url_patterns: Vec::new(),
            handler_names: Vec::new(),
            dispatch_types: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> &Arc<dyn Filter> {
        &self.filter
    }

    /// Bind URL patterns.
    ///
    /// `match_after = false` places the patterns ahead of those already
    /// declared. Patterns already bound are skipped.
    pub fn add_mapping_for_url_patterns<I, S>(
        &mut self,
        dispatch_types: &[DispatcherType],
        match_after: bool,
        patterns: I,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dispatch_types.extend(dispatch_types.iter().copied());
        merge_mappings(&mut self.url_patterns, match_after, patterns);
    }

    /// Bind the filter to handlers by registration name.
    pub fn add_mapping_for_handler_names<I, S>(
        &mut self,
        dispatch_types: &[DispatcherType],
        match_after: bool,
        names: I,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dispatch_types.extend(dispatch_types.iter().copied());
        merge_mappings(&mut self.handler_names, match_after, names);
    }

    pub fn url_pattern_mappings(&self) -> &[String] {
        &self.url_patterns
    }

    pub fn handler_name_mappings(&self) -> &[String] {
        &self.handler_names
    }

    /// Dispatch types this filter runs for; empty means all.
    pub fn dispatch_types(&self) -> &BTreeSet<DispatcherType> {
        &self.dispatch_types
    }

    pub fn accepts(&self, dispatch_type: DispatcherType) -> bool {
        self.dispatch_types.is_empty() || self.dispatch_types.contains(&dispatch_type)
    }

    pub fn init_parameter(&self, name: &str) -> Option<&str> {
        self.init_parameters.get(name).map(String::as_str)
    }

    pub fn init_parameters(&self) -> &HashMap<String, String> {
        &self.init_parameters
    }

    /// Set an init parameter unless it is already present.
    ///
    /// Returns false, leaving the existing value, when `name` is taken.
    pub fn set_init_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.init_parameters.contains_key(&name) {
            return false;
        }
        self.init_parameters.insert(name, value.into());
        true
    }

    /// Set several init parameters; returns the names that were already set.
    pub fn set_init_parameters(&mut self, params: HashMap<String, String>) -> Vec<String> {
        let mut conflicts = Vec::new();
        for (name, value) in params {
            if self.init_parameters.contains_key(&name) {
                conflicts.push(name);
            } else {
                self.init_parameters.insert(name, value);
            }
        }
        conflicts.sort();
        conflicts
    }

    /// True if this filter belongs in the chain for a dispatch.
    pub fn applies_to(&self, path: &str, handler_name: &str, dispatch_type: DispatcherType) -> bool {
        if !self.accepts(dispatch_type) {
            return false;
        }
        if self.handler_names.iter().any(|n| n == handler_name) {
            return true;
        }
        let parts = split_segments(path);
        self.url_patterns
            .iter()
            .any(|p| pattern_matches_segments(p, path, &parts))
    }

    /// Serializable snapshot of the bindings.
    pub fn binding(&self) -> FilterBinding {
        FilterBinding {
            name: self.name.clone(),
            url_patterns: self.url_patterns.clone(),
            handler_names: self.handler_names.clone(),
            dispatch_types: self.dispatch_types.iter().copied().collect(),
            init_parameters: self.init_parameters.clone(),
        }
    }
}

impl fmt::Debug for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEntry")
            .field("name", &self.name)
            .field("url_patterns", &self.url_patterns)
            .field("handler_names", &self.handler_names)
            .field("dispatch_types", &self.dispatch_types)
            .finish()
    }
}

fn merge_mappings<I, S>(existing: &mut Vec<String>, match_after: bool, incoming: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut fresh = Vec::new();
    for value in incoming {
        let value = value.into();
        if !existing.contains(&value) && !fresh.contains(&value) {
            fresh.push(value);
        }
    }
    if match_after {
        existing.extend(fresh);
    } else {
        fresh.append(existing);
        *existing = fresh;
    }
}

/// Binding information reported by `Registry::list_filters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterBinding {
    pub name: String,
    pub url_patterns: Vec<String>,
    pub handler_names: Vec<String>,
    pub dispatch_types: Vec<DispatcherType>,
    pub init_parameters: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::filter_fn;

    fn entry() -> FilterEntry {
        FilterEntry::new(
            "log",
            Arc::new(filter_fn(|req, res, chain| chain.do_filter(req, res))),
        )
    }

    #[test]
    fn test_url_pattern_order() {
        let mut e = entry();
        e.add_mapping_for_url_patterns(&[], true, ["/a", "/b"]);
        e.add_mapping_for_url_patterns(&[], false, ["/first", "/a"]);
        e.add_mapping_for_url_patterns(&[], true, ["/last"]);
        assert_eq!(e.url_pattern_mappings(), ["/first", "/a", "/b", "/last"]);
    }

    #[test]
    fn test_dispatch_types_default_to_all() {
        let mut e = entry();
        e.add_mapping_for_url_patterns(&[], true, ["/*"]);
        assert!(e.accepts(DispatcherType::Request));
        assert!(e.accepts(DispatcherType::Include));

        e.add_mapping_for_url_patterns(&[DispatcherType::Forward], true, ["/x"]);
        assert!(e.accepts(DispatcherType::Forward));
        assert!(!e.accepts(DispatcherType::Request));
    }

    #[test]
    fn test_applies_to() {
        let mut e = entry();
        e.add_mapping_for_url_patterns(&[], true, ["/api/*"]);
        e.add_mapping_for_handler_names(&[], true, ["admin"]);

        assert!(e.applies_to("/api/users", "users", DispatcherType::Request));
        assert!(e.applies_to("/other", "admin", DispatcherType::Request));
        assert!(!e.applies_to("/other", "users", DispatcherType::Request));
    }

    #[test]
    fn test_init_parameters_first_write_wins() {
        let mut e = entry();
        assert!(e.set_init_parameter("level", "debug"));
        assert!(!e.set_init_parameter("level", "info"));
        assert_eq!(e.init_parameter("level"), Some("debug"));

        let conflicts = e.set_init_parameters(HashMap::from([
            ("level".to_string(), "warn".to_string()),
            ("format".to_string(), "json".to_string()),
        ]));
        assert_eq!(conflicts, vec!["level".to_string()]);
        assert_eq!(e.init_parameter("format"), Some("json"));
    }
}
