//! The component registry for one execution context.
//!
//! # Responsibilities
//! - Own filter entries and handler registrations by unique name
//! - Hold free-form attributes and context init parameters
//! - Expose the router and dispatchers over the registered components
//! - Answer container-information queries; refuse unsupported features
//!
//! # Design Decisions
//! - Registration needs `&mut self`: configure once, then share read-only
//! - Attributes and init parameters sit in concurrent maps and stay
//!   writable through `&self` after the registry is shared
//! - Filters and handlers enumerate in registration order
//! - Filter names are first-writer-wins; a duplicate is a silent no-op
//! - Re-registering a handler name keeps the existing instance

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::config::DispatchConfig;
use crate::dispatch::{ComponentConfig, DispatcherType, Filter, Handler, RequestDispatcher};
use crate::error::{DispatchError, Result};
use crate::observability::logging::encode_for_log;
use crate::registry::factory::ComponentFactories;
use crate::registry::filter::{FilterBinding, FilterEntry};
use crate::registry::handler::{HandlerBinding, HandlerRegistration};
use crate::routing::router;

/// Major version of the servlet API being emulated.
pub const API_MAJOR_VERSION: u32 = 6;
/// Minor version of the servlet API being emulated.
pub const API_MINOR_VERSION: u32 = 0;

/// Value stored under an attribute name.
pub type AttributeValue = Arc<dyn Any + Send + Sync>;

/// Registered handlers, filters, attributes and init parameters.
pub struct Registry {
    attributes: DashMap<String, AttributeValue>,
    init_parameters: DashMap<String, String>,
    filters: Vec<FilterEntry>,
    filter_index: HashMap<String, usize>,
    handlers: Vec<HandlerRegistration>,
    handler_index: HashMap<String, usize>,
    initialized: AtomicBool,
    init_lock: Mutex<()>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            attributes: DashMap::new(),
            init_parameters: DashMap::new(),
            filters: Vec::new(),
            filter_index: HashMap::new(),
            handlers: Vec::new(),
            handler_index: HashMap::new(),
            initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
        }
    }

    /// Build a registry from a deployment descriptor.
    ///
    /// Handlers are registered first, then filters, both in file order.
    /// Any unknown type or failed construction aborts the build.
    pub fn from_config(config: &DispatchConfig, factories: &ComponentFactories) -> Result<Self> {
        let mut registry = Self::new();

        for (name, value) in &config.context.init_parameters {
            registry.set_init_parameter(name.clone(), value.clone());
        }

        for handler in &config.handlers {
            let instance = factories.create_handler(&handler.type_name)?;
            let registration = registry.register_handler(&handler.name, instance)?;
            for (key, value) in &handler.init_parameters {
                registration.set_init_parameter(key.clone(), value.clone());
            }
            if let Some(order) = handler.load_on_startup {
                registration.set_load_on_startup(order);
            }
            let conflicts = registry.add_handler_mapping(&handler.name, &handler.mappings)?;
            if !conflicts.is_empty() {
                tracing::warn!(handler = %handler.name, conflicts = ?conflicts, "Mappings already claimed by another handler");
            }
        }

        for filter in &config.filters {
            let instance = factories.create_filter(&filter.type_name)?;
            let Some(entry) = registry.register_filter(&filter.name, instance)? else {
                continue;
            };
            for (key, value) in &filter.init_parameters {
                entry.set_init_parameter(key.clone(), value.clone());
            }
            if !filter.url_patterns.is_empty() {
                entry.add_mapping_for_url_patterns(&filter.dispatch_types, true, filter.url_patterns.iter().cloned());
            }
            if !filter.handler_names.is_empty() {
                entry.add_mapping_for_handler_names(&filter.dispatch_types, true, filter.handler_names.iter().cloned());
            }
        }

        tracing::info!(
            handlers = registry.handler_count(),
            filters = registry.filter_count(),
            "Registry built from configuration"
        );
        Ok(registry)
    }

    // --- Handlers ---

    /// Register a handler instance under `name`.
    ///
    /// If the name is taken the existing instance is kept and its
    /// registration returned; `handler` is dropped.
    pub fn register_handler(&mut self, name: &str, handler: Arc<dyn Handler>) -> Result<&mut HandlerRegistration> {
        require_name(name, "handler")?;

        if let Some(&idx) = self.handler_index.get(name) {
            tracing::debug!(handler = %encode_for_log(name), "Handler already registered, keeping existing instance");
            return Ok(&mut self.handlers[idx]);
        }

        tracing::debug!(handler = %encode_for_log(name), "Adding handler");
        let idx = self.handlers.len();
        self.handlers.push(HandlerRegistration::new(name, handler));
        self.handler_index.insert(name.to_string(), idx);
        metrics_registry_size(self);
        Ok(&mut self.handlers[idx])
    }

    /// Register a handler built from a named factory type.
    pub fn register_handler_type(
        &mut self,
        name: &str,
        type_name: &str,
        factories: &ComponentFactories,
    ) -> Result<&mut HandlerRegistration> {
        require_name(name, "handler")?;
        let factory = factories.handler_factory(type_name)?;
        if let Some(&idx) = self.handler_index.get(name) {
            tracing::debug!(handler = %encode_for_log(name), "Handler already registered, keeping existing instance");
            return Ok(&mut self.handlers[idx]);
        }
        let handler = factory().map_err(|e| DispatchError::construction(type_name, e))?;
        self.register_handler(name, handler)
    }

    /// Register a handler built by `factory`.
    pub fn register_handler_with<F>(&mut self, name: &str, factory: F) -> Result<&mut HandlerRegistration>
    where
        F: FnOnce() -> Result<Arc<dyn Handler>>,
    {
        require_name(name, "handler")?;
        if let Some(&idx) = self.handler_index.get(name) {
            return Ok(&mut self.handlers[idx]);
        }
        let handler = factory().map_err(|e| DispatchError::construction(name, e))?;
        self.register_handler(name, handler)
    }

    /// Map patterns to an existing handler.
    ///
    /// Returns the patterns already mapped to some other handler; when
    /// there are any, nothing is added.
    pub fn add_handler_mapping<I, S>(&mut self, name: &str, patterns: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let idx = *self.handler_index.get(name).ok_or_else(|| DispatchError::TargetNotFound {
            target: name.to_string(),
            named: true,
        })?;
        let patterns: Vec<String> = patterns.into_iter().map(|p| p.as_ref().to_string()).collect();

        let conflicts: Vec<String> = patterns
            .iter()
            .filter(|p| {
                self.handlers
                    .iter()
                    .enumerate()
                    .any(|(i, h)| i != idx && h.mappings().contains(*p))
            })
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Ok(conflicts);
        }

        self.handlers[idx].add_mapping(patterns);
        Ok(Vec::new())
    }

    pub fn handler_registration(&self, name: &str) -> Option<&HandlerRegistration> {
        self.handler_index.get(name).map(|&idx| &self.handlers[idx])
    }

    pub fn handler_registration_mut(&mut self, name: &str) -> Option<&mut HandlerRegistration> {
        let idx = *self.handler_index.get(name)?;
        Some(&mut self.handlers[idx])
    }

    /// Live view of the handler registrations, in registration order.
    pub fn handlers(&self) -> impl Iterator<Item = &HandlerRegistration> + '_ {
        self.handlers.iter()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Name to binding info for every handler.
    pub fn list_handlers(&self) -> HashMap<String, HandlerBinding> {
        self.handlers
            .iter()
            .map(|h| (h.name().to_string(), h.binding()))
            .collect()
    }

    // --- Filters ---

    /// Register a filter instance under `name`.
    ///
    /// Returns `Ok(None)` without touching the registry when `name` is
    /// already taken.
    pub fn register_filter(&mut self, name: &str, filter: Arc<dyn Filter>) -> Result<Option<&mut FilterEntry>> {
        require_name(name, "filter")?;

        if self.filter_index.contains_key(name) {
            tracing::warn!(filter = %encode_for_log(name), "Filter already registered, ignoring");
            return Ok(None);
        }

        tracing::debug!(filter = %encode_for_log(name), "Adding filter");
        let idx = self.filters.len();
        self.filters.push(FilterEntry::new(name, filter));
        self.filter_index.insert(name.to_string(), idx);
        metrics_registry_size(self);
        Ok(Some(&mut self.filters[idx]))
    }

    /// Register a filter built from a named factory type.
    ///
    /// Unknown types and handler types are errors. A factory that fails to
    /// construct is logged and yields `Ok(None)`.
    pub fn register_filter_type(
        &mut self,
        name: &str,
        type_name: &str,
        factories: &ComponentFactories,
    ) -> Result<Option<&mut FilterEntry>> {
        require_name(name, "filter")?;
        let factory = factories.filter_factory(type_name).inspect_err(|e| {
            tracing::error!(filter = %encode_for_log(name), error = %e, "Could not find filter type");
        })?;
        tracing::debug!(filter = %encode_for_log(name), type_name = %encode_for_log(type_name), "Adding filter from type");
        self.register_filter_with(name, || factory())
    }

    /// Register a filter built by `factory`; construction failures are logged
    /// and yield `Ok(None)`.
    pub fn register_filter_with<F>(&mut self, name: &str, factory: F) -> Result<Option<&mut FilterEntry>>
    where
        F: FnOnce() -> Result<Arc<dyn Filter>>,
    {
        require_name(name, "filter")?;
        match factory() {
            Ok(filter) => self.register_filter(name, filter),
            Err(e) => {
                tracing::error!(filter = %encode_for_log(name), error = %e, "Could not register filter");
                Ok(None)
            }
        }
    }

    pub fn filter_registration(&self, name: &str) -> Option<&FilterEntry> {
        self.filter_index.get(name).map(|&idx| &self.filters[idx])
    }

    pub fn filter_registration_mut(&mut self, name: &str) -> Option<&mut FilterEntry> {
        let idx = *self.filter_index.get(name)?;
        Some(&mut self.filters[idx])
    }

    /// Live view of the filter entries, in registration order.
    pub fn filters(&self) -> impl Iterator<Item = &FilterEntry> + '_ {
        self.filters.iter()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// `(name, binding)` for every filter, in registration order.
    pub fn list_filters(&self) -> Vec<(String, FilterBinding)> {
        self.filters
            .iter()
            .map(|f| (f.name().to_string(), f.binding()))
            .collect()
    }

    // --- Routing and dispatch ---

    /// Registration whose mapping first matches `path`.
    pub fn handler_registration_for_path(&self, path: &str) -> Option<&HandlerRegistration> {
        router::resolve(&self.handlers, path)
    }

    /// Handler instance whose mapping first matches `path`.
    pub fn resolve_handler_for_path(&self, path: &str) -> Option<Arc<dyn Handler>> {
        self.handler_registration_for_path(path)
            .map(|reg| Arc::clone(reg.handler()))
    }

    /// Filters that wrap `handler_name` when dispatched at `path`.
    pub fn matching_filters(
        &self,
        path: &str,
        handler_name: &str,
        dispatch_type: DispatcherType,
    ) -> Vec<&FilterEntry> {
        router::matching_filters(&self.filters, path, handler_name, dispatch_type)
    }

    /// Dispatcher resolving `path` through the router.
    pub fn request_dispatcher(&self, path: &str) -> RequestDispatcher<'_> {
        RequestDispatcher::new(self, path, false)
    }

    /// Dispatcher looking up the handler registered as `name`.
    pub fn named_dispatcher(&self, name: &str) -> RequestDispatcher<'_> {
        RequestDispatcher::new(self, name, true)
    }

    pub fn create_dispatcher(&self, target: &str, named: bool) -> RequestDispatcher<'_> {
        RequestDispatcher::new(self, target, named)
    }

    // --- Lifecycle ---

    /// Run `init` on every component once.
    ///
    /// Handlers go first, ordered by `load_on_startup` (unset last) and then
    /// registration order; filters follow in registration order.
    ///
    /// The whole run holds a lock, so a concurrent caller returns only once
    /// it has finished. The registry counts as initialized only after every
    /// `init` succeeded; after a failure the next call runs them all again.
    /// A component must not call `initialize` from its own `init`.
    pub fn initialize(&self) -> Result<()> {
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        let mut handlers: Vec<&HandlerRegistration> = self.handlers.iter().collect();
        handlers.sort_by_key(|h| (h.load_on_startup().is_none(), h.load_on_startup().unwrap_or_default()));
        for reg in handlers {
            let config = ComponentConfig {
                name: reg.name(),
                init_parameters: reg.init_parameters(),
                registry: self,
            };
            reg.handler().init(&config).inspect_err(|e| {
                tracing::error!(handler = %encode_for_log(reg.name()), error = %e, "Handler init failed");
            })?;
        }

        for entry in &self.filters {
            let config = ComponentConfig {
                name: entry.name(),
                init_parameters: entry.init_parameters(),
                registry: self,
            };
            entry.filter().init(&config).inspect_err(|e| {
                tracing::error!(filter = %encode_for_log(entry.name()), error = %e, "Filter init failed");
            })?;
        }

        self.initialized.store(true, Ordering::Release);
        tracing::debug!(handlers = self.handlers.len(), filters = self.filters.len(), "Components initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    // --- Attributes ---

    pub fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.get(name).map(|v| Arc::clone(v.value()))
    }

    /// Attribute downcast to `T`; `None` if absent or of another type.
    pub fn attribute_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.attribute(name)?.downcast::<T>().ok()
    }

    pub fn set_attribute<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.attributes.insert(name.into(), Arc::new(value));
    }

    pub fn set_attribute_value(&self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    pub fn remove_attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.remove(name).map(|(_, v)| v)
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|e| e.key().clone()).collect()
    }

    // --- Init parameters ---

    pub fn init_parameter(&self, name: &str) -> Option<String> {
        self.init_parameters.get(name).map(|v| v.value().clone())
    }

    /// Set a context init parameter. Later calls overwrite; always true.
    pub fn set_init_parameter(&self, name: impl Into<String>, value: impl Into<String>) -> bool {
        self.init_parameters.insert(name.into(), value.into());
        true
    }

    pub fn init_parameter_names(&self) -> Vec<String> {
        self.init_parameters.iter().map(|e| e.key().clone()).collect()
    }

    // --- Container information ---

    /// Everything is served from the root context.
    pub fn context_path(&self) -> &'static str {
        ""
    }

    /// All paths share this one context.
    pub fn context(&self, _path: &str) -> &Self {
        self
    }

    pub fn server_info(&self) -> String {
        format!(
            "{}/{} (API {}.{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            API_MAJOR_VERSION,
            API_MINOR_VERSION
        )
    }

    pub fn major_version(&self) -> u32 {
        API_MAJOR_VERSION
    }

    pub fn minor_version(&self) -> u32 {
        API_MINOR_VERSION
    }

    pub fn effective_major_version(&self) -> u32 {
        API_MAJOR_VERSION
    }

    pub fn effective_minor_version(&self) -> u32 {
        API_MINOR_VERSION
    }

    pub fn log(&self, message: &str) {
        tracing::info!("{}", encode_for_log(message));
    }

    pub fn log_error(&self, message: &str, error: &dyn std::error::Error) {
        tracing::error!(error = %encode_for_log(&error.to_string()), "{}", encode_for_log(message));
    }

    // --- Unsupported container features ---

    pub fn add_jsp_file(&mut self, _name: &str, _jsp_file: &str) -> Result<&mut HandlerRegistration> {
        Err(DispatchError::Unsupported("add_jsp_file"))
    }

    pub fn resource_paths(&self, _path: &str) -> Result<Vec<String>> {
        Err(DispatchError::Unsupported("resource_paths"))
    }

    pub fn set_session_timeout(&self, _minutes: u32) -> Result<()> {
        Err(DispatchError::Unsupported("set_session_timeout"))
    }

    pub fn session_timeout(&self) -> u32 {
        0
    }

    pub fn set_request_character_encoding(&self, _encoding: &str) -> Result<()> {
        Err(DispatchError::Unsupported("set_request_character_encoding"))
    }

    pub fn request_character_encoding(&self) -> Option<&str> {
        None
    }

    pub fn set_response_character_encoding(&self, _encoding: &str) -> Result<()> {
        Err(DispatchError::Unsupported("set_response_character_encoding"))
    }

    pub fn response_character_encoding(&self) -> Option<&str> {
        None
    }

    pub fn virtual_server_name(&self) -> Option<&str> {
        None
    }

    /// Security roles are not tracked.
    pub fn declare_roles<I, S>(&self, _roles: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("handlers", &self.handlers)
            .field("filters", &self.filters)
            .field("attributes", &self.attributes.len())
            .field("init_parameters", &self.init_parameters.len())
            .finish()
    }
}

fn require_name(name: &str, kind: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DispatchError::Configuration(format!("Missing {kind} name")));
    }
    Ok(())
}

fn metrics_registry_size(registry: &Registry) {
    crate::observability::metrics::record_registry_size("handler", registry.handlers.len());
    crate::observability::metrics::record_registry_size("filter", registry.filters.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{filter_fn, handler_fn};
    use std::sync::Mutex;

    fn noop_handler() -> Arc<dyn Handler> {
        Arc::new(handler_fn(|_, _| Ok(())))
    }

    fn pass_filter() -> Arc<dyn Filter> {
        Arc::new(filter_fn(|req, res, chain| chain.do_filter(req, res)))
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register_handler("", noop_handler()),
            Err(DispatchError::Configuration(_))
        ));
        assert!(matches!(
            registry.register_filter("  ", pass_filter()),
            Err(DispatchError::Configuration(_))
        ));
        assert_eq!(registry.handler_count(), 0);
        assert_eq!(registry.filter_count(), 0);
    }

    #[test]
    fn test_duplicate_filter_is_ignored() {
        let mut registry = Registry::new();
        assert!(registry.register_filter("log", pass_filter()).unwrap().is_some());
        assert!(registry.register_filter("log", pass_filter()).unwrap().is_none());
        assert_eq!(registry.filter_count(), 1);
    }

    #[test]
    fn test_handler_reregistration_keeps_first_instance() {
        let mut registry = Registry::new();
        let first = noop_handler();
        registry.register_handler("api", Arc::clone(&first)).unwrap();
        let reg = registry.register_handler("api", noop_handler()).unwrap();
        assert!(Arc::ptr_eq(reg.handler(), &first));
        assert_eq!(registry.handler_count(), 1);
    }

    #[test]
    fn test_add_handler_mapping_reports_conflicts() {
        let mut registry = Registry::new();
        registry.register_handler("a", noop_handler()).unwrap();
        registry.register_handler("b", noop_handler()).unwrap();

        assert!(registry.add_handler_mapping("a", ["/x", "/y"]).unwrap().is_empty());
        let conflicts = registry.add_handler_mapping("b", ["/z", "/y"]).unwrap();
        assert_eq!(conflicts, vec!["/y".to_string()]);
        assert!(registry.handler_registration("b").unwrap().mappings().is_empty());

        assert!(matches!(
            registry.add_handler_mapping("missing", ["/q"]),
            Err(DispatchError::TargetNotFound { named: true, .. })
        ));
    }

    #[test]
    fn test_filter_by_type() {
        let mut factories = ComponentFactories::new();
        factories
            .register_filter_type("pass", || Ok(pass_filter()))
            .register_filter_type("broken", || Err(DispatchError::Handler("boom".into())))
            .register_handler_type("plain", || Ok(noop_handler()));

        let mut registry = Registry::new();
        assert!(registry.register_filter_type("ok", "pass", &factories).unwrap().is_some());
        // Construction failure is logged, not raised.
        assert!(registry.register_filter_type("bad", "broken", &factories).unwrap().is_none());
        assert!(matches!(
            registry.register_filter_type("x", "nope", &factories),
            Err(DispatchError::TypeNotFound(_))
        ));
        assert!(matches!(
            registry.register_filter_type("x", "plain", &factories),
            Err(DispatchError::NotAFilter(_))
        ));
        assert_eq!(registry.filter_count(), 1);
    }

    #[test]
    fn test_handler_by_type_construction_failure() {
        let mut factories = ComponentFactories::new();
        factories.register_handler_type("broken", || Err(DispatchError::Handler("boom".into())));
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register_handler_type("h", "broken", &factories),
            Err(DispatchError::Construction { .. })
        ));
        assert!(registry.handler_registration("h").is_none());
    }

    #[test]
    fn test_filters_enumerate_in_insertion_order() {
        let mut registry = Registry::new();
        for name in ["c", "a", "b"] {
            registry.register_filter(name, pass_filter()).unwrap();
        }
        let names: Vec<&str> = registry.filters().map(|f| f.name()).collect();
        assert_eq!(names, ["c", "a", "b"]);
        let listed: Vec<String> = registry.list_filters().into_iter().map(|(n, _)| n).collect();
        assert_eq!(listed, ["c", "a", "b"]);
    }

    #[test]
    fn test_attributes() {
        let registry = Registry::new();
        assert!(registry.attribute("missing").is_none());

        registry.set_attribute("count", 7u32);
        assert_eq!(registry.attribute_as::<u32>("count").as_deref(), Some(&7));
        assert!(registry.attribute_as::<String>("count").is_none());

        registry.set_attribute("count", 8u32);
        assert_eq!(registry.attribute_as::<u32>("count").as_deref(), Some(&8));

        assert!(registry.remove_attribute("count").is_some());
        assert!(registry.attribute_names().is_empty());
    }

    #[test]
    fn test_init_parameters_overwrite() {
        let registry = Registry::new();
        assert!(registry.set_init_parameter("mode", "a"));
        assert!(registry.set_init_parameter("mode", "b"));
        assert_eq!(registry.init_parameter("mode").as_deref(), Some("b"));
        assert_eq!(registry.init_parameter_names(), vec!["mode".to_string()]);
        assert!(registry.init_parameter("other").is_none());
    }

    #[test]
    fn test_container_information() {
        let mut registry = Registry::new();
        assert_eq!(registry.context_path(), "");
        assert_eq!(registry.major_version(), 6);
        assert_eq!(registry.minor_version(), 0);
        assert!(registry.server_info().ends_with("(API 6.0)"));
        assert!(std::ptr::eq(registry.context("/anything"), &registry));
        assert_eq!(registry.session_timeout(), 0);
        assert!(registry.virtual_server_name().is_none());

        assert!(matches!(registry.resource_paths("/"), Err(DispatchError::Unsupported(_))));
        assert!(matches!(registry.set_session_timeout(5), Err(DispatchError::Unsupported(_))));
        assert!(matches!(
            registry.add_jsp_file("page", "/page.jsp"),
            Err(DispatchError::Unsupported(_))
        ));
    }

    #[test]
    fn test_initialize_order_and_once() {
        let order = Arc::new(Mutex::new(Vec::new()));

        struct Recorder(&'static str, Arc<Mutex<Vec<&'static str>>>);
        impl Handler for Recorder {
            fn init(&self, _config: &ComponentConfig<'_>) -> Result<()> {
                self.1.lock().unwrap().push(self.0);
                Ok(())
            }
            fn service(&self, _req: &mut crate::http::ServletRequest, _res: &mut crate::http::ServletResponse) -> Result<()> {
                Ok(())
            }
        }

        let mut registry = Registry::new();
        registry
            .register_handler("lazy", Arc::new(Recorder("lazy", Arc::clone(&order))))
            .unwrap();
        registry
            .register_handler("second", Arc::new(Recorder("second", Arc::clone(&order))))
            .unwrap()
            .set_load_on_startup(2);
        registry
            .register_handler("first", Arc::new(Recorder("first", Arc::clone(&order))))
            .unwrap()
            .set_load_on_startup(1);

        registry.initialize().unwrap();
        registry.initialize().unwrap();
        assert!(registry.is_initialized());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "lazy"]);
    }

    struct Flaky {
        attempts: std::sync::atomic::AtomicUsize,
    }

    impl Handler for Flaky {
        fn init(&self, _config: &ComponentConfig<'_>) -> Result<()> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(DispatchError::Handler("not ready".into()));
            }
            Ok(())
        }
        fn service(&self, _req: &mut crate::http::ServletRequest, _res: &mut crate::http::ServletResponse) -> Result<()> {
            Ok(())
        }
    }

    struct Counting(Arc<std::sync::atomic::AtomicUsize>);

    impl Handler for Counting {
        fn init(&self, _config: &ComponentConfig<'_>) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn service(&self, _req: &mut crate::http::ServletRequest, _res: &mut crate::http::ServletResponse) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_initialize_can_be_retried() {
        let later_inits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry
            .register_handler("flaky", Arc::new(Flaky { attempts: Default::default() }))
            .unwrap()
            .set_load_on_startup(1);
        registry
            .register_handler("later", Arc::new(Counting(Arc::clone(&later_inits))))
            .unwrap()
            .set_load_on_startup(2);

        assert!(registry.initialize().is_err());
        assert!(!registry.is_initialized());
        assert_eq!(later_inits.load(Ordering::SeqCst), 0);

        registry.initialize().unwrap();
        assert!(registry.is_initialized());
        assert_eq!(later_inits.load(Ordering::SeqCst), 1);

        registry.initialize().unwrap();
        assert_eq!(later_inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_initialize_waits_for_the_run() {
        let inits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry
            .register_handler("counted", Arc::new(Counting(Arc::clone(&inits))))
            .unwrap();

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    registry.initialize().unwrap();
                    // Nobody returns before init has run.
                    assert!(registry.is_initialized());
                    assert_eq!(inits.load(Ordering::SeqCst), 1);
                });
            }
        });
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blank_filter_name_checked_before_type() {
        let factories = ComponentFactories::new();
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register_filter_type(" ", "no.such.Type", &factories),
            Err(DispatchError::Configuration(_))
        ));
    }
}
