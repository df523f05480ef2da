//! Handler and filter capabilities.
//!
//! Concrete handlers and filters are supplied by the surrounding system;
//! this crate only stores them and drives them through a [`FilterChain`].

use std::collections::HashMap;

use crate::dispatch::chain::FilterChain;
use crate::error::Result;
use crate::http::{ServletRequest, ServletResponse};
use crate::registry::Registry;

/// Configuration view passed to `init`.
pub struct ComponentConfig<'a> {
    pub name: &'a str,
    pub init_parameters: &'a HashMap<String, String>,
    pub registry: &'a Registry,
}

impl ComponentConfig<'_> {
    pub fn init_parameter(&self, name: &str) -> Option<&str> {
        self.init_parameters.get(name).map(String::as_str)
    }
}

/// Terminal unit of request processing.
pub trait Handler: Send + Sync + 'static {
    /// Called once by [`Registry::initialize`], in registration order.
    fn init(&self, _config: &ComponentConfig<'_>) -> Result<()> {
        Ok(())
    }

    fn service(&self, req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()>;
}

/// Chain participant wrapping handler execution.
///
/// A filter continues the chain by calling [`FilterChain::do_filter`];
/// returning without doing so short-circuits the remaining filters and
/// the handler.
pub trait Filter: Send + Sync + 'static {
    /// Called once by [`Registry::initialize`], in registration order.
    fn init(&self, _config: &ComponentConfig<'_>) -> Result<()> {
        Ok(())
    }

    fn do_filter(
        &self,
        req: &mut ServletRequest,
        res: &mut ServletResponse,
        chain: &mut FilterChain<'_>,
    ) -> Result<()>;
}

/// Handler backed by a closure. Built with [`handler_fn`].
pub struct HandlerFn<F>(F);

/// Wrap a closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut ServletRequest, &mut ServletResponse) -> Result<()> + Send + Sync + 'static,
{
    HandlerFn(f)
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut ServletRequest, &mut ServletResponse) -> Result<()> + Send + Sync + 'static,
{
    fn service(&self, req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()> {
        (self.0)(req, res)
    }
}

/// Filter backed by a closure. Built with [`filter_fn`].
pub struct FilterFn<F>(F);

/// Wrap a closure as a [`Filter`].
pub fn filter_fn<F>(f: F) -> FilterFn<F>
where
    F: Fn(&mut ServletRequest, &mut ServletResponse, &mut FilterChain<'_>) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    FilterFn(f)
}

impl<F> Filter for FilterFn<F>
where
    F: Fn(&mut ServletRequest, &mut ServletResponse, &mut FilterChain<'_>) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    fn do_filter(
        &self,
        req: &mut ServletRequest,
        res: &mut ServletResponse,
        chain: &mut FilterChain<'_>,
    ) -> Result<()> {
        (self.0)(req, res, chain)
    }
}
