//! Request/response construction for dispatch targets.

use axum::http::Method;

use crate::error::Result;
use crate::http::{build_request, new_response, ServletRequest, ServletResponse};

/// What a dispatcher is about to run.
#[derive(Debug, Clone, Copy)]
pub struct DispatchTarget<'a> {
    pub target: &'a str,
    pub named: bool,
}

/// Builds the request/response pair a dispatch runs against.
pub trait ExchangeBuilder: Send + Sync {
    fn build(&self, target: &DispatchTarget<'_>) -> Result<(ServletRequest, ServletResponse)>;
}

/// Synthesizes a bodiless request aimed at the target path.
///
/// Named targets carry no path of their own and are sent to `/`.
#[derive(Debug, Clone)]
pub struct DefaultExchangeBuilder {
    method: Method,
}

impl DefaultExchangeBuilder {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Default for DefaultExchangeBuilder {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl ExchangeBuilder for DefaultExchangeBuilder {
    fn build(&self, target: &DispatchTarget<'_>) -> Result<(ServletRequest, ServletResponse)> {
        let path = if target.named { "/" } else { target.target };
        let req = build_request(self.method.clone(), path)?;
        Ok((req, new_response()))
    }
}
