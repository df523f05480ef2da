//! Request dispatchers.
//!
//! # Responsibilities
//! - Bind a reusable handle to a path or a registered handler name
//! - Resolve the target, assemble its filter chain, and run it
//! - Apply forward / include semantics to the shared response
//!
//! # Design Decisions
//! - Path targets go through the router; named targets are a direct lookup
//! - A resolution miss is `TargetNotFound`; the caller picks the response
//! - Forward resets an uncommitted response and commits it afterwards
//! - Include appends to the response and keeps the caller's status
//! - Forward and include restore the caller's URI and `DispatchInfo` when done

use axum::http::Uri;
use serde::{Deserialize, Serialize};

use crate::dispatch::chain::FilterChain;
use crate::dispatch::exchange::{DispatchTarget, ExchangeBuilder};
use crate::error::{DispatchError, Result};
use crate::http::{ensure_request_id, ServletRequest, ServletResponse, ServletResponseExt};
use crate::observability::metrics;
use crate::registry::{HandlerRegistration, Registry};

/// How a chain is being entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatcherType {
    /// Fresh request from the front end.
    Request,
    Forward,
    Include,
}

impl DispatcherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatcherType::Request => "request",
            DispatcherType::Forward => "forward",
            DispatcherType::Include => "include",
        }
    }
}

/// Attached to the request for the duration of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchInfo {
    pub dispatcher_type: DispatcherType,
    pub target: String,
    pub named: bool,
    pub handler: String,
    /// Request path before a forward rewrote it.
    pub original_path: String,
}

/// Handle bound to a dispatch target.
#[derive(Debug, Clone)]
pub struct RequestDispatcher<'a> {
    registry: &'a Registry,
    target: String,
    named: bool,
}

impl<'a> RequestDispatcher<'a> {
    pub fn new(registry: &'a Registry, target: impl Into<String>, named: bool) -> Self {
        Self {
            registry,
            target: target.into(),
            named,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    /// Target path without any query string.
    fn target_path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    /// Find the handler registration this dispatcher points at.
    pub fn resolve(&self) -> Result<&'a HandlerRegistration> {
        let found = if self.named {
            self.registry.handler_registration(&self.target)
        } else {
            self.registry.handler_registration_for_path(self.target_path())
        };
        found.ok_or_else(|| DispatchError::TargetNotFound {
            target: self.target.clone(),
            named: self.named,
        })
    }

    /// Build the chain for this target.
    ///
    /// `request_path` is only consulted for named dispatchers, which have no
    /// path of their own.
    pub fn filter_chain(&self, dispatch_type: DispatcherType, request_path: &str) -> Result<FilterChain<'a>> {
        let registration = self.resolve()?;
        let path = if self.named { request_path } else { self.target_path() };
        let filters = self
            .registry
            .matching_filters(path, registration.name(), dispatch_type);
        Ok(FilterChain::new(filters, registration))
    }

    /// Replace the response with the target's output.
    pub fn forward(&self, req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()> {
        self.dispatch(DispatcherType::Forward, req, res)
    }

    /// Append the target's output to the response.
    pub fn include(&self, req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()> {
        self.dispatch(DispatcherType::Include, req, res)
    }

    /// Run the target's chain against `req`/`res`.
    pub fn dispatch(
        &self,
        dispatch_type: DispatcherType,
        req: &mut ServletRequest,
        res: &mut ServletResponse,
    ) -> Result<()> {
        let request_id = ensure_request_id(req);
        let span = tracing::debug_span!(
            "dispatch",
            request_id = %request_id,
            target = %self.target,
            named = self.named,
            mode = dispatch_type.as_str(),
        );
        let _entered = span.enter();

        let result = self.run(dispatch_type, req, res);
        match &result {
            Ok(()) => metrics::record_dispatch(dispatch_type, "ok"),
            Err(e) => {
                tracing::debug!(error = %e, "Dispatch failed");
                metrics::record_dispatch(dispatch_type, e.kind());
            }
        }
        result
    }

    /// Build a request/response pair through `builder` and dispatch it.
    pub fn invoke(&self, dispatch_type: DispatcherType, builder: &dyn ExchangeBuilder) -> Result<ServletResponse> {
        let (mut req, mut res) = builder.build(&DispatchTarget {
            target: &self.target,
            named: self.named,
        })?;
        self.dispatch(dispatch_type, &mut req, &mut res)?;
        Ok(res)
    }

    fn run(&self, dispatch_type: DispatcherType, req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()> {
        let original_path = req.uri().path().to_string();
        let mut chain = self.filter_chain(dispatch_type, &original_path)?;
        metrics::record_chain_length(chain.len());
        tracing::debug!(
            handler = %chain.handler_name(),
            filters = ?chain.filter_names(),
            "Dispatching"
        );

        let forward_uri = match dispatch_type {
            DispatcherType::Forward if res.is_committed() => {
                return Err(DispatchError::Configuration(
                    "cannot forward after the response has been committed".into(),
                ));
            }
            DispatcherType::Forward if !self.named => Some(self.target_uri()?),
            _ => None,
        };

        let previous_info = req.extensions_mut().insert(DispatchInfo {
            dispatcher_type: dispatch_type,
            target: self.target.clone(),
            named: self.named,
            handler: chain.handler_name().to_string(),
            original_path,
        });

        let outcome = match dispatch_type {
            // The outermost dispatch keeps its info on the request.
            DispatcherType::Request => return chain.do_filter(req, res),
            DispatcherType::Forward => {
                let previous_uri = forward_uri.map(|uri| std::mem::replace(req.uri_mut(), uri));
                res.reset();
                let outcome = chain.do_filter(req, res);
                if outcome.is_ok() {
                    res.commit();
                }
                if let Some(uri) = previous_uri {
                    *req.uri_mut() = uri;
                }
                outcome
            }
            DispatcherType::Include => {
                let status = res.status();
                let outcome = chain.do_filter(req, res);
                *res.status_mut() = status;
                outcome
            }
        };

        // Nested dispatches hand the request back as the caller left it.
        match previous_info {
            Some(info) => {
                req.extensions_mut().insert(info);
            }
            None => {
                req.extensions_mut().remove::<DispatchInfo>();
            }
        }
        outcome
    }

    fn target_uri(&self) -> Result<Uri> {
        let target = if self.target.is_empty() { "/" } else { self.target.as_str() };
        target
            .parse::<Uri>()
            .map_err(|e| DispatchError::Configuration(format!("invalid forward target '{}': {e}", self.target)))
    }
}
