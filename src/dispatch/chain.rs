//! Ordered filter chain terminating in a handler.

use crate::error::Result;
use crate::http::{ServletRequest, ServletResponse};
use crate::registry::{FilterEntry, HandlerRegistration};

/// One pass through the matching filters and the resolved handler.
///
/// Each call to [`do_filter`](Self::do_filter) advances one position.
/// Once every filter has run the handler is invoked; calls after that
/// are no-ops.
pub struct FilterChain<'a> {
    filters: Vec<&'a FilterEntry>,
    handler: &'a HandlerRegistration,
    position: usize,
    handler_invoked: bool,
}

impl<'a> FilterChain<'a> {
    pub fn new(filters: Vec<&'a FilterEntry>, handler: &'a HandlerRegistration) -> Self {
        Self {
            filters,
            handler,
            position: 0,
            handler_invoked: false,
        }
    }

    /// Run the next filter, or the handler once the filters are exhausted.
    pub fn do_filter(&mut self, req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()> {
        if let Some(entry) = self.filters.get(self.position).copied() {
            self.position += 1;
            tracing::trace!(filter = %entry.name(), position = self.position, "Entering filter");
            return entry.filter().do_filter(req, res, self);
        }

        if self.handler_invoked {
            return Ok(());
        }
        self.handler_invoked = true;
        tracing::trace!(handler = %self.handler.name(), "Invoking handler");
        self.handler.handler().service(req, res)
    }

    /// Filters not yet entered.
    pub fn remaining(&self) -> usize {
        self.filters.len() - self.position
    }

    /// Names of every filter in the chain, in execution order.
    pub fn filter_names(&self) -> Vec<&'a str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn handler_name(&self) -> &'a str {
        self.handler.name()
    }

    pub fn handler_invoked(&self) -> bool {
        self.handler_invoked
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
