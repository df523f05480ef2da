//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use servlet_dispatch::dispatch::{filter_fn, handler_fn, Filter, Handler};
use servlet_dispatch::http::ServletResponseExt;

/// Ordered log of component invocations shared by a test.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Handler that records `name` and writes it to the body.
pub fn recording_handler(name: &'static str, trace: &Trace) -> Arc<dyn Handler> {
    let trace = trace.clone();
    Arc::new(handler_fn(move |_req, res| {
        trace.push(name);
        res.write_str(name);
        Ok(())
    }))
}

/// Filter that records `name` on the way in and `/name` on the way out.
pub fn recording_filter(name: &'static str, trace: &Trace) -> Arc<dyn Filter> {
    let trace = trace.clone();
    Arc::new(filter_fn(move |req, res, chain| {
        trace.push(name);
        let outcome = chain.do_filter(req, res);
        trace.push(format!("/{name}"));
        outcome
    }))
}

/// Filter that records `name` and never continues the chain.
pub fn blocking_filter(name: &'static str, trace: &Trace) -> Arc<dyn Filter> {
    let trace = trace.clone();
    Arc::new(filter_fn(move |_req, res, _chain| {
        trace.push(name);
        res.write_str("blocked");
        Ok(())
    }))
}
