//! Stock filters.

use std::sync::OnceLock;
use std::time::Instant;

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::dispatch::{ComponentConfig, DispatchInfo, DispatcherType, Filter, FilterChain};
use crate::error::{DispatchError, Result};
use crate::http::{RequestIdExt, ServletRequest, ServletResponse, ServletResponseExt};
use crate::observability::logging::encode_for_log;

/// Emits one `info` event per pass through the chain.
#[derive(Debug, Default)]
pub struct AccessLogFilter;

impl Filter for AccessLogFilter {
    fn do_filter(
        &self,
        req: &mut ServletRequest,
        res: &mut ServletResponse,
        chain: &mut FilterChain<'_>,
    ) -> Result<()> {
        let start = Instant::now();
        let method = req.method().clone();
        let path = encode_for_log(req.uri().path());

        let outcome = chain.do_filter(req, res);

        let request_id = req.request_id().map(|id| id.to_string()).unwrap_or_default();
        let mode = req
            .extensions()
            .get::<DispatchInfo>()
            .map_or(DispatcherType::Request, |info| info.dispatcher_type);
        tracing::info!(
            request_id = %request_id,
            mode = mode.as_str(),
            method = %method,
            path = %path,
            status = res.status().as_u16(),
            elapsed_us = start.elapsed().as_micros() as u64,
            ok = outcome.is_ok(),
            "access"
        );
        outcome
    }
}

/// Adds each init parameter to the response as a header.
///
/// Headers are applied after the rest of the chain so they override
/// values written by the handler.
#[derive(Debug, Default)]
pub struct SetHeadersFilter {
    headers: OnceLock<HeaderMap>,
}

impl Filter for SetHeadersFilter {
    fn init(&self, config: &ComponentConfig<'_>) -> Result<()> {
        let mut headers = HeaderMap::new();
        for (name, value) in config.init_parameters {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| DispatchError::construction(config.name, format!("header '{name}': {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| DispatchError::construction(config.name, format!("header '{name}': {e}")))?;
            headers.insert(header_name, header_value);
        }
        let _ = self.headers.set(headers);
        Ok(())
    }

    fn do_filter(
        &self,
        req: &mut ServletRequest,
        res: &mut ServletResponse,
        chain: &mut FilterChain<'_>,
    ) -> Result<()> {
        chain.do_filter(req, res)?;
        if let Some(headers) = self.headers.get() {
            for (name, value) in headers {
                res.headers_mut().insert(name.clone(), value.clone());
            }
        }
        Ok(())
    }
}

/// Stops the chain and answers with a fixed status.
#[derive(Debug, Default)]
pub struct DenyFilter {
    status: OnceLock<StatusCode>,
}

impl DenyFilter {
    fn status(&self) -> StatusCode {
        self.status.get().copied().unwrap_or(StatusCode::FORBIDDEN)
    }
}

impl Filter for DenyFilter {
    fn init(&self, config: &ComponentConfig<'_>) -> Result<()> {
        if let Some(raw) = config.init_parameter("status") {
            let status = raw
                .parse::<u16>()
                .ok()
                .and_then(|code| StatusCode::from_u16(code).ok())
                .ok_or_else(|| DispatchError::construction(config.name, format!("invalid status '{raw}'")))?;
            let _ = self.status.set(status);
        }
        Ok(())
    }

    fn do_filter(
        &self,
        req: &mut ServletRequest,
        res: &mut ServletResponse,
        _chain: &mut FilterChain<'_>,
    ) -> Result<()> {
        let status = self.status();
        tracing::debug!(path = %encode_for_log(req.uri().path()), status = status.as_u16(), "Request denied");
        res.reset_buffer();
        *res.status_mut() = status;
        res.write_str(status.canonical_reason().unwrap_or("Denied"));
        Ok(())
    }
}
