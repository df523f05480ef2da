//! Response buffer shared by a filter chain.
//!
//! # Responsibilities
//! - Define the response type written by filters and handlers
//! - Track whether the response has been committed
//! - Convert into an axum response at the edge
//!
//! # Design Decisions
//! - The body is an in-memory buffer; nothing is streamed before the chain ends
//! - Commit state is an extension flag so the type stays a plain `http::Response`

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;

use crate::error::DispatchError;

/// Response handed to filters and handlers.
pub type ServletResponse = Response<Vec<u8>>;

#[derive(Debug, Clone, Copy)]
struct Committed;

/// Create an empty `200 OK` response.
pub fn new_response() -> ServletResponse {
    Response::new(Vec::new())
}

/// Buffer-level operations on [`ServletResponse`].
pub trait ServletResponseExt {
    /// True once `commit` has been called.
    fn is_committed(&self) -> bool;
    /// Mark the response as sent; later resets are refused.
    fn commit(&mut self);
    /// Clear the body, keeping status and headers.
    fn reset_buffer(&mut self);
    /// Clear body and headers and restore `200 OK`.
    fn reset(&mut self);
    /// Append UTF-8 text to the body.
    fn write_str(&mut self, text: &str);
    /// Set the content type, ignoring values that are not valid header text.
    fn set_content_type(&mut self, content_type: &str);
}

impl ServletResponseExt for ServletResponse {
    fn is_committed(&self) -> bool {
        self.extensions().get::<Committed>().is_some()
    }

    fn commit(&mut self) {
        self.extensions_mut().insert(Committed);
    }

    fn reset_buffer(&mut self) {
        self.body_mut().clear();
    }

    fn reset(&mut self) {
        self.body_mut().clear();
        *self.headers_mut() = HeaderMap::new();
        *self.status_mut() = StatusCode::OK;
    }

    fn write_str(&mut self, text: &str) {
        self.body_mut().extend_from_slice(text.as_bytes());
    }

    fn set_content_type(&mut self, content_type: &str) {
        if let Ok(value) = HeaderValue::from_str(content_type) {
            self.headers_mut().insert(header::CONTENT_TYPE, value);
        }
    }
}

/// Convert a finished chain response into an axum response.
pub fn into_axum_response(res: ServletResponse) -> axum::response::Response {
    let (parts, body) = res.into_parts();
    Response::from_parts(parts, Body::from(body))
}

/// Plain-text error response for a failed dispatch.
pub fn error_response(err: &DispatchError) -> axum::response::Response {
    (err.status_code(), err.to_string()).into_response()
}
