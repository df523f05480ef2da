//! Request representation and request-id propagation.
//!
//! # Responsibilities
//! - Define the request type that flows through filter chains
//! - Generate a unique request ID (UUID v4) when the caller did not send one
//! - Build synthetic requests for dispatch targets
//!
//! # Design Decisions
//! - Bodies are fully buffered (`Bytes`) before dispatch; chains are synchronous
//! - Request ID lives both in the `x-request-id` header and as an extension

use axum::body::Bytes;
use axum::http::{HeaderValue, Method, Request};
use uuid::Uuid;

use crate::error::{DispatchError, Result};

/// Request handed to filters and handlers.
pub type ServletRequest = Request<Bytes>;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID attached to every dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access to the request ID extension.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Make sure the request carries an ID, reusing the incoming header if present.
pub fn ensure_request_id<B>(req: &mut Request<B>) -> RequestId {
    if let Some(id) = req.extensions().get::<RequestId>() {
        return id.clone();
    }

    let id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&id) {
        req.headers_mut().insert(X_REQUEST_ID, value);
    }
    let id = RequestId(id);
    req.extensions_mut().insert(id.clone());
    id
}

/// Build an empty-bodied request for `method` and `target`.
pub fn build_request(method: Method, target: &str) -> Result<ServletRequest> {
    // An empty target is the context root.
    let uri = if target.is_empty() { "/" } else { target };
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .map_err(|e| DispatchError::Configuration(format!("invalid dispatch target '{target}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_request_id() {
        let mut req = build_request(Method::GET, "/a").unwrap();
        let id = ensure_request_id(&mut req);
        assert!(!id.as_str().is_empty());
        assert_eq!(req.headers().get(X_REQUEST_ID).unwrap(), id.as_str());
        assert_eq!(req.request_id(), Some(&id));

        // Stable on the second call.
        assert_eq!(ensure_request_id(&mut req), id);
    }

    #[test]
    fn test_reuses_incoming_header() {
        let mut req = Request::builder()
            .uri("/a")
            .header(X_REQUEST_ID, "abc-123")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(ensure_request_id(&mut req).as_str(), "abc-123");
    }

    #[test]
    fn test_build_request_root() {
        let req = build_request(Method::GET, "").unwrap();
        assert_eq!(req.uri().path(), "/");
        assert!(build_request(Method::GET, "/bad path").is_err());
    }
}
