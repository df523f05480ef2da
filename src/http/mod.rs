//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, body buffering)
//!     → request.rs (ServletRequest, request ID)
//!     → Registry::request_dispatcher(path).dispatch(Request, ..)
//!     → response.rs (ServletResponse → axum Response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{build_request, ensure_request_id, RequestId, RequestIdExt, ServletRequest, X_REQUEST_ID};
pub use response::{error_response, into_axum_response, new_response, ServletResponse, ServletResponseExt};
pub use server::{AppState, HttpServer};
