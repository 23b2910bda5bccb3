//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → reflector (upstream fetch, metadata scan, page synthesis)
//!     → response.rs (status mapping, content type)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use response::{status_body, HTML_CONTENT_TYPE};
pub use server::{AppState, ReflectorServer, ServerError};
