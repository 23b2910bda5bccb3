//! Request identification.
//!
//! # Responsibilities
//! - Read the request ID back for logging inside handlers
//!
//! # Design Decisions
//! - IDs are minted by `tower_http`'s `MakeRequestUuid` (UUID v4) as early
//!   as possible for tracing
//! - An ID supplied by the client is kept and echoed back

use axum::http::HeaderMap;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request ID from `headers`, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
