//! Response construction.
//!
//! # Responsibilities
//! - Turn a `Reflection` into the client-facing response
//! - Mirror upstream client-error statuses with a fixed plain-text body
//! - Map transport failures to 502 Bad Gateway
//!
//! # Design Decisions
//! - Only 400, 401, 403 and 404 carry a body; other failures are mirrored
//!   with an empty body and no content type
//! - The synthesized page always goes out as `text/html; charset=utf-8`

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::reflector::{ReflectError, Reflection};

/// Content type of the synthesized page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Fixed body for the upstream statuses that get one.
pub fn status_body(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::BAD_REQUEST => Some("Bad Request"),
        StatusCode::UNAUTHORIZED => Some("Unauthorized"),
        StatusCode::FORBIDDEN => Some("Forbidden"),
        StatusCode::NOT_FOUND => Some("Not Found"),
        _ => None,
    }
}

impl IntoResponse for Reflection {
    fn into_response(self) -> Response {
        match self {
            Reflection::UpstreamStatus(status) => match status_body(status) {
                Some(body) => (status, body).into_response(),
                None => status.into_response(),
            },
            Reflection::IncompleteMetadata => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            Reflection::Page(page) => {
                ([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], page).into_response()
            }
        }
    }
}

impl IntoResponse for ReflectError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
    }
}
