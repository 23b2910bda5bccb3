//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate origins are absolute http(s) URLs without a path
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReflectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ReflectorConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An address field does not parse as `ip:port`.
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    /// An origin field is not an absolute http(s) URL with an empty path.
    #[error("{field}: invalid origin {value:?} ({reason})")]
    InvalidOrigin {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A numeric field must be strictly positive.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// A string field must not be empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ReflectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_origin(&mut errors, "upstream.origin", &config.upstream.origin);
    check_origin(&mut errors, "page.image_origin", &config.page.image_origin);

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.connect_timeout_secs"));
    }
    if config.upstream.scan_memory_limit_bytes == 0 {
        errors.push(ValidationError::Zero("upstream.scan_memory_limit_bytes"));
    }

    if config.page.site_name.trim().is_empty() {
        errors.push(ValidationError::Empty("page.site_name"));
    }
    if config.page.twitter_card.trim().is_empty() {
        errors.push(ValidationError::Empty("page.twitter_card"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_origin(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let invalid = |reason| ValidationError::InvalidOrigin {
        field,
        value: value.to_string(),
        reason,
    };

    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(_) => {
            errors.push(invalid("not an absolute URL"));
            return;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        errors.push(invalid("scheme must be http or https"));
    } else if url.host_str().is_none() {
        errors.push(invalid("missing host"));
    } else if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        // Paths are appended verbatim, so the origin itself must not carry one.
        errors.push(invalid("must not contain a path, query or fragment"));
    }
}
