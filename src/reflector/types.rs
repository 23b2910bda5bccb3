//! Reflection outcomes, captured metadata and error definitions.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that abort a reflection before any response can be synthesized.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// The upstream request could not be completed (DNS, connect, TLS, redirect loop).
    #[error("upstream request to {url} failed: {reason}")]
    Upstream { url: String, reason: String },

    /// The upstream body stream failed part way through.
    #[error("upstream body read failed: {0}")]
    Body(String),

    /// The HTML scanner rejected the body, e.g. buffered markup outgrew its memory limit.
    #[error("upstream body scan failed: {0}")]
    Scan(String),
}

/// Result type for reflection operations.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// The four tracked fields, each bound to one capture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    OgType,
    OgTitle,
    OgDescription,
    ThemeColor,
}

/// Metadata captured while the upstream document streams past.
///
/// Every matching tag assigns its slot, so the last match wins. A match
/// without a `content` attribute clears the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub og_type: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub theme_color: Option<String>,
}

impl MetadataRecord {
    /// Mutable access to the slot for `field`.
    pub fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::OgType => &mut self.og_type,
            Field::OgTitle => &mut self.og_title,
            Field::OgDescription => &mut self.og_description,
            Field::ThemeColor => &mut self.theme_color,
        }
    }

    /// Returns the page metadata when every slot holds a non-empty value.
    pub fn into_complete(self) -> Option<PageMetadata> {
        fn filled(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        Some(PageMetadata {
            og_type: filled(self.og_type)?,
            og_title: filled(self.og_title)?,
            og_description: filled(self.og_description)?,
            theme_color: filled(self.theme_color)?,
        })
    }
}

/// Complete metadata, ready to be rendered into the redirect page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub og_type: String,
    pub og_title: String,
    pub og_description: String,
    pub theme_color: String,
}

/// What a single reflection produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reflection {
    /// Upstream answered with a non-success status. The body was not read.
    UpstreamStatus(StatusCode),
    /// Upstream succeeded but at least one tracked field was missing or empty.
    IncompleteMetadata,
    /// The synthesized redirect page.
    Page(String),
}

impl Reflection {
    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Reflection::UpstreamStatus(_) => "upstream_error_status",
            Reflection::IncompleteMetadata => "incomplete_metadata",
            Reflection::Page(_) => "rendered",
        }
    }
}
