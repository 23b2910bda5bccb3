//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Reflector and HTTP layer produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID is attached to every reflector log line
//! - Metrics are recorded through the `metrics` facade and are no-ops until
//!   an exporter is installed

pub mod logging;
pub mod metrics;
