//! Open Graph edge reflector.
//!
//! Fetches the page for an inbound path from a fixed upstream origin, pulls
//! its `og:*` and `theme-color` meta tags out of the streamed HTML, and
//! answers with a minimal page that carries those tags and redirects the
//! browser back to the upstream URL.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reflector;

pub use config::ReflectorConfig;
pub use http::ReflectorServer;
pub use lifecycle::Shutdown;
pub use reflector::{Reflection, Reflector};
