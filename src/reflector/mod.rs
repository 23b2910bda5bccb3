//! Reflection subsystem.
//!
//! # Data Flow
//! ```text
//! inbound path
//!     → upstream URL (origin + path, query dropped)
//!     → upstream.rs (GET, redirects followed)
//!     → status triage (non-2xx short-circuits, body never read)
//!     → scanner.rs (stream body, capture og:* and theme-color)
//!     → completeness check (any slot missing → 404)
//!     → page.rs (redirect page)
//! ```
//!
//! # Design Decisions
//! - One `Reflector` is shared by all requests; it holds only immutable
//!   values, so every request's state lives in locals of `reflect`
//! - Exactly one upstream call per request, no retries
//! - Transport failures surface as `ReflectError`; the HTTP layer decides
//!   how to answer them

pub mod page;
pub mod scanner;
pub mod types;
pub mod upstream;

pub use page::PageTemplate;
pub use scanner::{
    scan_body, scan_document, MetaScanner, CAPTURE_RULES, DEFAULT_SCAN_MEMORY_LIMIT,
};
pub use types::{Field, MetadataRecord, PageMetadata, ReflectError, ReflectResult, Reflection};
pub use upstream::{HttpUpstream, Upstream, UpstreamBody, UpstreamResponse};

/// Reflects upstream pages as Open Graph redirect pages.
#[derive(Debug)]
pub struct Reflector<U> {
    upstream: U,
    origin: String,
    page: PageTemplate,
    scan_memory_limit: usize,
}

impl<U: Upstream> Reflector<U> {
    /// Create a reflector for `origin` (scheme and host, e.g. `https://qiita.com`).
    pub fn new(upstream: U, origin: &str, page: PageTemplate) -> Self {
        Self {
            upstream,
            origin: origin.trim_end_matches('/').to_string(),
            page,
            scan_memory_limit: DEFAULT_SCAN_MEMORY_LIMIT,
        }
    }

    /// Cap the markup the scanner may buffer per body.
    pub fn with_scan_memory_limit(mut self, bytes: usize) -> Self {
        self.scan_memory_limit = bytes;
        self
    }

    /// The upstream URL for an inbound path. The path is appended verbatim.
    pub fn upstream_url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Handle one inbound path.
    pub async fn reflect(&self, path: &str) -> ReflectResult<Reflection> {
        let upstream_url = self.upstream_url(path);
        let response = self.upstream.fetch(&upstream_url).await?;

        if !response.status.is_success() {
            tracing::debug!(
                upstream_url = %upstream_url,
                status = response.status.as_u16(),
                "Upstream returned non-success status"
            );
            return Ok(Reflection::UpstreamStatus(response.status));
        }

        let record = scan_body(response.body, self.scan_memory_limit).await?;
        let Some(meta) = record.into_complete() else {
            tracing::debug!(upstream_url = %upstream_url, "Upstream page lacks required metadata");
            return Ok(Reflection::IncompleteMetadata);
        };

        Ok(Reflection::Page(self.page.render(&meta, &upstream_url, path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use axum::http::StatusCode;
    use bytes::Bytes;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory origin serving one canned response and recording what was asked.
    struct FakeUpstream {
        status: StatusCode,
        chunks: Vec<&'static str>,
        body_polled: Arc<AtomicBool>,
        requested: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeUpstream {
        fn new(status: u16, chunks: Vec<&'static str>) -> Self {
            Self {
                status: StatusCode::from_u16(status).unwrap(),
                chunks,
                body_polled: Arc::new(AtomicBool::new(false)),
                requested: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    struct FakeBody {
        chunks: VecDeque<Bytes>,
        polled: Arc<AtomicBool>,
    }

    impl UpstreamBody for FakeBody {
        async fn next_chunk(&mut self) -> ReflectResult<Option<Bytes>> {
            self.polled.store(true, Ordering::SeqCst);
            Ok(self.chunks.pop_front())
        }
    }

    impl Upstream for FakeUpstream {
        type Body = FakeBody;

        async fn fetch(&self, url: &str) -> ReflectResult<UpstreamResponse<FakeBody>> {
            self.requested.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(ReflectError::Upstream {
                    url: url.to_string(),
                    reason: "connection refused".into(),
                });
            }
            Ok(UpstreamResponse {
                status: self.status,
                body: FakeBody {
                    chunks: self.chunks.iter().copied().map(|c| Bytes::from_static(c.as_bytes())).collect(),
                    polled: self.body_polled.clone(),
                },
            })
        }
    }

    const HEAD: &str = r##"<html><head>
<meta property="og:type" content="article">
<meta property="og:title" content="Example">
<meta property="og:description" content="Desc">
<meta name="theme-color" content="#55C500">
</head><body></body></html>"##;

    fn reflector(upstream: FakeUpstream) -> Reflector<FakeUpstream> {
        Reflector::new(
            upstream,
            "https://qiita.com",
            PageTemplate::new(&PageConfig::default()),
        )
    }

    #[test]
    fn upstream_url_appends_path_verbatim() {
        let r = reflector(FakeUpstream::new(200, vec![]));
        assert_eq!(r.upstream_url("/items/abc123"), "https://qiita.com/items/abc123");
        assert_eq!(r.upstream_url("/"), "https://qiita.com/");
        assert_eq!(r.upstream_url("/a//b/"), "https://qiita.com/a//b/");
        assert_eq!(r.upstream_url("/%E3%81%82"), "https://qiita.com/%E3%81%82");
    }

    #[test]
    fn trailing_slash_on_origin_is_dropped() {
        let r = Reflector::new(
            FakeUpstream::new(200, vec![]),
            "http://127.0.0.1:3000/",
            PageTemplate::new(&PageConfig::default()),
        );
        assert_eq!(r.upstream_url("/x"), "http://127.0.0.1:3000/x");
    }

    #[tokio::test]
    async fn error_statuses_do_not_read_body() {
        for status in [400, 401, 403, 404, 500, 503] {
            let upstream = FakeUpstream::new(status, vec![HEAD]);
            let polled = upstream.body_polled.clone();
            let r = reflector(upstream);

            let reflection = r.reflect("/items/abc123").await.unwrap();
            assert_eq!(
                reflection,
                Reflection::UpstreamStatus(StatusCode::from_u16(status).unwrap())
            );
            assert!(!polled.load(Ordering::SeqCst), "body read for {status}");
        }
    }

    #[tokio::test]
    async fn success_renders_page() {
        let upstream = FakeUpstream::new(200, vec![&HEAD[..40], &HEAD[40..]]);
        let polled = upstream.body_polled.clone();
        let r = reflector(upstream);

        let Reflection::Page(page) = r.reflect("/items/abc123").await.unwrap() else {
            panic!("expected a page");
        };
        assert!(polled.load(Ordering::SeqCst));
        assert!(page.contains(r#"content="article""#));
        assert!(page.contains(r#"content="Example""#));
        assert!(page.contains(r#"content="Desc""#));
        assert!(page.contains(r##"content="#55C500""##));
        assert!(page.contains(r#"<meta property="og:url" content="https://qiita.com/items/abc123">"#));
        assert!(page.contains(r#"window.location.href = "https://qiita.com/items/abc123";"#));
        assert_eq!(
            *r.upstream.requested.lock().unwrap(),
            vec!["https://qiita.com/items/abc123".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_tag_is_incomplete() {
        let r = reflector(FakeUpstream::new(
            200,
            vec![r#"<meta property="og:type" content="article"><meta property="og:title" content="T">"#],
        ));
        assert_eq!(r.reflect("/x").await.unwrap(), Reflection::IncompleteMetadata);
    }

    #[tokio::test]
    async fn same_input_same_output() {
        let r = reflector(FakeUpstream::new(200, vec![HEAD]));
        let first = r.reflect("/items/abc123").await.unwrap();
        let second = r.reflect("/items/abc123").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let mut upstream = FakeUpstream::new(200, vec![HEAD]);
        upstream.fail = true;
        let r = reflector(upstream);
        let err = r.reflect("/x").await.unwrap_err();
        assert!(matches!(err, ReflectError::Upstream { ref url, .. } if url == "https://qiita.com/x"));
    }

    #[tokio::test]
    async fn oversized_markup_is_a_scan_error() {
        let huge: &'static str = Box::leak(
            format!(r#"<meta property="og:title" content="{}">"#, "a".repeat(64 * 1024)).into_boxed_str(),
        );
        let r = reflector(FakeUpstream::new(200, vec![huge, HEAD])).with_scan_memory_limit(8 * 1024);
        let err = r.reflect("/x").await.unwrap_err();
        assert!(matches!(err, ReflectError::Scan(_)), "{err:?}");
    }
}
