//! Shared utilities for integration tests.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use og_reflector::config::ReflectorConfig;
use og_reflector::ReflectorServer;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An upstream article page carrying every tracked tag.
pub const ARTICLE: &str = r##"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="utf-8">
  <title>Example - Qiita</title>
  <meta name="theme-color" content="#55C500">
  <meta property="og:type" content="article">
  <meta property="og:title" content="Example">
  <meta property="og:description" content="Desc">
  <meta property="og:url" content="https://qiita.com/items/abc123">
  <script>window.__STATE__ = "<meta property=\"og:title\" content=\"bogus\">";</script>
</head>
<body><article><p>Body text</p></article></body>
</html>"##;

/// Config pointing the reflector at `upstream`.
pub fn config_for(upstream: &MockServer) -> ReflectorConfig {
    let mut config = ReflectorConfig::default();
    config.upstream.origin = upstream.uri();
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

/// Build the router for `upstream`.
pub fn router_for(upstream: &MockServer) -> Router {
    ReflectorServer::new(config_for(upstream))
        .expect("server builds")
        .router()
}

/// Serve `body` with `status` at `route` on `upstream`.
pub async fn mount_page(upstream: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(upstream)
        .await;
}

/// Send a GET for `uri` through `router`.
pub async fn get(router: Router, uri: &str) -> Response<Body> {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

/// Send `request` through `router`.
pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
