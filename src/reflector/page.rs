//! Redirect page synthesis.

use crate::config::PageConfig;
use crate::reflector::types::PageMetadata;

/// Fixed redirect-page template.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    image_origin: String,
    site_name: String,
    twitter_card: String,
}

impl PageTemplate {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            image_origin: config.image_origin.trim_end_matches('/').to_string(),
            site_name: config.site_name.clone(),
            twitter_card: config.twitter_card.clone(),
        }
    }

    /// Render the page for `path`, pointing crawlers and browsers at `upstream_url`.
    ///
    /// Output depends only on the arguments, so identical inputs render
    /// byte-identical pages.
    pub fn render(&self, meta: &PageMetadata, upstream_url: &str, path: &str) -> String {
        let image_url = format!("{}{}", self.image_origin, path);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta name="theme-color" content="{theme_color}">
    <meta name="twitter:card" content="{twitter_card}">
    <meta property="og:site_name" content="{site_name}">
    <meta property="og:type" content="{og_type}">
    <meta property="og:title" content="{og_title}">
    <meta property="og:description" content="{og_description}">
    <meta property="og:url" content="{og_url}">
    <meta property="og:image" content="{og_image}">
</head>
<body>
    <p>Redirecting...</p>
    <script>
        window.location.href = {redirect_target};
    </script>
</body>
</html>
"#,
            theme_color = escape_attribute(&meta.theme_color),
            twitter_card = escape_attribute(&self.twitter_card),
            site_name = escape_attribute(&self.site_name),
            og_type = escape_attribute(&meta.og_type),
            og_title = escape_attribute(&meta.og_title),
            og_description = escape_attribute(&meta.og_description),
            og_url = escape_attribute(upstream_url),
            og_image = escape_attribute(&image_url),
            redirect_target = script_string(upstream_url),
        )
    }
}

/// Escape a value for a double-quoted attribute.
///
/// Captured values are already in source form, so `&` is left alone to keep
/// existing character references intact.
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A JavaScript string literal that cannot close the surrounding script element.
fn script_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> PageTemplate {
        PageTemplate::new(&PageConfig::default())
    }

    fn meta() -> PageMetadata {
        PageMetadata {
            og_type: "article".into(),
            og_title: "Example".into(),
            og_description: "Desc".into(),
            theme_color: "#55C500".into(),
        }
    }

    #[test]
    fn renders_every_tag() {
        let page = template().render(
            &meta(),
            "https://qiita.com/items/abc123",
            "/items/abc123",
        );

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r##"<meta name="theme-color" content="#55C500">"##));
        assert!(page.contains(r#"<meta name="twitter:card" content="summary_large_image">"#));
        assert!(page.contains(r#"<meta property="og:site_name" content="Qiita">"#));
        assert!(page.contains(r#"<meta property="og:type" content="article">"#));
        assert!(page.contains(r#"<meta property="og:title" content="Example">"#));
        assert!(page.contains(r#"<meta property="og:description" content="Desc">"#));
        assert!(page.contains(
            r#"<meta property="og:url" content="https://qiita.com/items/abc123">"#
        ));
        assert!(page.contains(
            r#"<meta property="og:image" content="https://qiita-ogpimage-getter.hihimamu.workers.dev/items/abc123">"#
        ));
        assert!(page.contains("<p>Redirecting...</p>"));
        assert!(page.contains(r#"window.location.href = "https://qiita.com/items/abc123";"#));
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = template().render(&meta(), "https://qiita.com/x", "/x");
        let b = template().render(&meta(), "https://qiita.com/x", "/x");
        assert_eq!(a, b);
    }

    #[test]
    fn quotes_and_brackets_are_escaped() {
        let mut meta = meta();
        meta.og_title = r#"Say "hi" <b>"#.into();
        meta.og_description = "Tom &amp; Jerry".into();
        let page = template().render(&meta, "https://qiita.com/x", "/x");

        assert!(page.contains(r#"content="Say &quot;hi&quot; &lt;b&gt;""#));
        assert!(page.contains(r#"content="Tom &amp; Jerry""#));
    }

    #[test]
    fn script_target_cannot_break_out() {
        assert_eq!(
            script_string("https://a/</script>"),
            r#""https://a/\u003c/script>""#
        );
        assert_eq!(script_string(r#"https://a/"x"#), r#""https://a/\"x""#);
    }
}
