//! HTML response minification.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::AppState;
use crate::error::ApiError;

/// The content type of responses that get minified.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Shrinks an HTML document.
pub trait HtmlMinifier: Send + Sync {
    /// Minified copy of `html`.
    fn minify(&self, html: &str) -> String;
}

/// Drops comments and redundant whitespace.
///
/// Whitespace runs, including those between two tags, collapse to one
/// space, and leading and trailing whitespace is dropped. Quoted attribute
/// values and the contents of `<pre>`, `<textarea>`, `<script>` and
/// `<style>` are copied untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceMinifier;

const RAW_TAGS: [&str; 4] = ["pre", "textarea", "script", "style"];

impl HtmlMinifier for WhitespaceMinifier {
    fn minify(&self, html: &str) -> String {
        // ASCII lowercasing keeps byte offsets, so `lower` indexes like `html`.
        let lower = html.to_ascii_lowercase();
        let mut out = String::with_capacity(html.len());
        let mut pos = 0;

        while let Some(c) = html[pos..].chars().next() {
            let rest = &html[pos..];

            if rest.starts_with("<!--") {
                pos = rest[4..].find("-->").map_or(html.len(), |end| pos + 4 + end + 3);
                continue;
            }

            if let Some(tag) = raw_tag(rest) {
                let end = raw_block_end(&lower, pos, tag);
                out.push_str(&html[pos..end]);
                pos = end;
                continue;
            }

            if is_tag_start(rest) {
                let end = tag_end(rest);
                push_tag(&mut out, &rest[..end]);
                pos += end;
                continue;
            }

            if c.is_whitespace() {
                let trimmed = rest.trim_start();
                pos += rest.len() - trimmed.len();
                if !out.is_empty() && !trimmed.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                continue;
            }

            out.push(c);
            pos += c.len_utf8();
        }

        out
    }
}

/// Whether `html` starts with a tag, closing tag or declaration.
fn is_tag_start(html: &str) -> bool {
    let mut chars = html.chars();
    chars.next() == Some('<')
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

/// Byte length of the tag starting `html`, up to and including its `>`.
fn tag_end(html: &str) -> usize {
    let mut quote = None;
    for (i, b) in html.bytes().enumerate().skip(1) {
        match (quote, b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return i + 1,
            (None, _) => {}
        }
    }
    html.len()
}

/// Append a tag with whitespace between attributes collapsed.
fn push_tag(out: &mut String, tag: &str) {
    let mut quote = None;
    let mut pending_space = false;
    for c in tag.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && c != '>' {
            out.push(' ');
        }
        pending_space = false;
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        out.push(c);
    }
}

/// The raw-content tag opening at the start of `html`, if any.
fn raw_tag(html: &str) -> Option<&'static str> {
    if !html.starts_with('<') {
        return None;
    }
    RAW_TAGS.into_iter().find(|tag| {
        let name_end = 1 + tag.len();
        let name_matches = html
            .get(1..name_end)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag));
        let boundary = matches!(
            html.as_bytes().get(name_end),
            Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r')
        );
        name_matches && boundary
    })
}

/// Byte offset just past the closing tag of the raw block opening at
/// `start`, searched in the lowercased document.
fn raw_block_end(lower: &str, start: usize, tag: &str) -> usize {
    let closing = format!("</{}", tag);
    lower[start..]
        .find(&closing)
        .map(|offset| start + offset)
        .and_then(|close| lower[close..].find('>').map(|gt| close + gt + 1))
        .unwrap_or(lower.len())
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case(HTML_CONTENT_TYPE))
}

/// Middleware minifying HTML responses when `minify_html` is on.
pub async fn minify_html(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if !state.config.minify_html || !is_html(response.headers()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(error = %err, "Failed to read HTML response body");
            return ApiError::Internal("Failed to render page.".to_string()).into_response();
        }
    };

    let html = String::from_utf8_lossy(&bytes);
    let minified = state.minifier.minify(&html);
    debug!(before = bytes.len(), after = minified.len(), "Minified HTML response");

    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(minified.len()));
    Response::from_parts(parts, Body::from(minified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minify(html: &str) -> String {
        WhitespaceMinifier.minify(html)
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(
            minify("<html>\n  <body>\n    <p>Hello,\n      world</p>\n  </body>\n</html>\n"),
            "<html> <body> <p>Hello, world</p> </body> </html>"
        );
    }

    #[test]
    fn test_keeps_space_between_inline_elements() {
        assert_eq!(
            minify("<p><b>Hello</b> <i>world</i></p>"),
            "<p><b>Hello</b> <i>world</i></p>"
        );
        assert_eq!(
            minify("<li><a href=\"/BBBC017\">Mitochondria</a>\n   <span>GFP screen</span></li>"),
            "<li><a href=\"/BBBC017\">Mitochondria</a> <span>GFP screen</span></li>"
        );
    }

    #[test]
    fn test_attribute_values_verbatim() {
        assert_eq!(minify(r#"<div title="a    b">x</div>"#), r#"<div title="a    b">x</div>"#);
        assert_eq!(
            minify("<div\n   title='x  > y'\n   class=\"c\"  >z</div>"),
            "<div title='x  > y' class=\"c\">z</div>"
        );
    }

    #[test]
    fn test_text_angle_bracket() {
        assert_eq!(minify("<p>1  <  2</p>"), "<p>1 < 2</p>");
    }

    #[test]
    fn test_drops_comments() {
        assert_eq!(minify("<p>a <!-- note --> b</p><!-- end -->"), "<p>a b</p>");
        assert_eq!(minify("<p>a</p><!-- unterminated"), "<p>a</p>");
    }

    #[test]
    fn test_keeps_raw_blocks() {
        let html = "<div>\n  <pre>  keep\n   this </pre>\n  <script>\n var x = 1;  </script>\n</div>";
        assert_eq!(
            minify(html),
            "<div> <pre>  keep\n   this </pre> <script>\n var x = 1;  </script> </div>"
        );
        assert_eq!(
            minify("<STYLE>\n a { }\n</Style>\n<p> x </p>"),
            "<STYLE>\n a { }\n</Style> <p> x </p>"
        );
    }

    #[test]
    fn test_raw_tag_detection() {
        assert_eq!(raw_tag("<PRE class=\"x\">"), Some("pre"));
        assert_eq!(raw_tag("<style>"), Some("style"));
        assert_eq!(raw_tag("<prefix>"), None);
        assert_eq!(raw_tag("<p>"), None);
    }

    #[test]
    fn test_unicode_text() {
        assert_eq!(minify("<p>  café   ünïcode  </p>"), "<p> café ünïcode </p>");
    }

    #[test]
    fn test_is_html() {
        let mut headers = HeaderMap::new();
        assert!(!is_html(&headers));
        headers.insert(header::CONTENT_TYPE, HTML_CONTENT_TYPE.parse().unwrap());
        assert!(is_html(&headers));
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(!is_html(&headers));
    }
}
