//! HTML pages: the screen index and the per-screen UI shell.

use axum::extract::{Path, RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use bson::{Bson, Document, doc};
use microscopium_mongodb::document::DocumentExt;
use microscopium_query::{QueryParams, collections, screen_listing};
use tracing::{debug, info};
use url::form_urlencoded;

use crate::AppState;
use crate::error::ApiResult;

/// Data for the index page.
#[derive(Debug, Clone, Copy)]
pub struct IndexPage<'a> {
    /// Screens to list, without `screen_features`.
    pub screens: &'a [Document],
    /// Id of a screen a previous request failed to find.
    pub missing: Option<&'a str>,
}

/// Data for a screen's UI page.
#[derive(Debug, Clone, Copy)]
pub struct ScreenPage<'a> {
    /// The screen being browsed.
    pub screen_id: &'a str,
    /// The screen's `available_overlays`, if it has any.
    pub overlays: Option<&'a Bson>,
    /// Screens for navigation, without `screen_features`.
    pub screens: &'a [Document],
}

/// Turns page data into HTML.
pub trait PageRenderer: Send + Sync {
    /// The screen index.
    fn index(&self, page: &IndexPage<'_>) -> String;

    /// A screen's UI shell.
    fn screen(&self, page: &ScreenPage<'_>) -> String;
}

/// The bundled renderer: plain, escaped HTML.
///
/// The screen page exposes `SCREEN_ID` and `OVERLAYS` to scripts; the client
/// UI is expected to load from `/static/js/script.js`.
#[derive(Debug, Clone, Default)]
pub struct HtmlPages;

impl HtmlPages {
    fn head(title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>{}</title>\n</head>\n",
            escape_html(title)
        )
    }

    fn screen_list(screens: &[Document]) -> String {
        let mut html = String::from("  <ul class=\"screens\">\n");
        for screen in screens {
            let Some(id) = screen.id_string() else {
                continue;
            };
            let name = screen.get_str_opt("name").unwrap_or(&id);
            html.push_str(&format!(
                "    <li><a href=\"/{}\">{}</a>",
                escape_html(&encode_segment(&id)),
                escape_html(name)
            ));
            if let Some(description) = screen.get_str_opt("description") {
                html.push_str(&format!(" <span>{}</span>", escape_html(description)));
            }
            html.push_str("</li>\n");
        }
        html.push_str("  </ul>\n");
        html
    }
}

impl PageRenderer for HtmlPages {
    fn index(&self, page: &IndexPage<'_>) -> String {
        let mut html = Self::head("Microscopium");
        html.push_str("<body>\n  <h1>Microscopium</h1>\n");
        if let Some(missing) = page.missing {
            html.push_str(&format!(
                "  <p class=\"flash\">Unable to find screen {}.</p>\n",
                escape_html(missing)
            ));
        }
        html.push_str(&Self::screen_list(page.screens));
        html.push_str("</body>\n</html>\n");
        html
    }

    fn screen(&self, page: &ScreenPage<'_>) -> String {
        let overlays = page
            .overlays
            .cloned()
            .map(Bson::into_relaxed_extjson)
            .unwrap_or(serde_json::Value::Null);

        let mut html = Self::head(&format!("Microscopium: {}", page.screen_id));
        html.push_str("<body>\n  <nav>\n");
        html.push_str(&Self::screen_list(page.screens));
        html.push_str("  </nav>\n  <div id=\"ui\"></div>\n  <script>\n");
        html.push_str(&format!(
            "    var SCREEN_ID = {};\n    var OVERLAYS = {};\n",
            script_json(&serde_json::Value::from(page.screen_id)),
            script_json(&overlays)
        ));
        html.push_str("  </script>\n  <script src=\"/static/js/script.js\"></script>\n");
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Escape text for an HTML body or attribute value.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// JSON safe to place inside a `<script>` element.
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Percent-encode one path segment.
fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// `GET /`
pub async fn index(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<Html<String>> {
    let params = QueryParams::parse(query.as_deref());
    let screens = state.store.find_query(&screen_listing()).await?;

    let page = IndexPage {
        screens: &screens,
        missing: params.get("missing"),
    };
    Ok(Html(state.pages.index(&page)))
}

/// `GET /{screen_id}`
///
/// Unknown screens redirect to the index with `?missing=<id>`.
pub async fn load_screen(
    State(state): State<AppState>,
    Path(screen_id): Path<String>,
) -> ApiResult<Response> {
    let Some(screen) = state
        .store
        .find_one(collections::SCREENS, doc! { "_id": screen_id.as_str() })
        .await?
    else {
        info!(screen_id = %screen_id, "Screen not found, redirecting to index");
        let location = format!(
            "/?{}",
            form_urlencoded::Serializer::new(String::new())
                .append_pair("missing", &screen_id)
                .finish()
        );
        return Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
    };

    let screens = state.store.find_query(&screen_listing()).await?;
    debug!(screen_id = %screen_id, screens = screens.len(), "Rendering screen page");

    let page = ScreenPage {
        screen_id: &screen_id,
        overlays: screen.get("available_overlays"),
        screens: &screens,
    };
    Ok(Html(state.pages.screen(&page)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screens() -> Vec<Document> {
        vec![
            doc! { "_id": "BBBC017", "name": "Mitochondria", "description": "GFP <screen>" },
            doc! { "_id": "my screen", "no_samples": 3 },
        ]
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_index_lists_screens() {
        let screens = screens();
        let html = HtmlPages.index(&IndexPage {
            screens: &screens,
            missing: None,
        });

        assert!(html.contains(r#"<a href="/BBBC017">Mitochondria</a>"#));
        assert!(html.contains("GFP &lt;screen&gt;"));
        assert!(html.contains(r#"<a href="/my%20screen">my screen</a>"#));
        assert!(!html.contains("Unable to find"));
    }

    #[test]
    fn test_index_flash_message() {
        let html = HtmlPages.index(&IndexPage {
            screens: &[],
            missing: Some("<nope>"),
        });
        assert!(html.contains("Unable to find screen &lt;nope&gt;."));
    }

    #[test]
    fn test_screen_page_variables() {
        let overlays = Bson::Document(doc! { "treatment": ["dmso", "</script>"] });
        let html = HtmlPages.screen(&ScreenPage {
            screen_id: "BBBC017",
            overlays: Some(&overlays),
            screens: &screens(),
        });

        assert!(html.contains(r#"var SCREEN_ID = "BBBC017";"#));
        assert!(html.contains(r#"var OVERLAYS = {"treatment":["dmso","<\/script>"]};"#));
        assert!(html.contains("Mitochondria"));
    }

    #[test]
    fn test_screen_page_without_overlays() {
        let html = HtmlPages.screen(&ScreenPage {
            screen_id: "BBBC017",
            overlays: None,
            screens: &[],
        });
        assert!(html.contains("var OVERLAYS = null;"));
    }
}
