//! Axum routes for the Microscopium screen browser.
//!
//! This crate wires the query builder and the document store into an
//! [Axum](https://github.com/tokio-rs/axum) router.
//!
//! # Features
//!
//! - **JSON query routes**: screens, samples, neighbours, images and features
//!   as extended JSON arrays, at the root and under `/api`
//! - **Pages**: the screen index and per-screen UI shell, behind [`PageRenderer`]
//! - **Minification**: optional HTML minification through [`HtmlMinifier`]
//! - **Health**: `/health` pings the store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use microscopium_axum::{AppState, WebConfig, create_router};
//! use microscopium_mongodb::{MongoClient, MongoConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MongoClient::new(MongoConfig::from_uri(
//!         "mongodb://localhost:27017",
//!         "microscopium",
//!     ))
//!     .await?;
//!
//!     let state = AppState::new(Arc::new(client), WebConfig::default());
//!     let app = create_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod minify;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use microscopium_mongodb::DocumentStore;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use error::{ApiError, ApiResult};
pub use handlers::ExtendedJson;
pub use minify::{HtmlMinifier, WhitespaceMinifier};
pub use pages::{HtmlPages, IndexPage, PageRenderer, ScreenPage};

/// Web-layer settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebConfig {
    /// Minify `text/html` responses.
    pub minify_html: bool,
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Where every query runs.
    pub store: Arc<dyn DocumentStore>,
    /// Renders the HTML pages.
    pub pages: Arc<dyn PageRenderer>,
    /// Applied to HTML when `config.minify_html` is set.
    pub minifier: Arc<dyn HtmlMinifier>,
    /// Web-layer settings.
    pub config: WebConfig,
}

impl AppState {
    /// State with the bundled page renderer and minifier.
    pub fn new(store: Arc<dyn DocumentStore>, config: WebConfig) -> Self {
        Self {
            store,
            pages: Arc::new(HtmlPages),
            minifier: Arc::new(WhitespaceMinifier),
            config,
        }
    }

    /// Replace the page renderer.
    pub fn with_pages(mut self, pages: Arc<dyn PageRenderer>) -> Self {
        self.pages = pages;
        self
    }

    /// Replace the HTML minifier.
    pub fn with_minifier(mut self, minifier: Arc<dyn HtmlMinifier>) -> Self {
        self.minifier = minifier;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Query-string JSON routes, served at the root and under `/api`.
fn query_routes() -> Router<AppState> {
    Router::new()
        .route("/screens", get(handlers::list_screens))
        .route("/screens/{id}", get(handlers::get_screen))
        .route("/samples", get(handlers::list_samples))
        .route("/samples/{screen}/neighbours", get(handlers::screen_neighbours))
        .route("/samples/{screen}/{id}/neighbours", get(handlers::sample_neighbours))
        .route("/images", get(handlers::list_images))
        .route("/features", get(handlers::list_features))
}

/// Path-style JSON routes, served under `/api` only.
fn path_routes() -> Router<AppState> {
    Router::new()
        .route("/{screen_id}/samples", get(handlers::screen_samples))
        .route("/{screen_id}/samples/{sample_id}", get(handlers::screen_sample))
        .route(
            "/{screen_id}/samples/{sample_id}/neighbours",
            get(handlers::sample_neighbours),
        )
        .route(
            "/{screen_id}/samples/{sample_id}/images",
            get(handlers::sample_images),
        )
        .route(
            "/{screen_id}/samples/{sample_id}/images/neighbours",
            get(handlers::sample_neighbour_images),
        )
        .route(
            "/{screen_id}/features/{feature}",
            get(handlers::screen_feature),
        )
}

/// Build the application router.
///
/// Middleware (outermost first): request logging, then HTML minification.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/{screen_id}", get(pages::load_screen))
        .route("/health", get(handlers::health))
        .merge(query_routes())
        .nest("/api", query_routes().merge(path_routes()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            minify::minify_html,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ApiError, ApiResult, AppState, ExtendedJson, HtmlMinifier, HtmlPages, PageRenderer,
        WebConfig, WhitespaceMinifier, create_router,
    };
    pub use microscopium_mongodb::prelude::*;
    pub use microscopium_query::prelude::*;
}
