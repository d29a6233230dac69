//! # Microscopium
//!
//! Browse high-content microscopy screening data stored in MongoDB.
//!
//! Microscopium provides:
//! - Read-only JSON query endpoints for screens, samples, features and images
//! - Query building from URL parameters with strict validation
//! - Extended JSON responses that keep binary image data intact
//! - A screen index page and per-screen UI shell
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use microscopium::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MongoClient::new(MongoConfig::from_uri(
//!         "mongodb://localhost:27017",
//!         "microscopium",
//!     ))
//!     .await?;
//!
//!     let app = create_router(AppState::new(Arc::new(client), WebConfig::default()));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! Queries can also be run without the web layer:
//!
//! ```rust
//! use microscopium::prelude::*;
//!
//! let params = QueryParams::parse(Some("sample_id=s1&neighbours=true"));
//! let request = ImagesRequest::from_params(&params).unwrap();
//! assert!(matches!(request.plan(), ImagesPlan::ViaNeighbours { .. }));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Request parsing and filter/projection building.
pub mod query {
    pub use microscopium_query::*;
}

/// Document stores and extended JSON.
pub mod store {
    pub use microscopium_mongodb::*;
}

/// Routes, pages and middleware.
pub mod web {
    pub use microscopium_axum::*;
}

pub use microscopium_query::logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use microscopium_axum::prelude::*;
}

// Re-export key types at the crate root
pub use microscopium_axum::{AppState, WebConfig, create_router};
pub use microscopium_mongodb::{DocumentStore, MemoryStore, MongoClient, MongoConfig};
pub use microscopium_query::{FindQuery, QueryError, QueryParams};
