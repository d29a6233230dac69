//! # microscopium-mongodb
//!
//! Read-only document storage for the Microscopium screen browser.
//!
//! This crate provides:
//! - Connection management with the official MongoDB driver (pooling is built-in)
//! - The [`DocumentStore`] trait the web layer queries through
//! - [`MemoryStore`], an in-process store for tests and demos
//! - Extended JSON rendering of query results, keeping binary image data intact
//!
//! ## Example
//!
//! ```rust,ignore
//! use microscopium_mongodb::{DocumentStore, MongoClient, MongoConfig};
//! use microscopium_query::{QueryParams, ScreensRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MongoClient::new(MongoConfig::from_uri(
//!         "mongodb://localhost:27017",
//!         "microscopium",
//!     ))
//!     .await?;
//!
//!     let query = ScreensRequest::from_params(&QueryParams::default()).query();
//!     let screens = client.find_query(&query).await?;
//!     println!("{}", microscopium_mongodb::extjson::to_extended_json(&screens)?);
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod extjson;
pub mod memory;
pub mod store;

pub use bson::{Bson, Document, doc};
pub use client::MongoClient;
pub use config::{MongoConfig, MongoConfigBuilder};
pub use error::{MongoError, MongoResult};
pub use memory::MemoryStore;
pub use store::DocumentStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::MongoClient;
    pub use crate::config::{MongoConfig, MongoConfigBuilder};
    pub use crate::document::DocumentExt;
    pub use crate::error::{MongoError, MongoResult};
    pub use crate::extjson::{from_extended_json, to_extended_json};
    pub use crate::memory::MemoryStore;
    pub use crate::store::DocumentStore;
    pub use bson::{Bson, Document, doc};
}
