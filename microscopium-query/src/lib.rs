//! # microscopium-query
//!
//! Turns HTTP request parameters into document-database queries for the
//! Microscopium screen browser.
//!
//! This crate provides:
//! - [`QueryParams`], a decoded view of a URL query string that keeps repeated keys
//! - Typed request structs ([`ScreensRequest`], [`SamplesRequest`], ...) validated at construction
//! - [`FindQuery`], the `{collection, filter, projection}` triple handed to a document store
//! - [`Projection`], the field selection derived from repeated `select` parameters
//!
//! ## Example
//!
//! ```rust
//! use microscopium_query::{QueryParams, SamplesRequest};
//!
//! let params = QueryParams::parse(Some("screen=BBBC017&select=neighbours"));
//! let query = SamplesRequest::from_params(&params).unwrap().query();
//!
//! assert_eq!(query.collection, "samples");
//! assert_eq!(query.filter.get_str("screen").unwrap(), "BBBC017");
//! ```
//!
//! Missing required parameters are reported as [`QueryError::MissingParameter`]
//! rather than producing an empty result:
//!
//! ```rust
//! use microscopium_query::{QueryError, QueryParams, SamplesRequest};
//!
//! let err = SamplesRequest::from_params(&QueryParams::default()).unwrap_err();
//! assert!(matches!(err, QueryError::MissingParameter(_)));
//! ```

pub mod error;
pub mod filter;
pub mod logging;
pub mod params;
pub mod projection;
pub mod request;

pub use error::{QueryError, QueryResult};
pub use filter::FilterBuilder;
pub use params::QueryParams;
pub use projection::Projection;
pub use request::{
    FeaturesRequest, FindQuery, ImagesPlan, ImagesRequest, SampleNeighboursRequest,
    SamplesRequest, ScreensRequest, screen_listing,
};

/// Names of the collections the browser reads from.
pub mod collections {
    /// Screening experiments.
    pub const SCREENS: &str = "screens";
    /// Imaged wells/conditions, one per sample.
    pub const SAMPLES: &str = "samples";
    /// Per-screen feature distributions.
    pub const FEATURES: &str = "features";
    /// Binary images keyed by `sample_id`.
    pub const IMAGES: &str = "images";
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::collections;
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::filter::FilterBuilder;
    pub use crate::params::QueryParams;
    pub use crate::projection::Projection;
    pub use crate::request::{
        FeaturesRequest, FindQuery, ImagesPlan, ImagesRequest, SampleNeighboursRequest,
        SamplesRequest, ScreensRequest, screen_listing,
    };
}
