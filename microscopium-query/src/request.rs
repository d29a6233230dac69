//! Typed requests and the queries they translate to.
//!
//! Each request type is built either from a decoded query string
//! (`from_params`, which enforces required parameters) or from path segments
//! captured by the router (`new`/`by_id`, where the router already guarantees
//! presence). Once built, a request maps to a [`FindQuery`] without further
//! validation.

use bson::{Bson, Document};

use crate::collections::{FEATURES, IMAGES, SAMPLES, SCREENS};
use crate::error::{QueryError, QueryResult};
use crate::filter::{self, FilterBuilder};
use crate::params::QueryParams;
use crate::projection::Projection;

/// A `find` against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    /// Collection name.
    pub collection: &'static str,
    /// Filter document; empty matches everything.
    pub filter: Document,
    /// Fields to return.
    pub projection: Projection,
}

impl FindQuery {
    /// Create a new query.
    pub fn new(collection: &'static str, filter: Document, projection: Projection) -> Self {
        Self {
            collection,
            filter,
            projection,
        }
    }

    /// The projection document, or `None` for all fields.
    pub fn projection_document(&self) -> Option<Document> {
        self.projection.to_document()
    }
}

/// Screens, optionally narrowed to one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreensRequest {
    /// Screen `_id`, or every screen when unset.
    pub id: Option<String>,
    /// Fields to return.
    pub projection: Projection,
}

impl ScreensRequest {
    /// `?id=&select=...`; nothing is required.
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            id: params.string("id"),
            projection: Projection::from_select(params.select()),
        }
    }

    /// One screen by id, with `select` taken from the query string.
    pub fn by_id(id: impl Into<String>, params: &QueryParams) -> Self {
        Self {
            id: Some(id.into()),
            projection: Projection::from_select(params.select()),
        }
    }

    /// The `screens` query.
    pub fn query(&self) -> FindQuery {
        let filter = FilterBuilder::new().eq_opt("_id", self.id.as_deref()).build();
        FindQuery::new(SCREENS, filter, self.projection.clone())
    }
}

/// Samples of a screen and/or a single sample by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplesRequest {
    /// Owning screen.
    pub screen: Option<String>,
    /// Sample `_id`.
    pub id: Option<String>,
    /// Fields to return.
    pub projection: Projection,
}

impl SamplesRequest {
    /// `?screen=&id=&select=...`; at least one of `screen` and `id` is required.
    pub fn from_params(params: &QueryParams) -> QueryResult<Self> {
        let screen = params.string("screen");
        let id = params.string("id");
        if screen.is_none() && id.is_none() {
            return Err(QueryError::missing(
                "A screen or id parameter must be supplied with this request.",
            ));
        }
        Ok(Self {
            screen,
            id,
            projection: Projection::from_select(params.select()),
        })
    }

    /// Samples of `screen`, optionally a single one.
    pub fn in_screen(screen: impl Into<String>, id: Option<String>, params: &QueryParams) -> Self {
        Self {
            screen: Some(screen.into()),
            id,
            projection: Projection::from_select(params.select()),
        }
    }

    /// The `samples` query.
    pub fn query(&self) -> FindQuery {
        let filter = FilterBuilder::new()
            .eq_opt("screen", self.screen.as_deref())
            .eq_opt("_id", self.id.as_deref())
            .build();
        FindQuery::new(SAMPLES, filter, self.projection.clone())
    }
}

/// The `neighbours` lists of a screen's samples, or of one sample.
///
/// The projection is fixed: only `neighbours`, without `_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleNeighboursRequest {
    /// Owning screen.
    pub screen: String,
    /// One sample, or the whole screen when unset.
    pub id: Option<String>,
}

impl SampleNeighboursRequest {
    /// Neighbours of `id` in `screen`, or of every sample in it.
    pub fn new(screen: impl Into<String>, id: Option<String>) -> Self {
        Self {
            screen: screen.into(),
            id,
        }
    }

    /// The `samples` query projecting `neighbours` only.
    pub fn query(&self) -> FindQuery {
        let filter = FilterBuilder::new()
            .eq("screen", self.screen.as_str())
            .eq_opt("_id", self.id.as_deref())
            .build();
        FindQuery::new(SAMPLES, filter, Projection::neighbours_only())
    }
}

/// The distribution of one feature within a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturesRequest {
    /// Owning screen.
    pub screen: String,
    /// Matched against `feature_name`.
    pub feature: String,
    /// Fields to return.
    pub projection: Projection,
}

impl FeaturesRequest {
    /// `?screen=&feature=&select=...`; both are required.
    ///
    /// `feature_name` is accepted in place of `feature`.
    pub fn from_params(params: &QueryParams) -> QueryResult<Self> {
        let screen = params.string("screen");
        let feature = params
            .get_any(&["feature", "feature_name"])
            .map(str::to_string);
        match (screen, feature) {
            (Some(screen), Some(feature)) => Ok(Self {
                screen,
                feature,
                projection: Projection::from_select(params.select()),
            }),
            _ => Err(QueryError::missing(
                "A screen and feature parameter must be supplied with this request.",
            )),
        }
    }

    /// `feature` of `screen`, with `select` taken from the query string.
    pub fn new(
        screen: impl Into<String>,
        feature: impl Into<String>,
        params: &QueryParams,
    ) -> Self {
        Self {
            screen: screen.into(),
            feature: feature.into(),
            projection: Projection::from_select(params.select()),
        }
    }

    /// The `features` query.
    pub fn query(&self) -> FindQuery {
        let filter = FilterBuilder::new()
            .eq("screen", self.screen.as_str())
            .eq("feature_name", self.feature.as_str())
            .build();
        FindQuery::new(FEATURES, filter, self.projection.clone())
    }
}

/// Images of a sample, or of the sample's nearest neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagesRequest {
    /// The sample whose images, or whose neighbours' images, are wanted.
    pub sample_id: String,
    /// Return the neighbours' images instead.
    pub neighbours: bool,
    /// Fields to return.
    pub projection: Projection,
}

/// How an [`ImagesRequest`] is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagesPlan {
    /// A single images query.
    Direct(FindQuery),
    /// Resolve the sample's `neighbours` with `lookup` first, then query
    /// images with [`ImagesRequest::neighbour_images`] and `projection`.
    ViaNeighbours {
        lookup: FindQuery,
        projection: Projection,
    },
}

impl ImagesRequest {
    /// `?sample_id=&neighbours=true|false&select=...`; `sample_id` is required.
    pub fn from_params(params: &QueryParams) -> QueryResult<Self> {
        let sample_id = params.string("sample_id").ok_or_else(|| {
            QueryError::missing("A sample_id parameter must be supplied with this request.")
        })?;
        Ok(Self {
            sample_id,
            neighbours: params.flag("neighbours")?,
            projection: Projection::from_select(params.select()),
        })
    }

    /// Images of `sample_id`, with `select` taken from the query string.
    pub fn new(sample_id: impl Into<String>, neighbours: bool, params: &QueryParams) -> Self {
        Self {
            sample_id: sample_id.into(),
            neighbours,
            projection: Projection::from_select(params.select()),
        }
    }

    /// One query, or a neighbour lookup followed by a second query.
    pub fn plan(&self) -> ImagesPlan {
        if self.neighbours {
            let lookup = FindQuery::new(
                SAMPLES,
                FilterBuilder::new().eq("_id", self.sample_id.as_str()).build(),
                Projection::neighbours_only(),
            );
            ImagesPlan::ViaNeighbours {
                lookup,
                projection: self.projection.clone(),
            }
        } else {
            let filter = FilterBuilder::new()
                .eq("sample_id", self.sample_id.as_str())
                .build();
            ImagesPlan::Direct(FindQuery::new(IMAGES, filter, self.projection.clone()))
        }
    }

    /// Images whose `sample_id` is one of `neighbours`.
    pub fn neighbour_images(neighbours: Vec<Bson>, projection: Projection) -> FindQuery {
        let filter = FilterBuilder::new()
            .in_array("sample_id", neighbours)
            .build();
        FindQuery::new(IMAGES, filter, projection)
    }
}

/// Every screen minus the bulky `screen_features`, for page listings.
pub fn screen_listing() -> FindQuery {
    FindQuery::new(
        SCREENS,
        filter::all(),
        Projection::without("screen_features"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;

    fn params(query: &str) -> QueryParams {
        QueryParams::parse(Some(query))
    }

    #[test]
    fn test_screens_all() {
        let query = ScreensRequest::from_params(&QueryParams::default()).query();
        assert_eq!(query.collection, SCREENS);
        assert_eq!(query.filter, doc! {});
        assert_eq!(query.projection_document(), None);
    }

    #[test]
    fn test_screens_by_id_with_select() {
        let query = ScreensRequest::by_id("BBBC017", &params("select=screen_desc&select=screen_features"))
            .query();
        assert_eq!(query.filter, doc! { "_id": "BBBC017" });
        assert_eq!(
            query.projection_document(),
            Some(doc! { "screen_desc": 1, "screen_features": 1 })
        );
    }

    #[test]
    fn test_samples_requires_screen_or_id() {
        let err = SamplesRequest::from_params(&params("select=row")).unwrap_err();
        assert!(err.is_missing());
        assert_eq!(
            err.to_string(),
            "A screen or id parameter must be supplied with this request."
        );
    }

    #[test]
    fn test_samples_by_screen_and_id() {
        let query = SamplesRequest::from_params(&params("screen=BBBC017&id=s1"))
            .unwrap()
            .query();
        assert_eq!(query.collection, SAMPLES);
        assert_eq!(query.filter, doc! { "screen": "BBBC017", "_id": "s1" });
        assert!(query.projection.is_all());
    }

    #[test]
    fn test_samples_by_id_only() {
        let query = SamplesRequest::from_params(&params("id=s1")).unwrap().query();
        assert_eq!(query.filter, doc! { "_id": "s1" });
    }

    #[test]
    fn test_sample_neighbours_forces_projection() {
        let query = SampleNeighboursRequest::new("BBBC017", Some("s1".into())).query();
        assert_eq!(query.filter, doc! { "screen": "BBBC017", "_id": "s1" });
        assert_eq!(
            query.projection_document(),
            Some(doc! { "_id": 0, "neighbours": 1 })
        );

        let query = SampleNeighboursRequest::new("BBBC017", None).query();
        assert_eq!(query.filter, doc! { "screen": "BBBC017" });
    }

    #[test]
    fn test_features_requires_both() {
        assert!(FeaturesRequest::from_params(&params("screen=BBBC017")).is_err());
        assert!(FeaturesRequest::from_params(&params("feature=cell_area")).is_err());

        let query = FeaturesRequest::from_params(&params("screen=BBBC017&feature=cell_area"))
            .unwrap()
            .query();
        assert_eq!(query.collection, FEATURES);
        assert_eq!(
            query.filter,
            doc! { "screen": "BBBC017", "feature_name": "cell_area" }
        );
    }

    #[test]
    fn test_features_accepts_feature_name() {
        let request =
            FeaturesRequest::from_params(&params("screen=BBBC017&feature_name=cell_area")).unwrap();
        assert_eq!(request.feature, "cell_area");
    }

    #[test]
    fn test_images_requires_sample_id() {
        let err = ImagesRequest::from_params(&params("neighbours=true")).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_images_rejects_bad_flag() {
        let err = ImagesRequest::from_params(&params("sample_id=s1&neighbours=yes-please"))
            .unwrap_err();
        assert_eq!(err, QueryError::invalid("neighbours", "yes-please"));
    }

    #[test]
    fn test_images_direct_plan() {
        let request = ImagesRequest::from_params(&params("sample_id=s1&select=image_large")).unwrap();
        match request.plan() {
            ImagesPlan::Direct(query) => {
                assert_eq!(query.collection, IMAGES);
                assert_eq!(query.filter, doc! { "sample_id": "s1" });
                assert_eq!(query.projection_document(), Some(doc! { "image_large": 1 }));
            }
            other => panic!("expected direct plan, got {:?}", other),
        }
    }

    #[test]
    fn test_images_neighbour_plan() {
        let request =
            ImagesRequest::from_params(&params("sample_id=s1&neighbours=true&select=image_thumb"))
                .unwrap();
        let ImagesPlan::ViaNeighbours { lookup, projection } = request.plan() else {
            panic!("expected neighbour plan");
        };
        assert_eq!(lookup.collection, SAMPLES);
        assert_eq!(lookup.filter, doc! { "_id": "s1" });
        assert_eq!(
            lookup.projection_document(),
            Some(doc! { "_id": 0, "neighbours": 1 })
        );

        let query = ImagesRequest::neighbour_images(vec!["s2".into(), "s3".into()], projection);
        assert_eq!(query.filter, doc! { "sample_id": { "$in": ["s2", "s3"] } });
        assert_eq!(query.projection_document(), Some(doc! { "image_thumb": 1 }));
    }

    #[test]
    fn test_screen_listing_excludes_features() {
        let query = screen_listing();
        assert_eq!(query.collection, SCREENS);
        assert_eq!(
            query.projection_document(),
            Some(doc! { "screen_features": 0 })
        );
    }
}
