//! JSON query handlers.
//!
//! Each handler decodes the raw query string into [`QueryParams`], builds a
//! typed request (400 on a missing requirement), runs the resulting
//! [`FindQuery`] against the store and answers with an extended JSON array.

use axum::Json;
use axum::extract::{Path, RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bson::Document;
use microscopium_mongodb::document::DocumentExt;
use microscopium_mongodb::{DocumentStore, MongoError, extjson};
use microscopium_query::{
    FeaturesRequest, FindQuery, ImagesPlan, ImagesRequest, QueryParams, SampleNeighboursRequest,
    SamplesRequest, ScreensRequest,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// A list of documents rendered as extended JSON.
#[derive(Debug, Clone, Default)]
pub struct ExtendedJson(pub Vec<Document>);

impl IntoResponse for ExtendedJson {
    fn into_response(self) -> Response {
        match extjson::to_extended_json(&self.0) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(err) => ApiError::from(err).into_response(),
        }
    }
}

async fn run(store: &dyn DocumentStore, query: &FindQuery) -> ApiResult<ExtendedJson> {
    let docs = store.find_query(query).await?;
    debug!(collection = query.collection, results = docs.len(), "Query answered");
    Ok(ExtendedJson(docs))
}

/// Resolve an images request, following the sample's `neighbours` when asked.
pub async fn fetch_images(
    store: &dyn DocumentStore,
    request: &ImagesRequest,
) -> ApiResult<Vec<Document>> {
    match request.plan() {
        ImagesPlan::Direct(query) => Ok(store.find_query(&query).await?),
        ImagesPlan::ViaNeighbours { lookup, projection } => {
            let sample = store
                .find_query(&lookup)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| MongoError::not_found(format!("sample {}", request.sample_id)))?;

            let neighbours = sample.neighbours();
            debug!(sample_id = %request.sample_id, neighbours = neighbours.len(), "Resolved neighbours");

            let query = ImagesRequest::neighbour_images(neighbours, projection);
            Ok(store.find_query(&query).await?)
        }
    }
}

fn params(query: Option<String>) -> QueryParams {
    QueryParams::parse(query.as_deref())
}

// ==================== Query-string routes ====================

/// `GET /screens`
pub async fn list_screens(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = ScreensRequest::from_params(&params(query));
    run(state.store.as_ref(), &request.query()).await
}

/// `GET /screens/{id}`
pub async fn get_screen(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = ScreensRequest::by_id(id, &params(query));
    run(state.store.as_ref(), &request.query()).await
}

/// `GET /samples`
pub async fn list_samples(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = SamplesRequest::from_params(&params(query))?;
    run(state.store.as_ref(), &request.query()).await
}

/// `GET /samples/{screen}/neighbours`
pub async fn screen_neighbours(
    State(state): State<AppState>,
    Path(screen): Path<String>,
) -> ApiResult<ExtendedJson> {
    let request = SampleNeighboursRequest::new(screen, None);
    run(state.store.as_ref(), &request.query()).await
}

/// `GET /samples/{screen}/{id}/neighbours`
pub async fn sample_neighbours(
    State(state): State<AppState>,
    Path((screen, id)): Path<(String, String)>,
) -> ApiResult<ExtendedJson> {
    let request = SampleNeighboursRequest::new(screen, Some(id));
    run(state.store.as_ref(), &request.query()).await
}

/// `GET /images`
pub async fn list_images(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = ImagesRequest::from_params(&params(query))?;
    Ok(ExtendedJson(fetch_images(state.store.as_ref(), &request).await?))
}

/// `GET /features`
pub async fn list_features(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = FeaturesRequest::from_params(&params(query))?;
    run(state.store.as_ref(), &request.query()).await
}

// ==================== Path-style routes ====================

/// `GET /api/{screen_id}/samples`
pub async fn screen_samples(
    State(state): State<AppState>,
    Path(screen_id): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = SamplesRequest::in_screen(screen_id, None, &params(query));
    run(state.store.as_ref(), &request.query()).await
}

/// `GET /api/{screen_id}/samples/{sample_id}`
pub async fn screen_sample(
    State(state): State<AppState>,
    Path((screen_id, sample_id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = SamplesRequest::in_screen(screen_id, Some(sample_id), &params(query));
    run(state.store.as_ref(), &request.query()).await
}

/// `GET /api/{screen_id}/samples/{sample_id}/images`
pub async fn sample_images(
    State(state): State<AppState>,
    Path((_screen_id, sample_id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = ImagesRequest::new(sample_id, false, &params(query));
    Ok(ExtendedJson(fetch_images(state.store.as_ref(), &request).await?))
}

/// `GET /api/{screen_id}/samples/{sample_id}/images/neighbours`
pub async fn sample_neighbour_images(
    State(state): State<AppState>,
    Path((_screen_id, sample_id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = ImagesRequest::new(sample_id, true, &params(query));
    Ok(ExtendedJson(fetch_images(state.store.as_ref(), &request).await?))
}

/// `GET /api/{screen_id}/features/{feature}`
pub async fn screen_feature(
    State(state): State<AppState>,
    Path((screen_id, feature)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> ApiResult<ExtendedJson> {
    let request = FeaturesRequest::new(screen_id, feature, &params(query));
    run(state.store.as_ref(), &request.query()).await
}

// ==================== Health ====================

/// `GET /health`: 200 when the store answers a ping, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(err) => {
            warn!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use microscopium_mongodb::MemoryStore;
    use microscopium_query::Projection;
    use pretty_assertions::assert_eq;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_documents(
                "samples",
                [
                    doc! { "_id": "s1", "screen": "A", "neighbours": ["s2", "s3"] },
                    doc! { "_id": "s2", "screen": "A", "neighbours": ["s1"] },
                    doc! { "_id": "s3", "screen": "A" },
                ],
            )
            .with_documents(
                "images",
                [
                    doc! { "_id": "i1", "sample_id": "s1", "image_thumb": "t1" },
                    doc! { "_id": "i2", "sample_id": "s2", "image_thumb": "t2" },
                    doc! { "_id": "i3", "sample_id": "s3", "image_thumb": "t3" },
                ],
            )
    }

    fn image_ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.get_str("_id").unwrap()).collect()
    }

    #[tokio::test]
    async fn test_fetch_images_direct() {
        let request = ImagesRequest::new("s2", false, &QueryParams::default());
        let docs = fetch_images(&store(), &request).await.unwrap();
        assert_eq!(image_ids(&docs), vec!["i2"]);
    }

    #[tokio::test]
    async fn test_fetch_images_via_neighbours() {
        let request = ImagesRequest::new("s1", true, &QueryParams::default());
        let docs = fetch_images(&store(), &request).await.unwrap();
        assert_eq!(image_ids(&docs), vec!["i2", "i3"]);
    }

    #[tokio::test]
    async fn test_fetch_images_without_neighbours_field() {
        let request = ImagesRequest::new("s3", true, &QueryParams::default());
        let docs = fetch_images(&store(), &request).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_images_unknown_sample() {
        let request = ImagesRequest::new("nope", true, &QueryParams::default());
        let err = fetch_images(&store(), &request).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_images_projection() {
        let request = ImagesRequest::new(
            "s1",
            true,
            &QueryParams::from_pairs([("select", "sample_id")]),
        );
        assert_eq!(request.projection, Projection::Include(vec!["sample_id".into()]));

        let docs = fetch_images(&store(), &request).await.unwrap();
        assert_eq!(docs[0], doc! { "_id": "i2", "sample_id": "s2" });
    }

    #[test]
    fn test_extended_json_content_type() {
        let response = ExtendedJson(vec![doc! { "_id": "s1" }]).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
