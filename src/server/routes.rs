//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::error::Error;
use crate::geo::Viewport;
use crate::policy::{submit, SubmitOutcome};
use crate::report::category::available_categories;
use crate::report::{Category, NewSubmission, Submission};
use crate::server::state::AppState;
use crate::store::SubmissionStore;
use crate::viewport::{query_viewport, ViewportResult};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/submissions", post(submit_handler))
        .route("/api/clusters", get(clusters_handler))
        .route("/api/submitters/:id/submissions", get(history_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    /// Colliding categories, only for duplicate rejections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "INVALID_COORDINATES" | "INVALID_RADIUS" | "INVALID_SUBMISSION" => {
                StatusCode::BAD_REQUEST
            }
            "DUPLICATE_CATEGORIES" => StatusCode::CONFLICT,
            "STORE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidRadius(_) => "INVALID_RADIUS",
            Error::InvalidSubmission(_) => "INVALID_SUBMISSION",
            Error::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        if err.is_degraded() {
            warn!("Store unavailable: {}", err);
        }
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            categories: Vec::new(),
        }
    }
}

/// Record a new submission
///
/// POST /api/submissions
async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSubmission>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let engine = state.engine().await;

    match submit(state.store.as_ref(), req, &engine).await? {
        SubmitOutcome::Accepted { submission } => Ok((StatusCode::CREATED, Json(submission))),
        SubmitOutcome::Rejected { categories } => Err(ApiError {
            error: "Already reported nearby".to_string(),
            code: "DUPLICATE_CATEGORIES".to_string(),
            categories: categories.into_iter().collect(),
        }),
    }
}

/// Viewport bounds as query parameters
#[derive(Debug, Deserialize)]
pub struct ViewportParams {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Clusters response
#[derive(Debug, Serialize, Deserialize)]
pub struct ClustersResponse {
    /// Number of clusters
    pub count: usize,
    #[serde(flatten)]
    pub result: ViewportResult,
}

/// Clusters visible in a viewport
///
/// GET /api/clusters?south=&west=&north=&east=
async fn clusters_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewportParams>,
) -> Result<Json<ClustersResponse>, ApiError> {
    let viewport = Viewport::from_bounds(params.south, params.west, params.north, params.east);
    viewport.validate()?;

    let engine = state.engine().await;
    let result = query_viewport(state.store.as_ref(), &viewport, &engine, Utc::now()).await?;

    Ok(Json(ClustersResponse {
        count: result.clusters.len(),
        result,
    }))
}

/// History response
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub submitter_id: String,
    pub submissions: Vec<Submission>,
}

/// A submitter's past submissions, newest first
///
/// GET /api/submitters/:id/submissions
async fn history_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let submissions = state.store.history_for(&id).await?;
    Ok(Json(HistoryResponse {
        submitter_id: id,
        submissions,
    }))
}

/// Categories list response
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: Category,
    pub slots: Vec<String>,
}

/// List canonical categories with their slots
///
/// GET /api/categories
async fn categories_handler() -> Json<CategoriesResponse> {
    let categories = available_categories()
        .into_iter()
        .map(|category| CategoryInfo {
            id: category,
            slots: category.slots().into_iter().map(String::from).collect(),
        })
        .collect();

    Json(CategoriesResponse { categories })
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Stored submissions, when the store is reachable
    pub submissions: Option<usize>,
    /// "online" or "unavailable"
    pub store: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let submissions = state.store.len().await.ok();

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if submissions.is_some() {
            "online"
        } else {
            "unavailable"
        }
        .to_string(),
        submissions,
        uptime_secs: state.uptime_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::DocumentStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default(), DocumentStore::in_memory()))
    }

    fn post_submission(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/submissions")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn pothole(lat: f64, lng: f64, submitter: &str) -> serde_json::Value {
        serde_json::json!({
            "mode": "complaint",
            "lat": lat,
            "lng": lng,
            "categories": { "potholes": true },
            "submitter_id": submitter
        })
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(create_test_state());

        let response = app.oneshot(get_request("/api/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let status: StatusResponse = body_json(response).await;
        assert!(status.running);
        assert_eq!(status.submissions, Some(0));
        assert_eq!(status.store, "online");
    }

    #[tokio::test]
    async fn test_status_reports_unavailable_store() {
        let state = create_test_state();
        state.store.set_offline(true);

        let response = create_router(state).oneshot(get_request("/api/status")).await.unwrap();
        let status: StatusResponse = body_json(response).await;

        assert_eq!(status.submissions, None);
        assert_eq!(status.store, "unavailable");
    }

    #[tokio::test]
    async fn test_submit_created() {
        let state = create_test_state();
        let app = create_router(state.clone());

        let response = app
            .oneshot(post_submission(pothole(40.7128, -74.0060, "alice")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let submission: Submission = body_json(response).await;
        assert_eq!(submission.submitter_id, "alice");
        assert_eq!(submission.spatial_key, "dr5regw3pp");
        assert_eq!(state.store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_duplicate_conflict() {
        let state = create_test_state();

        let first = create_router(state.clone())
            .oneshot(post_submission(pothole(0.0, 0.0, "alice")))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = create_router(state.clone())
            .oneshot(post_submission(pothole(0.0, 0.0005, "alice")))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let err: ApiError = body_json(second).await;
        assert_eq!(err.code, "DUPLICATE_CATEGORIES");
        assert_eq!(err.categories, vec![Category::Roads]);
        assert_eq!(state.store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_invalid_coordinates() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(post_submission(pothole(91.0, -74.0060, "alice")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = body_json(response).await;
        assert_eq!(err.code, "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_submit_unknown_slot() {
        let app = create_router(create_test_state());
        let body = serde_json::json!({
            "mode": "compliment",
            "lat": 0.0,
            "lng": 0.0,
            "categories": { "unicorns": true },
            "submitter_id": "alice"
        });

        let response = app.oneshot(post_submission(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = body_json(response).await;
        assert_eq!(err.code, "INVALID_SUBMISSION");
    }

    #[tokio::test]
    async fn test_submit_store_unavailable() {
        let state = create_test_state();
        state.store.set_offline(true);

        let response = create_router(state)
            .oneshot(post_submission(pothole(0.0, 0.0, "alice")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = body_json(response).await;
        assert_eq!(err.code, "STORE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_clusters_endpoint() {
        let state = create_test_state();
        for (lat, lng, who) in [
            (40.7100, -74.0100, "a"),
            (40.7101, -74.0100, "b"),
            (40.7150, -74.0050, "c"),
        ] {
            create_router(state.clone())
                .oneshot(post_submission(pothole(lat, lng, who)))
                .await
                .unwrap();
        }

        let response = create_router(state)
            .oneshot(get_request(
                "/api/clusters?south=40.70&west=-74.02&north=40.72&east=-74.00",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let clusters: ClustersResponse = body_json(response).await;
        assert_eq!(clusters.count, 2);
        assert_eq!(clusters.result.visible, 3);
        assert_eq!(clusters.result.ranges.len(), 1);
        assert!(clusters.result.clusters.iter().any(|c| c.count == 2));
    }

    #[tokio::test]
    async fn test_clusters_inverted_viewport() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(get_request(
                "/api/clusters?south=40.72&west=-74.02&north=40.70&east=-74.00",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clusters_store_unavailable() {
        let state = create_test_state();
        state.store.set_offline(true);

        let response = create_router(state)
            .oneshot(get_request("/api/clusters?south=0&west=0&north=1&east=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_history_endpoint() {
        let state = create_test_state();
        create_router(state.clone())
            .oneshot(post_submission(pothole(0.0, 0.0, "alice")))
            .await
            .unwrap();
        create_router(state.clone())
            .oneshot(post_submission(pothole(0.0, 0.0, "bob")))
            .await
            .unwrap();

        let response = create_router(state)
            .oneshot(get_request("/api/submitters/alice/submissions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let history: HistoryResponse = body_json(response).await;
        assert_eq!(history.submitter_id, "alice");
        assert_eq!(history.submissions.len(), 1);
    }

    #[tokio::test]
    async fn test_categories_endpoint() {
        let app = create_router(create_test_state());

        let response = app.oneshot(get_request("/api/categories")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let list: CategoriesResponse = body_json(response).await;
        assert_eq!(list.categories.len(), 7);
        let roads = list
            .categories
            .iter()
            .find(|c| c.id == Category::Roads)
            .unwrap();
        assert!(roads.slots.contains(&"potholes".to_string()));
        assert!(roads.slots.contains(&"roads".to_string()));
    }
}
