//! # API REST
//!
//! REST API for the EHR resource dashboard.
//!
//! Handles:
//! - The synthetic record source endpoint (`GET /api/resources?count=N`)
//! - Health checks
//! - OpenAPI/Swagger documentation and CORS
//!
//! Record generation itself lives in `dash-core`; this crate only parses requests and shapes
//! responses.

#![warn(rust_2018_idioms)]

use axum::{
    extract::Query,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use dash_core::constants::{MAX_RECORD_COUNT, RESOURCES_PATH};
use dash_core::generator::{clamp_count, generate};
use ehr_resource::{Resources, ResourceWrapper};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Default listen address when `EHR_DASH_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Environment variable naming the listen address.
pub const ENV_REST_ADDR: &str = "EHR_DASH_REST_ADDR";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Query string for the record source endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResourcesQuery {
    /// Number of records to generate. Missing, unparsable or zero values mean 1,000,000;
    /// negative values yield no records; larger values are clamped to 1,000,000.
    pub count: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_resources),
    components(schemas(
        HealthRes,
        ResourceWrapper,
        ehr_resource::EhrResource,
        ehr_resource::ResourceMetadata,
        ehr_resource::ResourceIdentifier,
        ehr_resource::ProcessingState,
        ehr_resource::FhirVersion,
    ))
)]
pub struct ApiDoc;

/// Build the application router.
///
/// Serves `/health`, the record source endpoint, the OpenAPI document at
/// `/api-docs/openapi.json` and Swagger UI at `/swagger-ui`, behind a permissive CORS layer.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route(RESOURCES_PATH, get(list_resources))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
}

/// Resolve the `count` query value.
///
/// The leading integer of the value is used (`"25abc"` reads as 25). Anything without one, and
/// zero, selects the maximum. A negative value asks for nothing.
pub fn parse_count(raw: Option<&str>) -> usize {
    match raw.and_then(leading_integer) {
        None | Some(0) => MAX_RECORD_COUNT,
        Some(requested) if requested < 0 => 0,
        Some(requested) => usize::try_from(requested).map_or(MAX_RECORD_COUNT, clamp_count),
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    // Digits beyond i64 are still a (very large) positive request.
    let value = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "EHR dashboard REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/resources",
    params(ResourcesQuery),
    responses(
        (status = 200, description = "Generated resource records", body = [ResourceWrapper]),
        (status = 500, description = "Internal server error")
    )
)]
/// Generate synthetic resource records
///
/// Returns a JSON array of `count` freshly generated records. Responses are never cached.
///
/// # Errors
/// Returns `500 Internal Server Error` if:
/// - the generation task panics or is cancelled, or
/// - the records cannot be serialised.
#[axum::debug_handler]
async fn list_resources(
    Query(query): Query<ResourcesQuery>,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    let count = parse_count(query.count.as_deref());
    tracing::info!("Generating {} resource records", count);

    let rendered = tokio::task::spawn_blocking(move || Resources::render(&generate(count)))
        .await
        .map_err(|e| {
            tracing::error!("Resource generation task failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate resources")
        })?;

    match rendered {
        Ok(body) => Ok((
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            body,
        )),
        Err(e) => {
            tracing::error!("Resource serialisation error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate resources"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_body(uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }

    #[test]
    fn count_parsing() {
        assert_eq!(parse_count(Some("25")), 25);
        assert_eq!(parse_count(Some(" 7 ")), 7);
        assert_eq!(parse_count(Some("25abc")), 25);
        assert_eq!(parse_count(Some("+3")), 3);
        assert_eq!(parse_count(None), MAX_RECORD_COUNT);
        assert_eq!(parse_count(Some("")), MAX_RECORD_COUNT);
        assert_eq!(parse_count(Some("abc")), MAX_RECORD_COUNT);
        assert_eq!(parse_count(Some("0")), MAX_RECORD_COUNT);
        assert_eq!(parse_count(Some("-5")), 0);
        assert_eq!(parse_count(Some("-99999999999999999999999")), 0);
        assert_eq!(parse_count(Some("5000000")), MAX_RECORD_COUNT);
        assert_eq!(parse_count(Some("99999999999999999999999")), MAX_RECORD_COUNT);
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let (status, _, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthRes = serde_json::from_slice(&body).unwrap();
        assert!(health.ok);
    }

    #[tokio::test]
    async fn resources_returns_requested_count_uncached() {
        let (status, headers, body) = get_body("/api/resources?count=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");

        let records = Resources::parse(&body).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records
            .iter()
            .all(|r| r.patient_id().starts_with("patient-")));
    }

    #[tokio::test]
    async fn negative_count_returns_empty_array() {
        let (status, headers, body) = get_body("/api/resources?count=-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(body, b"[]");
        assert!(Resources::parse(&body).unwrap().is_empty());
    }

    #[tokio::test]
    async fn resources_use_camel_case_wire_names() {
        let (_, _, body) = get_body("/api/resources?count=1").await;
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let metadata = &value[0]["resource"]["metadata"];
        assert!(metadata["createdTime"].is_string());
        assert!(metadata["identifier"]["patientId"].is_string());
        assert!(value[0]["resource"]["humanReadableStr"].is_string());
    }

    #[tokio::test]
    async fn openapi_document_lists_endpoints() {
        let (status, _, body) = get_body("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"]["/api/resources"].is_object());
        assert!(doc["paths"]["/health"].is_object());
    }
}
