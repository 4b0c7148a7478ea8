//! Record sources.
//!
//! A record source hands the dashboard a whole collection at once; there is no paging or
//! streaming across this boundary. Four sources exist:
//!
//! - [`GeneratorSource`]: local synthetic generation with progress
//! - [`HttpSource`]: the record source endpoint (`GET /api/resources?count=N`)
//! - [`PlaceholderSource`]: a public placeholder endpoint for small counts, falling back to local
//!   generation on any failure
//! - [`SampleSource`]: the five fixed sample records
//!
//! [`ResourceClient`] wraps whichever one the composition root picks. It is constructed once and
//! passed by reference.
//!
//! Fetch failures surface as [`DashError::Fetch`] with a message ready for display. No retries
//! happen here.

use crate::config::DashConfig;
use crate::constants::{PLACEHOLDER_MAX_COUNT, PLACEHOLDER_POSTS_PATH, RESOURCES_PATH};
use crate::generator::{
    clamp_count, generate_with_progress, pick, random_alphanumeric, random_version, recent,
    CancelFlag, AI_SUMMARIES, DESCRIPTIONS, GENERATED_STATES, RESOURCE_TYPES,
};
use crate::{DashError, DashResult};
use chrono::{Duration, Utc};
use ehr_resource::{
    sample_resources, EhrResource, ResourceIdentifier, ResourceMetadata, ResourceWrapper,
    Resources,
};
use rand::Rng;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Something that can produce a full record collection.
#[allow(async_fn_in_trait)]
pub trait ResourceSource {
    /// Fetch up to `count` records, reporting progress as a percentage.
    async fn fetch(
        &self,
        count: usize,
        on_progress: &mut dyn FnMut(u8),
    ) -> DashResult<Vec<ResourceWrapper>>;
}

// ============================================================================
// Local generation
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct GeneratorSource {
    cancel: CancelFlag,
}

impl GeneratorSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose runs are cancelled through `cancel`.
    pub fn with_cancel(cancel: CancelFlag) -> Self {
        Self { cancel }
    }

    /// Handle that cancels the run currently in flight.
    pub fn cancel_handle(&self) -> CancelFlag {
        self.cancel.clone()
    }
}

impl ResourceSource for GeneratorSource {
    async fn fetch(
        &self,
        count: usize,
        on_progress: &mut dyn FnMut(u8),
    ) -> DashResult<Vec<ResourceWrapper>> {
        // Each run starts live; a cancel only affects the run it lands in.
        self.cancel.reset();
        generate_with_progress(count, on_progress, &self.cancel).await
    }
}

// ============================================================================
// Record source endpoint
// ============================================================================

struct ApiResponse<T> {
    data: T,
    status: u16,
}

/// Client for the record source endpoint.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// # Errors
    ///
    /// Returns [`DashError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> DashResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ehr-dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `url` and return the body, normalising every failure into [`DashError::Fetch`].
    async fn get_bytes(&self, url: &str) -> DashResult<ApiResponse<Vec<u8>>> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| DashError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashError::Fetch(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| DashError::Fetch(e.to_string()))?;

        Ok(ApiResponse {
            data: data.to_vec(),
            status: status.as_u16(),
        })
    }
}

impl ResourceSource for HttpSource {
    async fn fetch(
        &self,
        count: usize,
        on_progress: &mut dyn FnMut(u8),
    ) -> DashResult<Vec<ResourceWrapper>> {
        let count = clamp_count(count);
        let url = format!("{}{}?count={}", self.base_url, RESOURCES_PATH, count);
        on_progress(0);

        let response = self.get_bytes(&url).await?;
        let records =
            Resources::parse(&response.data).map_err(|e| DashError::Fetch(e.to_string()))?;

        tracing::info!(
            status = response.status,
            records = records.len(),
            "fetched resource data"
        );
        on_progress(100);
        Ok(records)
    }
}

// ============================================================================
// Placeholder endpoint with local fallback
// ============================================================================

#[derive(Debug, Deserialize)]
struct PlaceholderPost {
    id: u64,
}

/// Small-count source backed by a generic placeholder content endpoint.
#[derive(Clone, Debug)]
pub struct PlaceholderSource {
    http: HttpSource,
    fallback: GeneratorSource,
}

impl PlaceholderSource {
    pub fn new(http: HttpSource) -> Self {
        Self::with_fallback(http, GeneratorSource::new())
    }

    pub fn with_fallback(http: HttpSource, fallback: GeneratorSource) -> Self {
        Self { http, fallback }
    }

    async fn fetch_posts(&self, count: usize) -> DashResult<Vec<ResourceWrapper>> {
        let url = format!("{}{}", self.http.base_url(), PLACEHOLDER_POSTS_PATH);
        let response = self.http.get_bytes(&url).await?;
        let posts: Vec<PlaceholderPost> = serde_json::from_slice(&response.data)
            .map_err(|e| DashError::Fetch(format!("invalid placeholder payload: {e}")))?;
        Ok(posts_to_resources(&posts, count))
    }
}

impl ResourceSource for PlaceholderSource {
    async fn fetch(
        &self,
        count: usize,
        on_progress: &mut dyn FnMut(u8),
    ) -> DashResult<Vec<ResourceWrapper>> {
        if count > PLACEHOLDER_MAX_COUNT {
            return self.fallback.fetch(count, on_progress).await;
        }

        // The whole request counts as one run: a cancel during the HTTP leg stops the fallback.
        let cancel = &self.fallback.cancel;
        cancel.reset();
        on_progress(0);
        match self.fetch_posts(count).await {
            Ok(records) => {
                on_progress(100);
                Ok(records)
            }
            Err(_) if cancel.is_cancelled() => {
                tracing::info!("placeholder load cancelled before local fallback");
                Err(DashError::Cancelled)
            }
            Err(e) => {
                tracing::warn!(error = %e, "placeholder endpoint unavailable; generating locally");
                generate_with_progress(count, on_progress, cancel).await
            }
        }
    }
}

/// Dress placeholder posts up as resource records. Text comes from the pools by position.
fn posts_to_resources(posts: &[PlaceholderPost], count: usize) -> Vec<ResourceWrapper> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    posts
        .iter()
        .take(count)
        .enumerate()
        .map(|(index, post)| {
            let resource_type = *pick(&mut rng, &RESOURCE_TYPES);
            let processed_time = rng
                .gen_bool(0.7)
                .then(|| recent(&mut rng, now, Duration::hours(12)));
            let ai_summary = rng
                .gen_bool(0.7)
                .then(|| AI_SUMMARIES[index % AI_SUMMARIES.len()].to_string());

            ResourceWrapper {
                resource: EhrResource {
                    metadata: ResourceMetadata {
                        state: *pick(&mut rng, &GENERATED_STATES),
                        created_time: recent(&mut rng, now, Duration::days(7)),
                        fetch_time: recent(&mut rng, now, Duration::days(1)),
                        processed_time,
                        identifier: ResourceIdentifier {
                            key: format!("resource-{}-{}", post.id, resource_type.to_lowercase()),
                            uid: format!(
                                "uid-{}-{}",
                                post.id,
                                random_alphanumeric(&mut rng, 9).to_lowercase()
                            ),
                            patient_id: format!("patient-{}", rng.gen_range(1..=100)),
                        },
                        resource_type: resource_type.to_string(),
                        version: random_version(&mut rng),
                    },
                    human_readable_str: DESCRIPTIONS[index % DESCRIPTIONS.len()].to_string(),
                    ai_summary,
                },
            }
        })
        .collect()
}

// ============================================================================
// Fixed samples
// ============================================================================

#[derive(Clone, Copy, Debug, Default)]
pub struct SampleSource;

impl ResourceSource for SampleSource {
    async fn fetch(
        &self,
        count: usize,
        on_progress: &mut dyn FnMut(u8),
    ) -> DashResult<Vec<ResourceWrapper>> {
        let records = sample_resources().into_iter().take(count).collect();
        on_progress(100);
        Ok(records)
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Which record source a client is built around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Local,
    Remote,
    Placeholder,
    Sample,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Remote => "remote",
            SourceKind::Placeholder => "placeholder",
            SourceKind::Sample => "sample",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = DashError;

    fn from_str(s: &str) -> DashResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(SourceKind::Local),
            "remote" => Ok(SourceKind::Remote),
            "placeholder" => Ok(SourceKind::Placeholder),
            "sample" => Ok(SourceKind::Sample),
            other => Err(DashError::InvalidInput(format!(
                "unknown source '{other}' (expected local, remote, placeholder or sample)"
            ))),
        }
    }
}

/// The record client handed to the dashboard driver.
#[derive(Clone, Debug)]
pub enum ResourceClient {
    Generator(GeneratorSource),
    Http(HttpSource),
    Placeholder(PlaceholderSource),
    Sample(SampleSource),
}

impl ResourceClient {
    /// Build the client for `kind` from startup configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Config`] if an HTTP client is needed and cannot be built.
    pub fn new(kind: SourceKind, cfg: &DashConfig) -> DashResult<Self> {
        Ok(match kind {
            SourceKind::Local => ResourceClient::Generator(GeneratorSource::new()),
            SourceKind::Remote => ResourceClient::Http(HttpSource::new(cfg.api_base_url())?),
            SourceKind::Placeholder => ResourceClient::Placeholder(PlaceholderSource::new(
                HttpSource::new(cfg.api_base_url())?,
            )),
            SourceKind::Sample => ResourceClient::Sample(SampleSource),
        })
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            ResourceClient::Generator(_) => SourceKind::Local,
            ResourceClient::Http(_) => SourceKind::Remote,
            ResourceClient::Placeholder(_) => SourceKind::Placeholder,
            ResourceClient::Sample(_) => SourceKind::Sample,
        }
    }

    /// Cancel a local generation run in flight. Network fetches are not cancellable.
    pub fn cancel(&self) {
        match self {
            ResourceClient::Generator(source) => source.cancel.cancel(),
            ResourceClient::Placeholder(source) => source.fallback.cancel.cancel(),
            ResourceClient::Http(_) | ResourceClient::Sample(_) => {}
        }
    }
}

impl ResourceSource for ResourceClient {
    async fn fetch(
        &self,
        count: usize,
        on_progress: &mut dyn FnMut(u8),
    ) -> DashResult<Vec<ResourceWrapper>> {
        tracing::debug!(source = %self.kind(), count, "fetching resource data");
        match self {
            ResourceClient::Generator(source) => source.fetch(count, on_progress).await,
            ResourceClient::Http(source) => source.fetch(count, on_progress).await,
            ResourceClient::Placeholder(source) => source.fetch(count, on_progress).await,
            ResourceClient::Sample(source) => source.fetch(count, on_progress).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use ehr_resource::ProcessingState;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve test router");
        });
        format!("http://{addr}")
    }

    async fn unused_base_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind throwaway listener");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        format!("http://{addr}")
    }

    fn sample_json() -> String {
        Resources::render(&sample_resources()).expect("render samples")
    }

    fn posts_json(n: u64) -> String {
        let posts: Vec<String> = (1..=n)
            .map(|id| format!(r#"{{"userId":1,"id":{id},"title":"t{id}","body":"b{id}"}}"#))
            .collect();
        format!("[{}]", posts.join(","))
    }

    #[tokio::test]
    async fn http_source_decodes_records() {
        let body = sample_json();
        let base = serve(Router::new().route(
            "/api/resources",
            get(move || {
                let body = body.clone();
                async move { body }
            }),
        ))
        .await;

        let source = HttpSource::new(base).unwrap();
        let mut seen = Vec::new();
        let records = source.fetch(5, &mut |p| seen.push(p)).await.unwrap();
        assert_eq!(records, sample_resources());
        assert_eq!(seen, [0, 100]);
    }

    #[tokio::test]
    async fn http_source_reports_status_errors() {
        let base = serve(Router::new().route(
            "/api/resources",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        let source = HttpSource::new(base).unwrap();
        let err = source.fetch(5, &mut |_| {}).await.expect_err("should fail");
        match err {
            DashError::Fetch(msg) => assert_eq!(msg, "HTTP error! status: 500"),
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_source_reports_decode_errors() {
        let base = serve(Router::new().route(
            "/api/resources",
            get(|| async { r#"[{"resource": {"humanReadableStr": "x"}}]"# }),
        ))
        .await;

        let source = HttpSource::new(base).unwrap();
        let err = source.fetch(1, &mut |_| {}).await.expect_err("should fail");
        match err {
            DashError::Fetch(msg) => {
                assert!(msg.contains("resource payload mismatch"), "{msg}");
                assert!(msg.contains("[0].resource"), "{msg}");
            }
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_source_reports_network_errors() {
        let source = HttpSource::new(unused_base_url().await).unwrap();
        let err = source.fetch(1, &mut |_| {}).await.expect_err("should fail");
        assert!(matches!(err, DashError::Fetch(_)));
    }

    #[tokio::test]
    async fn placeholder_maps_posts_to_records() {
        let body = posts_json(12);
        let base = serve(Router::new().route(
            "/posts",
            get(move || {
                let body = body.clone();
                async move { body }
            }),
        ))
        .await;

        let source = PlaceholderSource::new(HttpSource::new(base).unwrap());
        let mut seen = Vec::new();
        let records = source.fetch(3, &mut |p| seen.push(p)).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(seen.last(), Some(&100));
        for (index, record) in records.iter().enumerate() {
            let id = index + 1;
            let metadata = record.metadata();
            assert_eq!(
                metadata.identifier.key,
                format!("resource-{id}-{}", metadata.resource_type.to_lowercase())
            );
            assert!(metadata.identifier.uid.starts_with(&format!("uid-{id}-")));
            assert_eq!(record.description(), DESCRIPTIONS[index]);
            assert_ne!(metadata.state, ProcessingState::Unspecified);
        }
    }

    #[tokio::test]
    async fn placeholder_falls_back_on_failure() {
        let base = serve(Router::new().route(
            "/posts",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;

        let source = PlaceholderSource::new(HttpSource::new(base).unwrap());
        let mut seen = Vec::new();
        let records = source.fetch(7, &mut |p| seen.push(p)).await.unwrap();
        assert_eq!(records.len(), 7);
        assert_eq!(seen.last(), Some(&100));
    }

    #[tokio::test]
    async fn placeholder_cancel_during_request_skips_fallback() {
        let cancel = CancelFlag::new();
        let on_request = cancel.clone();
        let base = serve(Router::new().route(
            "/posts",
            get(move || {
                on_request.cancel();
                async { StatusCode::SERVICE_UNAVAILABLE }
            }),
        ))
        .await;

        let source = PlaceholderSource::with_fallback(
            HttpSource::new(base).unwrap(),
            GeneratorSource::with_cancel(cancel.clone()),
        );
        let mut seen = Vec::new();
        let result = source.fetch(7, &mut |p| seen.push(p)).await;
        assert!(matches!(result, Err(DashError::Cancelled)));
        assert_eq!(seen, [0]);
    }

    #[tokio::test]
    async fn placeholder_ignores_cancel_from_earlier_run() {
        let base = serve(Router::new().route(
            "/posts",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;

        let cancel = CancelFlag::new();
        let source = PlaceholderSource::with_fallback(
            HttpSource::new(base).unwrap(),
            GeneratorSource::with_cancel(cancel.clone()),
        );
        cancel.cancel();
        let records = source.fetch(4, &mut |_| {}).await.unwrap();
        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn placeholder_generates_large_counts_locally() {
        let source = PlaceholderSource::new(HttpSource::new(unused_base_url().await).unwrap());
        let records = source.fetch(500, &mut |_| {}).await.unwrap();
        assert_eq!(records.len(), 500);
    }

    #[tokio::test]
    async fn generator_source_can_be_cancelled_mid_run() {
        let source = GeneratorSource::new();
        let cancel = source.cancel_handle();
        let result = source
            .fetch(1_000, &mut |p| {
                if p >= 5 {
                    cancel.cancel();
                }
            })
            .await;
        assert!(matches!(result, Err(DashError::Cancelled)));

        // The next run is unaffected by the earlier cancel.
        let records = source.fetch(10, &mut |_| {}).await.unwrap();
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn client_dispatches_by_kind() {
        let cfg = DashConfig::default();
        let client = ResourceClient::new(SourceKind::Sample, &cfg).unwrap();
        assert_eq!(client.kind(), SourceKind::Sample);
        let records = client.fetch(3, &mut |_| {}).await.unwrap();
        assert_eq!(records.len(), 3);

        let client = ResourceClient::new(SourceKind::Local, &cfg).unwrap();
        let records = client.fetch(42, &mut |_| {}).await.unwrap();
        assert_eq!(records.len(), 42);
    }

    #[test]
    fn parses_source_kinds() {
        assert_eq!("Remote".parse::<SourceKind>().unwrap(), SourceKind::Remote);
        assert_eq!(SourceKind::Placeholder.to_string(), "placeholder");
        assert!("ftp".parse::<SourceKind>().is_err());
    }
}
