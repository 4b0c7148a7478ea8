//! Dashboard runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the record client and
//! the dashboard. Nothing below the composition root reads process environment variables.

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_FETCH_COUNT, DEFAULT_OVERSCAN, DEFAULT_PAGE_SIZE,
    DEFAULT_ROW_HEIGHT, DEFAULT_VIEWPORT_HEIGHT, MAX_RECORD_COUNT,
};
use crate::{DashError, DashResult};
use std::str::FromStr;

/// Environment variable holding the record source base URL.
pub const ENV_API_BASE_URL: &str = "EHR_API_BASE_URL";
/// Environment variable holding the initial record count.
pub const ENV_DEFAULT_COUNT: &str = "EHR_DASH_DEFAULT_COUNT";
/// Environment variable holding the initial page size.
pub const ENV_PAGE_SIZE: &str = "EHR_DASH_PAGE_SIZE";
/// Environment variable holding the overscan row count.
pub const ENV_OVERSCAN: &str = "EHR_DASH_OVERSCAN";

/// Dashboard configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashConfig {
    api_base_url: String,
    default_count: usize,
    page_size: usize,
    overscan: usize,
    row_height: u32,
    viewport_height: u32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            default_count: DEFAULT_FETCH_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            overscan: DEFAULT_OVERSCAN,
            row_height: DEFAULT_ROW_HEIGHT,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl DashConfig {
    /// Create a new `DashConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Config`] if the base URL is blank, the page size or row height is
    /// zero, or the default count exceeds [`MAX_RECORD_COUNT`].
    pub fn new(
        api_base_url: String,
        default_count: usize,
        page_size: usize,
        overscan: usize,
    ) -> DashResult<Self> {
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        if api_base_url.is_empty() {
            return Err(DashError::Config("api base URL cannot be empty".into()));
        }
        if page_size == 0 {
            return Err(DashError::Config("page size must be positive".into()));
        }
        if default_count > MAX_RECORD_COUNT {
            return Err(DashError::Config(format!(
                "default count cannot exceed {MAX_RECORD_COUNT}"
            )));
        }

        Ok(Self {
            api_base_url,
            default_count,
            page_size,
            overscan,
            ..Self::default()
        })
    }

    /// Resolve configuration from the process environment.
    ///
    /// Intended to be called once from a binary's `main` after `.env` has been loaded.
    pub fn from_env() -> DashResult<Self> {
        let base = std::env::var(ENV_API_BASE_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let default_count = env_value(
            ENV_DEFAULT_COUNT,
            std::env::var(ENV_DEFAULT_COUNT).ok(),
            DEFAULT_FETCH_COUNT,
        )?;
        let page_size = env_value(
            ENV_PAGE_SIZE,
            std::env::var(ENV_PAGE_SIZE).ok(),
            DEFAULT_PAGE_SIZE,
        )?;
        let overscan = env_value(
            ENV_OVERSCAN,
            std::env::var(ENV_OVERSCAN).ok(),
            DEFAULT_OVERSCAN,
        )?;

        Self::new(base, default_count, page_size, overscan)
    }

    /// Override the row geometry used by the windowed renderer.
    pub fn with_geometry(mut self, row_height: u32, viewport_height: u32) -> Self {
        self.row_height = row_height.max(1);
        self.viewport_height = viewport_height;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn default_count(&self) -> usize {
        self.default_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }
}

/// Parse an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn env_value<T: FromStr>(name: &str, value: Option<String>, default: T) -> DashResult<T> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| DashError::Config(format!("{name} has an invalid value: '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_value_falls_back_to_default() {
        assert_eq!(env_value("X", None, 7usize).unwrap(), 7);
        assert_eq!(env_value("X", Some("   ".into()), 7usize).unwrap(), 7);
        assert_eq!(env_value("X", Some(" 25 ".into()), 7usize).unwrap(), 25);
    }

    #[test]
    fn env_value_rejects_garbage() {
        let err = env_value("EHR_DASH_PAGE_SIZE", Some("lots".into()), 7usize)
            .expect_err("should reject non-numeric value");
        match err {
            DashError::Config(msg) => {
                assert!(msg.contains("EHR_DASH_PAGE_SIZE"));
                assert!(msg.contains("lots"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn new_normalises_base_url() {
        let cfg = DashConfig::new("  http://localhost:3000/ ".into(), 10, 25, 3).unwrap();
        assert_eq!(cfg.api_base_url(), "http://localhost:3000");
        assert_eq!(cfg.page_size(), 25);
        assert_eq!(cfg.overscan(), 3);
        assert_eq!(cfg.row_height(), DEFAULT_ROW_HEIGHT);
    }

    #[test]
    fn new_rejects_invalid_values() {
        assert!(DashConfig::new("".into(), 10, 25, 3).is_err());
        assert!(DashConfig::new("http://x".into(), 10, 0, 3).is_err());
        assert!(DashConfig::new("http://x".into(), MAX_RECORD_COUNT + 1, 25, 3).is_err());
    }

    #[test]
    fn geometry_keeps_row_height_positive() {
        let cfg = DashConfig::default().with_geometry(0, 120);
        assert_eq!(cfg.row_height(), 1);
        assert_eq!(cfg.viewport_height(), 120);
    }
}
