//! Constants used throughout the dashboard core crate.
//!
//! Limits and defaults live here so the record source endpoint, the clients and the table agree
//! on them.

/// Upper bound on the number of records a single generation or fetch may produce.
pub const MAX_RECORD_COUNT: usize = 1_000_000;

/// Default base URL of the record source. This is a public placeholder content service.
pub const DEFAULT_API_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Path of the record source endpoint, relative to the base URL.
pub const RESOURCES_PATH: &str = "/api/resources";

/// Path of the placeholder posts endpoint, relative to the base URL.
pub const PLACEHOLDER_POSTS_PATH: &str = "/posts";

/// Largest request the placeholder endpoint is used for; bigger counts generate locally.
pub const PLACEHOLDER_MAX_COUNT: usize = 10;

/// Records requested on first load when nothing else is configured.
pub const DEFAULT_FETCH_COUNT: usize = 100;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [25, 50, 100, 250, 500];

/// Initial page size.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Estimated height of one table row.
pub const DEFAULT_ROW_HEIGHT: u32 = 40;

/// Height of the scrollable table body.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 600;

/// Rows rendered beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN: usize = 10;

/// Number of progress checkpoints across one generation run (one per percent).
pub const PROGRESS_STEPS: usize = 100;
