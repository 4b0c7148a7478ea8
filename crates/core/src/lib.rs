//! # Dash Core
//!
//! Core logic for the EHR resource dashboard.
//!
//! This crate holds the data pipeline behind the resource table:
//! - Record sources (synthetic generator, HTTP API, placeholder API, fixed sample set)
//! - Search filtering, column sorting and pagination
//! - Windowed rendering geometry for large pages
//! - The [`Dashboard`] state machine tying them together
//!
//! **No presentation concerns**: terminal drawing and HTTP serving belong in `dash-cli` and
//! `api-rest`.

pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod generator;
pub mod pagination;
pub mod progress;
pub mod sort;
pub mod source;
pub mod stats;
pub mod window;

pub use config::DashConfig;
pub use dashboard::{Dashboard, LoadState, LoadTicket, ReadyView, TableView};
pub use error::{DashError, DashResult};
pub use generator::{generate, generate_with_progress, CancelFlag};
pub use pagination::Pager;
pub use sort::{SortColumn, SortDirection, SortSpec};
pub use source::{ResourceClient, ResourceSource, SourceKind};
pub use stats::ResourceStats;
pub use window::{VisibleWindow, Window};

pub use ehr_resource::{ResourceWrapper, Resources};
