//! Resource table state: what is loaded, and how the user is looking at it.
//!
//! The table moves through `Loading -> Ready | Error`. `Ready` re-enters `Loading` on refresh and
//! `Error` re-enters it on retry; nothing retries on its own.
//!
//! View state (query, page, page size, sort, typed page number) sits on top of the loaded
//! collection. The pipeline from loaded records to rendered rows is:
//!
//! ```text
//! records -> filter(query) -> sort -> page slice -> window(scroll)
//! ```
//!
//! Invariants kept here:
//! - a query or page-size change returns to page 0
//! - any page change (including a new collection) scrolls back to the top
//! - each load is identified by a [`LoadTicket`]; completions and progress for anything but the
//!   most recent ticket are discarded
//!
//! The dashboard performs no I/O. A driver asks it for a ticket, runs a
//! [`ResourceSource`](crate::source::ResourceSource) and hands the result back.

use crate::config::DashConfig;
use crate::filter::filter_indices;
use crate::generator::clamp_count;
use crate::pagination::Pager;
use crate::sort::{sort_indices, SortColumn, SortSpec};
use crate::window::{VisibleWindow, Window};
use crate::DashResult;
use ehr_resource::ResourceWrapper;
use std::sync::Arc;

/// Count label shown while a load is in flight.
pub const LOADING_LABEL: &str = "Loading resource data...";

/// Error text used when a failure carries no message of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Failed to fetch resource data";

// ============================================================================
// LOAD STATE
// ============================================================================

/// What the table currently holds.
#[derive(Clone, Debug)]
pub enum LoadState {
    Loading { progress: u8 },
    Ready(Arc<Vec<ResourceWrapper>>),
    Error(String),
}

/// Identifies one load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    id: u64,
    count: usize,
}

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of records this load should request.
    pub fn count(&self) -> usize {
        self.count
    }
}

// ============================================================================
// VIEW STATE
// ============================================================================

/// Presentation state owned by the table.
#[derive(Clone, Debug)]
pub struct ViewState {
    query: String,
    pager: Pager,
    sort: Option<SortSpec>,
    /// 1-based page number shown in the page input; always mirrors the current page.
    page_input: String,
}

impl ViewState {
    fn new(pager: Pager) -> Self {
        Self {
            query: String::new(),
            pager,
            sort: None,
            page_input: "1".into(),
        }
    }

    fn sync_page_input(&mut self) {
        self.page_input = (self.pager.page() + 1).to_string();
    }
}

// ============================================================================
// TABLE VIEW
// ============================================================================

/// Everything needed to draw a ready table.
#[derive(Clone, Debug)]
pub struct ReadyView<'a> {
    pub total_count: usize,
    pub filtered_count: usize,
    pub query: &'a str,
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub page_input: &'a str,
    pub has_prev: bool,
    pub has_next: bool,
    /// Rows on the current page (materialised or not).
    pub page_rows: usize,
    /// Window over the current page; `window.range` indexes into the page.
    pub window: VisibleWindow,
    /// The materialised rows, in display order.
    pub rows: Vec<&'a ResourceWrapper>,
}

impl ReadyView<'_> {
    /// `"2 resources found"`.
    pub fn count_label(&self) -> String {
        format!("{} resources found", self.filtered_count)
    }

    /// `"Page 1 of 2"`.
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page + 1, self.page_count)
    }

    /// True when no record survives the current query.
    pub fn is_empty(&self) -> bool {
        self.filtered_count == 0
    }
}

/// Snapshot of the table for rendering.
#[derive(Clone, Debug)]
pub enum TableView<'a> {
    Loading { progress: u8 },
    Error { message: &'a str },
    Ready(ReadyView<'a>),
}

impl TableView<'_> {
    /// Header count text. `None` while an error replaces the table.
    pub fn count_label(&self) -> Option<String> {
        match self {
            TableView::Loading { .. } => Some(LOADING_LABEL.to_string()),
            TableView::Error { .. } => None,
            TableView::Ready(ready) => Some(ready.count_label()),
        }
    }
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// The resource table controller.
#[derive(Clone, Debug)]
pub struct Dashboard {
    state: LoadState,
    view: ViewState,
    window: Window,
    /// Filtered and sorted positions into the ready collection.
    rows: Vec<usize>,
    last_ticket: u64,
    pending: Option<u64>,
    /// Count of the last successful load; reused when a refresh names no count.
    last_count: usize,
}

impl Dashboard {
    /// A dashboard waiting for its first load.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidInput`](crate::DashError::InvalidInput) if the configured page
    /// size is zero.
    pub fn new(cfg: &DashConfig) -> DashResult<Self> {
        Ok(Self {
            state: LoadState::Loading { progress: 0 },
            view: ViewState::new(Pager::new(cfg.page_size())?),
            window: Window::new(cfg.row_height(), cfg.viewport_height(), cfg.overscan()),
            rows: Vec::new(),
            last_ticket: 0,
            pending: None,
            last_count: clamp_count(cfg.default_count()),
        })
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// The loaded collection, if any.
    pub fn records(&self) -> Option<&[ResourceWrapper]> {
        match &self.state {
            LoadState::Ready(records) => Some(records.as_slice()),
            _ => None,
        }
    }

    pub fn query(&self) -> &str {
        &self.view.query
    }

    pub fn page(&self) -> usize {
        self.view.pager.page()
    }

    pub fn page_size(&self) -> usize {
        self.view.pager.page_size()
    }

    pub fn page_count(&self) -> usize {
        self.view.pager.page_count(self.rows.len())
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.view.sort
    }

    pub fn page_input(&self) -> &str {
        &self.view.page_input
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn filtered_count(&self) -> usize {
        self.rows.len()
    }

    pub fn last_count(&self) -> usize {
        self.last_count
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Enter `Loading` and issue a ticket for a new load of `count` records (or the last
    /// successful count). Any earlier ticket is superseded.
    pub fn begin_load(&mut self, count: Option<usize>) -> LoadTicket {
        self.last_ticket += 1;
        let ticket = LoadTicket {
            id: self.last_ticket,
            count: clamp_count(count.unwrap_or(self.last_count)),
        };
        if let Some(previous) = self.pending.replace(ticket.id) {
            tracing::debug!(previous, current = ticket.id, "superseding pending load");
        }
        self.state = LoadState::Loading { progress: 0 };
        self.rows.clear();
        ticket
    }

    /// Refresh from `Ready` or `Error`. Ignored while a load is in flight.
    pub fn refresh(&mut self, count: Option<usize>) -> Option<LoadTicket> {
        if self.is_loading() {
            return None;
        }
        Some(self.begin_load(count))
    }

    /// Retry after an error. Only valid from `Error`.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        match self.state {
            LoadState::Error(_) => Some(self.begin_load(None)),
            _ => None,
        }
    }

    /// Record progress for `ticket`. Progress never moves backwards. Returns whether it applied.
    pub fn report_progress(&mut self, ticket: LoadTicket, percent: u8) -> bool {
        if self.pending != Some(ticket.id) {
            return false;
        }
        match &mut self.state {
            LoadState::Loading { progress } => {
                *progress = (*progress).max(percent.min(100));
                true
            }
            _ => false,
        }
    }

    /// Install the outcome of `ticket`'s load. Returns `false` (and changes nothing) if the
    /// ticket has been superseded.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: DashResult<Vec<ResourceWrapper>>,
    ) -> bool {
        if self.pending != Some(ticket.id) {
            tracing::debug!(ticket = ticket.id, "discarding superseded load result");
            return false;
        }
        self.pending = None;

        match result {
            Ok(records) => {
                tracing::info!(records = records.len(), "resource data loaded");
                self.last_count = ticket.count;
                self.state = LoadState::Ready(Arc::new(records));
                self.recompute_rows();
                self.reset_page();
            }
            Err(e) => {
                tracing::error!("Error fetching resource data: {}", e);
                let message = e.to_string();
                self.state = LoadState::Error(if message.trim().is_empty() {
                    DEFAULT_ERROR_MESSAGE.to_string()
                } else {
                    message
                });
            }
        }
        true
    }

    // ------------------------------------------------------------------------
    // View changes
    // ------------------------------------------------------------------------

    /// Change the search text. Returns to page 0.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.view.query = query.into();
        self.recompute_rows();
        self.reset_page();
    }

    /// Change the page size. Returns to page 0.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidInput`](crate::DashError::InvalidInput) for a zero page size;
    /// the view is left unchanged.
    pub fn set_page_size(&mut self, page_size: usize) -> DashResult<()> {
        self.view.pager.set_page_size(page_size)?;
        self.reset_page();
        Ok(())
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.view.pager.next(self.rows.len());
        if moved {
            self.page_changed();
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.view.pager.prev();
        if moved {
            self.page_changed();
        }
        moved
    }

    /// Jump to a typed, 1-based page number. Non-numeric input leaves the page as it is and
    /// the page input showing that page.
    pub fn go_to_page(&mut self, input: &str) -> bool {
        let applied = self.view.pager.go_to(input, self.rows.len());
        if applied {
            self.page_changed();
        } else {
            self.view.sync_page_input();
        }
        applied
    }

    /// Header click on `column`.
    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.view.sort = Some(SortSpec::toggle(self.view.sort, column));
        self.recompute_rows();
    }

    pub fn clear_sort(&mut self) {
        self.view.sort = None;
        self.recompute_rows();
    }

    // ------------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------------

    fn page_row_count(&self) -> usize {
        self.view.pager.bounds(self.rows.len()).len()
    }

    pub fn scroll_to(&mut self, offset: u64) {
        let rows = self.page_row_count();
        self.window.scroll_to(offset, rows);
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let rows = self.page_row_count();
        self.window.scroll_by(delta, rows);
    }

    /// Scroll by whole rows (negative scrolls up).
    pub fn scroll_rows(&mut self, delta: i64) {
        self.scroll_by(delta.saturating_mul(i64::from(self.window.row_height())));
    }

    pub fn set_viewport_height(&mut self, viewport_height: u32) {
        let rows = self.page_row_count();
        self.window.set_viewport_height(viewport_height, rows);
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Snapshot for rendering.
    pub fn view(&self) -> TableView<'_> {
        let records = match &self.state {
            LoadState::Loading { progress } => {
                return TableView::Loading {
                    progress: *progress,
                }
            }
            LoadState::Error(message) => return TableView::Error { message },
            LoadState::Ready(records) => records,
        };

        let pager = &self.view.pager;
        let page_positions = &self.rows[pager.bounds(self.rows.len())];
        let window = self.window.compute(page_positions.len());
        let rows = page_positions[window.range.clone()]
            .iter()
            .map(|&index| &records[index])
            .collect();

        TableView::Ready(ReadyView {
            total_count: records.len(),
            filtered_count: self.rows.len(),
            query: &self.view.query,
            sort: self.view.sort,
            page: pager.page(),
            page_count: pager.page_count(self.rows.len()),
            page_size: pager.page_size(),
            page_input: &self.view.page_input,
            has_prev: pager.has_prev(),
            has_next: pager.has_next(self.rows.len()),
            page_rows: page_positions.len(),
            window,
            rows,
        })
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn recompute_rows(&mut self) {
        self.rows = match &self.state {
            LoadState::Ready(records) => {
                let mut rows = filter_indices(records, &self.view.query);
                if let Some(spec) = self.view.sort {
                    sort_indices(records, &mut rows, spec);
                }
                rows
            }
            _ => Vec::new(),
        };
    }

    fn reset_page(&mut self) {
        self.view.pager.reset();
        self.page_changed();
    }

    fn page_changed(&mut self) {
        self.window.scroll_to_top();
        self.view.sync_page_input();
    }
}
