//! Windowed (virtualised) row rendering.
//!
//! Given `n` rows of estimated height `row_height` and a viewport of `viewport_height`, only the
//! rows intersecting the viewport, widened by `overscan` rows on each side, are materialised.
//! Spacers before and after the window keep the total scroll extent equal to `n * row_height`.

use std::ops::Range;

/// Rows to materialise plus the space reserved around them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleWindow {
    /// Row positions to render, `lo..hi`.
    pub range: Range<usize>,
    /// Height reserved above the first rendered row.
    pub leading_spacer: u64,
    /// Height reserved below the last rendered row.
    pub trailing_spacer: u64,
    /// Estimated height of every row together.
    pub total_height: u64,
}

impl VisibleWindow {
    pub fn empty() -> Self {
        Self {
            range: 0..0,
            leading_spacer: 0,
            trailing_spacer: 0,
            total_height: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Scroll state and geometry of the table body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    row_height: u32,
    viewport_height: u32,
    overscan: usize,
    scroll_offset: u64,
}

impl Window {
    pub fn new(row_height: u32, viewport_height: u32, overscan: usize) -> Self {
        Self {
            row_height: row_height.max(1),
            viewport_height,
            overscan,
            scroll_offset: 0,
        }
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Estimated distance from the top of the list to the top of row `index`.
    pub fn offset_of(&self, index: usize) -> u64 {
        index as u64 * u64::from(self.row_height)
    }

    pub fn total_height(&self, rows: usize) -> u64 {
        self.offset_of(rows)
    }

    /// Largest valid scroll offset for `rows` rows.
    pub fn max_scroll(&self, rows: usize) -> u64 {
        self.total_height(rows)
            .saturating_sub(u64::from(self.viewport_height))
    }

    pub fn scroll_to(&mut self, offset: u64, rows: usize) {
        self.scroll_offset = offset.min(self.max_scroll(rows));
    }

    pub fn scroll_by(&mut self, delta: i64, rows: usize) {
        let target = if delta.is_negative() {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta.unsigned_abs())
        };
        self.scroll_to(target, rows);
    }

    /// Scroll so that row `index` sits at the top of the viewport (as far as possible).
    pub fn scroll_to_row(&mut self, index: usize, rows: usize) {
        self.scroll_to(self.offset_of(index), rows);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn set_viewport_height(&mut self, viewport_height: u32, rows: usize) {
        self.viewport_height = viewport_height;
        self.scroll_to(self.scroll_offset, rows);
    }

    /// Rows currently intersecting the viewport, without overscan.
    pub fn visible_range(&self, rows: usize) -> Range<usize> {
        if rows == 0 {
            return 0..0;
        }
        let height = u64::from(self.row_height);
        // A stale offset (rows shrank since the last scroll) is clamped here rather than trusted.
        let offset = self.scroll_offset.min(self.max_scroll(rows));
        let bottom = offset + u64::from(self.viewport_height);

        let first = (offset / height) as usize;
        let last = bottom.div_ceil(height) as usize;
        first.min(rows)..last.min(rows)
    }

    /// Compute the rendered window for `rows` rows.
    pub fn compute(&self, rows: usize) -> VisibleWindow {
        if rows == 0 {
            return VisibleWindow::empty();
        }

        let visible = self.visible_range(rows);
        let lo = visible.start.saturating_sub(self.overscan);
        let hi = visible.end.saturating_add(self.overscan).min(rows).max(lo);

        let total_height = self.total_height(rows);
        VisibleWindow {
            range: lo..hi,
            leading_spacer: self.offset_of(lo),
            trailing_spacer: total_height - self.offset_of(hi),
            total_height,
        }
    }
}
