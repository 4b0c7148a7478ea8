//! Page arithmetic over a filtered record list.
//!
//! Pages are 0-based internally and 1-based in anything a user reads or types. The page index
//! always satisfies `page < page_count(len, page_size)`; callers reset to page 0 whenever the
//! length or the page size changes.

use crate::{DashError, DashResult};
use std::ops::Range;

/// Number of pages needed for `len` items. Never less than one, so an empty list still has a
/// (blank) first page.
pub fn page_count(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Item positions covered by `page`, clipped to `len`. Out-of-range pages are empty.
pub fn page_bounds(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let start = page.saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// The items on `page`. The last page may be partial; an empty input yields an empty slice.
pub fn slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    &items[page_bounds(items.len(), page, page_size)]
}

/// Resolve a typed, 1-based page number against `page_count`.
///
/// Returns `None` for non-numeric input (the caller leaves the page unchanged); numeric input is
/// clamped into `0..page_count`.
pub fn go_to_page(input: &str, page_count: usize) -> Option<usize> {
    let requested = input.trim().parse::<i64>().ok()?;
    let last = page_count.max(1) - 1;
    let zero_based = requested.saturating_sub(1).max(0);
    Some(usize::try_from(zero_based).map_or(last, |page| page.min(last)))
}

/// Current page and page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Pager {
    /// # Errors
    ///
    /// Returns [`DashError::InvalidInput`] if `page_size` is zero.
    pub fn new(page_size: usize) -> DashResult<Self> {
        if page_size == 0 {
            return Err(DashError::InvalidInput("page size must be positive".into()));
        }
        Ok(Self { page: 0, page_size })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, len: usize) -> usize {
        page_count(len, self.page_size)
    }

    pub fn bounds(&self, len: usize) -> Range<usize> {
        page_bounds(len, self.page, self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.page + 1 < self.page_count(len)
    }

    /// Move forward one page. Returns whether the page changed.
    pub fn next(&mut self, len: usize) -> bool {
        if self.has_next(len) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page. Returns whether the page changed.
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Change the page size and return to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidInput`] if `page_size` is zero; the pager is left unchanged.
    pub fn set_page_size(&mut self, page_size: usize) -> DashResult<()> {
        *self = Self::new(page_size)?;
        Ok(())
    }

    /// Apply a typed page number. Returns whether the input was numeric.
    pub fn go_to(&mut self, input: &str, len: usize) -> bool {
        match go_to_page(input, self.page_count(len)) {
            Some(page) => {
                self.page = page;
                true
            }
            None => false,
        }
    }

    /// `"Page 1 of 3"`.
    pub fn label(&self, len: usize) -> String {
        format!("Page {} of {}", self.page + 1, self.page_count(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_at_least_one() {
        assert_eq!(page_count(0, 100), 1);
        assert_eq!(page_count(30, 100), 1);
        assert_eq!(page_count(30, 25), 2);
        assert_eq!(page_count(50, 25), 2);
        assert_eq!(page_count(51, 25), 3);
    }

    #[test]
    fn pages_partition_the_input() {
        let items: Vec<u32> = (0..103).collect();
        for page_size in [1, 7, 25, 100, 103, 500] {
            let pages = page_count(items.len(), page_size);
            let rebuilt: Vec<u32> = (0..pages)
                .flat_map(|page| slice(&items, page, page_size).iter().copied())
                .collect();
            assert_eq!(rebuilt, items, "page size {page_size}");
        }
    }

    #[test]
    fn slice_clips_last_page_and_empty_input() {
        let items: Vec<u32> = (0..30).collect();
        assert_eq!(slice(&items, 1, 25), &items[25..30]);
        assert!(slice(&items, 5, 25).is_empty());
        let empty: [u32; 0] = [];
        assert!(slice(&empty, 0, 25).is_empty());
    }

    #[test]
    fn go_to_page_clamps_and_ignores_garbage() {
        assert_eq!(go_to_page("1", 4), Some(0));
        assert_eq!(go_to_page(" 3 ", 4), Some(2));
        assert_eq!(go_to_page("0", 4), Some(0));
        assert_eq!(go_to_page("-12", 4), Some(0));
        assert_eq!(go_to_page("4", 4), Some(3));
        assert_eq!(go_to_page("99", 4), Some(3));
        assert_eq!(go_to_page("99999999999999999", 4), Some(3));
        assert_eq!(go_to_page("abc", 4), None);
        assert_eq!(go_to_page("", 4), None);
    }

    #[test]
    fn pager_walks_pages() {
        let mut pager = Pager::new(25).unwrap();
        assert_eq!(pager.label(30), "Page 1 of 2");
        assert!(!pager.has_prev());
        assert!(pager.next(30));
        assert_eq!(pager.label(30), "Page 2 of 2");
        assert!(!pager.next(30));
        assert_eq!(pager.bounds(30), 25..30);
        assert!(pager.go_to("1", 30));
        assert_eq!(pager.page(), 0);
        assert!(!pager.go_to("first", 30));
        assert_eq!(pager.page(), 0);
    }

    #[test]
    fn set_page_size_resets_page() {
        let mut pager = Pager::new(10).unwrap();
        pager.next(100);
        pager.next(100);
        assert_eq!(pager.page(), 2);
        pager.set_page_size(50).unwrap();
        assert_eq!(pager.page(), 0);
        assert_eq!(pager.page_size(), 50);
        assert!(pager.set_page_size(0).is_err());
        assert_eq!(pager.page_size(), 50);
    }
}
