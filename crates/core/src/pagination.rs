//! Page arithmetic for the product table.

use serde::Serialize;

/// How many page numbers to show on each side of the current page.
pub const DEFAULT_WINDOW_RADIUS: u32 = 2;

/// Number of pages needed for `total_items`; always at least one.
///
/// A `page_size` of zero is treated as one so the result is never undefined.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // bounded by u32::MAX above
pub const fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if total_items == 0 {
        return 1;
    }
    let page_size = if page_size == 0 { 1 } else { page_size as u64 };
    let pages = total_items.div_ceil(page_size);
    if pages > u32::MAX as u64 {
        u32::MAX
    } else {
        pages as u32
    }
}

/// Inclusive range of page numbers shown around the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub start: u32,
    pub end: u32,
}

impl PageWindow {
    /// Page numbers in the window, in order.
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Page window of `radius` pages around `current_page`, clamped to
/// `1..=total_pages`.
#[must_use]
pub const fn page_window(current_page: u32, total_pages: u32, radius: u32) -> PageWindow {
    let start = current_page.saturating_sub(radius);
    let end = current_page.saturating_add(radius);
    PageWindow {
        start: if start < 1 { 1 } else { start },
        end: if end > total_pages { total_pages } else { end },
    }
}

/// Pagination state after the most recent successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub current_page: u32,
    pub total_items: u64,
    pub page_size: u32,
    pub total_pages: u32,
}

impl PaginationState {
    /// Fresh state for a dashboard that has not loaded anything yet.
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self::from_fetch(1, 0, page_size)
    }

    /// State derived from a fetched page.
    #[must_use]
    pub const fn from_fetch(current_page: u32, total_items: u64, page_size: u32) -> Self {
        let page_size = if page_size == 0 { 1 } else { page_size };
        Self {
            current_page,
            total_items,
            page_size,
            total_pages: total_pages(total_items, page_size),
        }
    }

    #[must_use]
    pub const fn is_prev_disabled(&self) -> bool {
        self.current_page <= 1
    }

    /// Also disabled when a lenient backend served a page past the end.
    #[must_use]
    pub const fn is_next_disabled(&self) -> bool {
        self.current_page >= self.total_pages
    }

    /// Whether `page` is a page the user may navigate to.
    #[must_use]
    pub const fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }

    /// Window of page links around the current page.
    #[must_use]
    pub const fn window(&self) -> PageWindow {
        page_window(self.current_page, self.total_pages, DEFAULT_WINDOW_RADIUS)
    }

    /// Caption shown under the table, e.g. `Showing 50 of 312 products`.
    #[must_use]
    pub fn page_info(&self, shown: usize) -> String {
        format!("Showing {shown} of {} products", self.total_items)
    }
}
