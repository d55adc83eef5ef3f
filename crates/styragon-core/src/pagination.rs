//! Page windowing for listing surfaces.

use serde::Serialize;

/// Width of the numbered page-link window.
pub const VISIBLE_PAGE_WINDOW: u32 = 5;

/// Result of paginating a filtered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Requested page clamped into `[1, total_pages]`.
    pub effective_page: u32,
    /// At least 1, even for an empty result set.
    pub total_pages: u32,
    /// Page numbers to render as links, ascending.
    pub visible_pages: Vec<u32>,
    pub page_size: u32,
    pub total_count: u64,
}

impl Pagination {
    pub fn has_previous(&self) -> bool {
        self.effective_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.effective_page < self.total_pages
    }

    /// Zero-based index of the first item on the effective page.
    pub fn offset(&self) -> usize {
        (self.effective_page as usize - 1).saturating_mul(self.page_size as usize)
    }

    /// The effective page's slice of a fully loaded result set.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.page_size as usize).min(items.len());
        &items[start..end]
    }

    /// Navigation controls are hidden when everything fits on one page.
    pub fn needs_controls(&self) -> bool {
        self.total_pages > 1
    }
}

/// Computes page count, clamped page and the visible page-number window.
///
/// A `page_size` of zero is treated as one. Page numbers are `u32`, so a
/// count needing more than `u32::MAX` pages reports `u32::MAX` pages.
///
/// ```
/// use styragon_core::pagination::paginate;
///
/// let p = paginate(47, 9, 6);
/// assert_eq!(p.total_pages, 6);
/// assert_eq!(p.visible_pages, vec![2, 3, 4, 5, 6]);
/// ```
pub fn paginate(total_count: u64, page_size: u32, requested_page: u32) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total_count.div_ceil(u64::from(page_size)).max(1);
    let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
    let effective_page = requested_page.clamp(1, total_pages);

    Pagination {
        effective_page,
        total_pages,
        visible_pages: visible_window(effective_page, total_pages),
        page_size,
        total_count,
    }
}

fn visible_window(current: u32, total_pages: u32) -> Vec<u32> {
    let width = VISIBLE_PAGE_WINDOW.min(total_pages);
    let mut start = current.saturating_sub(VISIBLE_PAGE_WINDOW / 2).max(1);
    let end = start.saturating_add(width - 1).min(total_pages);
    if end - start + 1 < width {
        start = end.saturating_sub(width - 1).max(1);
    }
    (start..=end).collect()
}
