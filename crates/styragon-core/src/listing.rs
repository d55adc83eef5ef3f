//! Filter/page state of a public listing and stale-response detection.
//!
//! Every change to the search term, category or page bumps a generation
//! counter. A load started under an older generation is discarded when it
//! completes, so a slow response can never overwrite a newer one.

use crate::pagination::{paginate, Pagination};
use crate::query::{ContentFilter, Ordering, DEFAULT_PAGE_SIZE};
use crate::selection::CategorySelection;

/// Identifies the state a request was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Monotonic generation counter.
#[derive(Debug, Default)]
pub struct RequestTracker {
    generation: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates every ticket issued so far.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Ticket for a request issued now.
    pub fn begin(&mut self) -> RequestTicket {
        self.generation += 1;
        RequestTicket(self.generation)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.generation
    }
}

/// Search, category and page of the paginated blog index.
#[derive(Debug)]
pub struct ListingState {
    search_term: String,
    category: CategorySelection,
    requested_page: u32,
    page_size: u32,
    tracker: RequestTracker,
}

impl Default for ListingState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListingState {
    pub fn new(page_size: u32) -> Self {
        Self {
            search_term: String::new(),
            category: CategorySelection::All,
            requested_page: 1,
            page_size: page_size.max(1),
            tracker: RequestTracker::new(),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn category(&self) -> &CategorySelection {
        &self.category
    }

    pub fn requested_page(&self) -> u32 {
        self.requested_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// A new search term invalidates the page position.
    pub fn set_search(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.requested_page = 1;
        self.tracker.invalidate();
    }

    /// A new category invalidates the page position.
    pub fn set_category(&mut self, category: CategorySelection) {
        self.category = category;
        self.requested_page = 1;
        self.tracker.invalidate();
    }

    pub fn go_to_page(&mut self, page: u32) {
        if page != self.requested_page {
            self.requested_page = page.max(1);
            self.tracker.invalidate();
        }
    }

    /// Server-side filter for the current state, for published posts.
    ///
    /// `category_slug` is the slug of the selected category; the selector
    /// holds the display name.
    pub fn to_filter(&self, category_slug: Option<&str>) -> ContentFilter {
        ContentFilter {
            search: Some(self.search_term.clone()).filter(|s| !s.trim().is_empty()),
            category: category_slug.map(str::to_string),
            published: Some(true),
            ordering: Some(Ordering::desc("published_at")),
            page: Some(self.requested_page),
            page_size: Some(self.page_size),
            ..ContentFilter::default()
        }
    }

    /// Starts a load for the current state.
    pub fn begin_load(&mut self) -> RequestTicket {
        self.tracker.begin()
    }

    /// Applies a completed load. Returns `None` when the state changed
    /// since `ticket` was issued and the response must be dropped.
    ///
    /// On success the requested page is clamped to what exists.
    pub fn complete_load(&mut self, ticket: RequestTicket, total_count: u64) -> Option<Pagination> {
        if !self.tracker.is_current(ticket) {
            return None;
        }
        let pagination = paginate(total_count, self.page_size, self.requested_page);
        self.requested_page = pagination.effective_page;
        Some(pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_resets_page() {
        let mut state = ListingState::default();
        state.go_to_page(3);
        assert_eq!(state.requested_page(), 3);
        state.set_search("rust");
        assert_eq!(state.requested_page(), 1);
    }

    #[test]
    fn test_category_resets_page() {
        let mut state = ListingState::default();
        state.go_to_page(3);
        state.set_category(CategorySelection::Named("Design".into()));
        assert_eq!(state.requested_page(), 1);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = ListingState::default();
        let first = state.begin_load();
        state.set_search("new term");
        let second = state.begin_load();

        assert_eq!(state.complete_load(first, 100), None);
        assert!(state.complete_load(second, 100).is_some());
    }

    #[test]
    fn test_same_page_keeps_ticket_valid() {
        let mut state = ListingState::default();
        state.go_to_page(2);
        let ticket = state.begin_load();
        state.go_to_page(2);
        assert!(state.complete_load(ticket, 47).is_some());
    }

    #[test]
    fn test_complete_load_clamps_page() {
        let mut state = ListingState::default();
        state.go_to_page(10);
        let ticket = state.begin_load();
        let pagination = state.complete_load(ticket, 47).unwrap();
        assert_eq!(pagination.effective_page, 6);
        assert_eq!(state.requested_page(), 6);
    }

    #[test]
    fn test_filter_for_state() {
        let mut state = ListingState::default();
        state.set_search("  ");
        state.go_to_page(2);
        let filter = state.to_filter(Some("design"));
        assert_eq!(filter.search, None);
        assert_eq!(filter.category.as_deref(), Some("design"));
        assert_eq!(filter.published, Some(true));
        assert_eq!(filter.limit_offset(), Some((9, 9)));
    }
}
