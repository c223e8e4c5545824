//! URL-driven pagination.
//!
//! The REST API pages with `_page`/`_limit` query parameters and reports the
//! unpaged count in an `X-Total-Count` header. The same arithmetic is used
//! when paging bundled sample data locally.

use serde::Serialize;

/// Largest page size any list accepts.
pub const MAX_LIMIT: u32 = 100;

/// Page sizes the admin product table offers.
pub const ADMIN_PER_PAGE_OPTIONS: [u32; 3] = [6, 9, 12];

/// Admin product table page size when none (or an unknown one) is requested.
pub const ADMIN_DEFAULT_PER_PAGE: u32 = 6;

/// Pages linked on either side of the current one.
pub const PAGER_WINDOW: u32 = 2;

/// A requested page: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request, clamping `page` to at least 1 and `limit` to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Build a request from a raw `page` query value.
    #[must_use]
    pub fn from_query(page: Option<&str>, limit: u32) -> Self {
        Self::new(parse_page(page), limit)
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items before this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }
}

/// Parse a `page` query value. Missing, non-numeric or `< 1` yields 1.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map_or(1, |p| u32::try_from(p).unwrap_or(u32::MAX))
}

/// Parse the admin `per_page` value, accepting only the offered sizes.
#[must_use]
pub fn admin_per_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| ADMIN_PER_PAGE_OPTIONS.contains(n))
        .unwrap_or(ADMIN_DEFAULT_PER_PAGE)
}

/// Read an `X-Total-Count` header value, falling back to `returned`
/// (the number of items actually in the response).
#[must_use]
pub fn parse_total_count(header: Option<&str>, returned: usize) -> u64 {
    header
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(returned as u64)
}

/// Number of pages needed for `total` items, never less than 1.
#[must_use]
pub fn total_pages(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX).max(1)
}

/// One page of results plus what is needed to render a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
        }
    }

    /// An empty first page.
    #[must_use]
    pub const fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.limit)
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Clamp a page number into `1..=total_pages`.
    #[must_use]
    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages())
    }

    /// Page numbers for pager links: the first and last page plus
    /// `PAGER_WINDOW` pages around the current one, ascending.
    #[must_use]
    pub fn page_numbers(&self) -> Vec<u32> {
        let last = self.total_pages();
        let current = self.clamp(self.page);
        let from = current.saturating_sub(PAGER_WINDOW).max(1);
        let to = current.saturating_add(PAGER_WINDOW).min(last);

        let mut numbers = Vec::with_capacity((to - from) as usize + 3);
        if from > 1 {
            numbers.push(1);
        }
        numbers.extend(from..=to);
        if to < last {
            numbers.push(last);
        }
        numbers
    }
}

/// Page through an in-memory slice.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let page_items = items
        .iter()
        .skip(request.offset())
        .take(request.limit() as usize)
        .cloned()
        .collect();
    Page::new(page_items, request, items.len() as u64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-4")), 1);
        assert_eq!(parse_page(Some(" 3 ")), 3);
    }

    #[test]
    fn test_request_clamps_limit() {
        assert_eq!(PageRequest::new(0, 0).limit(), 1);
        assert_eq!(PageRequest::new(2, 500).limit(), MAX_LIMIT);
        assert_eq!(PageRequest::new(3, 8).offset(), 16);
    }

    #[test]
    fn test_admin_per_page() {
        assert_eq!(admin_per_page(None), 6);
        assert_eq!(admin_per_page(Some("9")), 9);
        assert_eq!(admin_per_page(Some("12")), 12);
        assert_eq!(admin_per_page(Some("7")), 6);
        assert_eq!(admin_per_page(Some("lots")), 6);
    }

    #[test]
    fn test_total_count_header() {
        assert_eq!(parse_total_count(Some("42"), 8), 42);
        assert_eq!(parse_total_count(Some("nope"), 8), 8);
        assert_eq!(parse_total_count(None, 3), 3);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 8), 1);
        assert_eq!(total_pages(8, 8), 1);
        assert_eq!(total_pages(9, 8), 2);
        assert_eq!(total_pages(12, 6), 2);
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_prev());
        assert!(page.has_next());
        assert_eq!(page.clamp(10), 3);
        assert_eq!(page.clamp(0), 1);
        assert_eq!(page.page_numbers(), vec![1, 2, 3]);
    }

    #[test]
    fn test_page_numbers_window() {
        let middle = Page::<u8>::new(vec![], PageRequest::new(50, 10), 1_000);
        assert_eq!(middle.page_numbers(), vec![1, 48, 49, 50, 51, 52, 100]);

        let near_start = Page::<u8>::new(vec![], PageRequest::new(2, 10), 1_000);
        assert_eq!(near_start.page_numbers(), vec![1, 2, 3, 4, 100]);

        let past_end = Page::<u8>::new(vec![], PageRequest::new(u32::MAX, 1), 5_000_000);
        assert_eq!(
            past_end.page_numbers(),
            vec![1, 4_999_998, 4_999_999, 5_000_000]
        );
    }

    #[test]
    fn test_paginate_slice() {
        let items: Vec<u32> = (1..=10).collect();
        let page = paginate(&items, PageRequest::new(2, 4));
        assert_eq!(page.items, vec![5, 6, 7, 8]);
        assert_eq!(page.total, 10);

        let past_end = paginate(&items, PageRequest::new(9, 4));
        assert!(past_end.items.is_empty());
        assert!(!past_end.has_next());
    }
}
