//! Numbered pager for list tables.
//!
//! Each link carries two URLs: the full page (plain navigation) and the
//! table fragment (HTMX swap), both keeping the current filters.

use shopfront_core::Page;

/// One numbered link.
#[derive(Debug, Clone)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub fragment_href: String,
    pub current: bool,
    /// Pages were skipped between the previous link and this one
    pub gap_before: bool,
}

/// Pager state for templates.
#[derive(Debug, Clone)]
pub struct Pager {
    pub links: Vec<PageLink>,
    pub prev: Option<PageLink>,
    pub next: Option<PageLink>,
}

impl Pager {
    /// Build links to `page_path` and `fragment_path`; `filters` is the
    /// already-encoded query string minus `page` (empty or `&k=v...`).
    #[must_use]
    pub fn new<T>(page: &Page<T>, page_path: &str, fragment_path: &str, filters: &str) -> Self {
        let current = page.clamp(page.page);
        let link = |number: u32| PageLink {
            number,
            href: format!("{page_path}?page={number}{filters}"),
            fragment_href: format!("{fragment_path}?page={number}{filters}"),
            current: number == current,
            gap_before: false,
        };

        let mut previous = 0;
        let links = page
            .page_numbers()
            .into_iter()
            .map(|number| {
                let gap_before = previous != 0 && number > previous + 1;
                previous = number;
                PageLink {
                    gap_before,
                    ..link(number)
                }
            })
            .collect();

        Self {
            links,
            prev: page.has_prev().then(|| link(page.clamp(current - 1))),
            next: page.has_next().then(|| link(page.clamp(current + 1))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::PageRequest;

    use super::*;

    #[test]
    fn test_links_keep_filters() {
        let page: Page<()> = Page::new(vec![], PageRequest::new(2, 6), 14);
        let pager = Pager::new(&page, "/products", "/products/table", "&per_page=6&q=%C3%A1o");

        assert_eq!(pager.links.len(), 3);
        assert!(pager.links[1].current);
        assert_eq!(
            pager.prev.as_ref().unwrap().href,
            "/products?page=1&per_page=6&q=%C3%A1o"
        );
        assert_eq!(
            pager.next.as_ref().unwrap().fragment_href,
            "/products/table?page=3&per_page=6&q=%C3%A1o"
        );
    }

    #[test]
    fn test_single_page_has_no_neighbours() {
        let page: Page<()> = Page::new(vec![], PageRequest::new(1, 10), 2);
        let pager = Pager::new(&page, "/users", "/users", "");
        assert!(pager.prev.is_none());
        assert!(pager.next.is_none());
        assert_eq!(pager.links.len(), 1);
    }

    #[test]
    fn test_long_listing_marks_gaps() {
        let page: Page<()> = Page::new(vec![], PageRequest::new(10, 6), 6 * 20);
        let pager = Pager::new(&page, "/products", "/products/table", "");

        let numbers: Vec<u32> = pager.links.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 8, 9, 10, 11, 12, 20]);
        let gaps: Vec<bool> = pager.links.iter().map(|l| l.gap_before).collect();
        assert_eq!(gaps, vec![false, true, false, false, false, false, true]);
    }
}
