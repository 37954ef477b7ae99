//! Page request/response types shared by every listing query

use serde::{Deserialize, Serialize};

/// Largest page a caller may request; bigger requests are clamped
pub const MAX_PAGE_SIZE: u32 = 500;

/// Which slice of a listing to fetch (pages are 0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// ```
    /// use core_catalog::repositories::PageRequest;
    ///
    /// let request = PageRequest::new(2, 25);
    /// assert_eq!(request.offset(), 50);
    /// assert_eq!(PageRequest::new(0, 10_000).limit(), 500);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// First page of the given size
    pub fn first(page_size: u32) -> Self {
        Self::new(0, page_size)
    }

    /// Rows to fetch, clamped to [`MAX_PAGE_SIZE`]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.min(MAX_PAGE_SIZE))
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * self.limit()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(50)
    }
}

/// One page of results plus the totals needed to navigate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching rows across all pages
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let page_size = request.limit() as u32;
        let total_pages = if page_size == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
        };

        Self {
            items,
            total,
            page: request.page,
            page_size,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest::new(3, 20);
        assert_eq!(request.limit(), 20);
        assert_eq!(request.offset(), 60);
        assert_eq!(PageRequest::default(), PageRequest::new(0, 50));
    }

    #[test]
    fn test_oversized_request_is_clamped() {
        let request = PageRequest::new(1, MAX_PAGE_SIZE * 4);
        assert_eq!(request.limit(), i64::from(MAX_PAGE_SIZE));
        assert_eq!(request.offset(), i64::from(MAX_PAGE_SIZE));

        let page = Page::new(Vec::<u8>::new(), 1200, request);
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(vec!['a', 'b'], 21, PageRequest::first(10));
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let last = Page::new(vec!['u'], 21, PageRequest::new(2, 10));
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_empty_listing() {
        let page = Page::new(Vec::<u8>::new(), 0, PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());

        let zero = Page::new(vec![1], 5, PageRequest::first(0));
        assert_eq!(zero.total_pages, 0);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 12, PageRequest::new(1, 2)).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 12);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 6);
    }
}
