use serde::{Deserialize, Serialize};

use crate::constants::MAX_PAGE_SIZE;

#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved page position: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn from_query(query: PageQuery, default_limit: i64) -> Self {
        Self::new(query.page, query.limit, default_limit)
    }

    /// Saturates for page numbers past any reachable row.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PageContext<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> PageContext<T> {
    pub fn from_rows(rows: Vec<T>, total_rows: i64, request: &PageRequest) -> Self {
        if rows.is_empty() && request.page == 1 {
            return Self::no_rows();
        }

        let seen = request.offset().saturating_add(rows.len() as i64);
        let next = (seen < total_rows).then(|| request.page + 1);
        let previous = (request.page > 1).then_some(request.page - 1);

        Self {
            count: total_rows,
            next,
            previous,
            results: rows,
        }
    }

    pub fn no_rows() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(PageRequest::new(None, None, 6).limit, 6);
        assert_eq!(PageRequest::new(None, Some(0), 6).limit, 1);
        assert_eq!(PageRequest::new(None, Some(10_000), 6).limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(Some(-3), None, 6).page, 1);
    }

    #[test]
    fn offset_follows_page() {
        let request = PageRequest::new(Some(3), Some(5), 6);
        assert_eq!(request.offset(), 10);
    }

    #[test]
    fn middle_page_links_both_ways() {
        let request = PageRequest::new(Some(2), Some(2), 6);
        let page = PageContext::from_rows(vec![3, 4], 5, &request);
        assert_eq!(page.count, 5);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn last_page_has_no_next() {
        let request = PageRequest::new(Some(3), Some(2), 6);
        let page = PageContext::from_rows(vec![5], 5, &request);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(2));
    }

    #[test]
    fn huge_page_is_empty_not_overflowing() {
        let request = PageRequest::new(Some(i64::MAX), Some(2), 6);
        assert_eq!(request.offset(), i64::MAX);

        let page: PageContext<i32> = PageContext::from_rows(vec![], 3, &request);
        assert_eq!(page.count, 3);
        assert!(page.results.is_empty());
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(i64::MAX - 1));
    }

    #[test]
    fn empty_first_page() {
        let request = PageRequest::new(None, None, 6);
        let page: PageContext<i32> = PageContext::from_rows(vec![], 0, &request);
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
        assert_eq!(page.next, None);
    }
}
