//! API response envelopes

use serde::{Deserialize, Serialize};

/// Offset-paginated list envelope used by the cosmetics endpoints
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
            has_more: offset + limit < total,
        }
    }
}

/// Pagination metadata for page-numbered endpoints
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based)
    pub page: i64,
    /// Items per page
    pub limit: i64,
    /// Total number of items
    pub total: i64,
    /// Total number of pages
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// Page-numbered response wrapper (user listing)
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        Self {
            data,
            pagination: Pagination::new(page, limit, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_has_more() {
        let p = Page::new(vec![1, 2, 3], 10, 3, 0);
        assert!(p.has_more);
        let p = Page::new(vec![1], 10, 3, 9);
        assert!(!p.has_more);
    }

    #[test]
    fn pagination_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 25).total_pages, 3);
        assert_eq!(Pagination::new(1, 10, 30).total_pages, 3);
        assert_eq!(Pagination::new(1, 0, 30).total_pages, 0);
    }
}
