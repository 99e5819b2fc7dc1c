//! Offset-based pagination for Xplenty list endpoints.

use serde::Serialize;

/// Page size the API uses when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A page of results from the Xplenty API.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Number of items skipped before this page.
    pub offset: u32,
    /// Maximum number of items requested for this page.
    pub limit: u32,
    /// Whether there may be more pages.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page. The API returns no totals, so a full page is
    /// taken to mean more items may follow.
    #[must_use]
    pub fn new(items: Vec<T>, offset: u32, limit: u32) -> Self {
        let has_more = limit > 0 && items.len() >= limit as usize;
        Self {
            items,
            offset,
            limit,
            has_more,
        }
    }

    /// Offset of the page after this one.
    #[must_use]
    pub fn next_offset(&self) -> u32 {
        self.offset.saturating_add(self.items.len() as u32)
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Sort order for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Filters shared by the list endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Only return resources in this status (clusters, jobs, schedules).
    pub status: Option<String>,
    /// Sort field, e.g. `created` or `updated`.
    pub sort: Option<String>,
    /// Sort direction.
    pub direction: Option<Direction>,
}

impl ListQuery {
    /// Query pairs for one page of results.
    pub(crate) fn to_pairs(&self, offset: u32, limit: u32) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("offset", offset.to_string()), ("limit", limit.to_string())];
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(direction) = self.direction {
            pairs.push(("direction", direction.as_str().to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_more() {
        // Full page suggests more
        let page: Page<i32> = Page::new(vec![1; 20], 0, 20);
        assert!(page.has_more);
        assert_eq!(page.next_offset(), 20);

        // Partial page means no more
        let page: Page<i32> = Page::new(vec![1; 5], 20, 20);
        assert!(!page.has_more);
        assert_eq!(page.next_offset(), 25);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], 40, 20);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.offset, 40);
    }

    #[test]
    fn test_query_pairs() {
        let pairs = ListQuery::default().to_pairs(0, 20);
        assert_eq!(pairs, vec![("offset", "0".to_string()), ("limit", "20".to_string())]);

        let query = ListQuery {
            status: Some("running".to_string()),
            sort: Some("created".to_string()),
            direction: Some(Direction::Desc),
        };
        let pairs = query.to_pairs(10, 5);
        assert_eq!(pairs[2], ("status", "running".to_string()));
        assert_eq!(pairs[3], ("sort", "created".to_string()));
        assert_eq!(pairs[4], ("direction", "desc".to_string()));
    }
}
