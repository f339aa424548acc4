//! Page/limit pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

/// Default page number.
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size.
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest page size a client may request.
pub const MAX_LIMIT: u64 = 100;

/// Largest page number accepted; keeps the row offset within a signed 64-bit bind.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT + 1;

/// Raw pagination query parameters.
///
/// Values are kept as strings so that malformed numbers fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Optional case-insensitive name filter.
    pub name: Option<String>,
}

impl PageQuery {
    /// Resolve the page/limit pair.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            parse_positive(self.page.as_deref()),
            parse_positive(self.limit.as_deref()),
        )
    }

    /// Resolve the name filter, ignoring blank values.
    #[must_use]
    pub fn name_filter(&self) -> Option<NameFilter> {
        self.name.as_deref().and_then(NameFilter::new)
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}

/// Resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Build a window, substituting defaults and capping the limit.
    #[must_use]
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page
                .filter(|p| *p > 0)
                .unwrap_or(DEFAULT_PAGE)
                .min(MAX_PAGE),
            limit: limit
                .filter(|l| *l > 0)
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_LIMIT),
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.limit.saturating_mul(self.page.saturating_sub(1))
    }

    /// Number of pages needed for `count` rows.
    #[must_use]
    pub const fn total_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.limit)
    }

    /// Wrap one page of rows together with the total row count.
    #[must_use]
    pub fn page_of<T>(&self, items: Vec<T>, count: u64) -> Page<T> {
        Page {
            items,
            total_pages: self.total_pages(count),
            count,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u64,
    pub count: u64,
}

impl<T> Page<T> {
    /// Convert the items while keeping the counts.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            count: self.count,
        }
    }
}

/// Case-insensitive substring filter on a name column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter(String);

impl NameFilter {
    /// Build a filter, returning `None` for a blank needle.
    #[must_use]
    pub fn new(needle: &str) -> Option<Self> {
        let needle = needle.trim();
        if needle.is_empty() {
            None
        } else {
            Some(Self(needle.to_lowercase()))
        }
    }

    /// The lower-cased needle.
    #[must_use]
    pub fn needle(&self) -> &str {
        &self.0
    }

    /// A `LIKE` pattern matching the needle anywhere, with wildcards escaped.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let escaped = self
            .0
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
            name: None,
        }
    }

    #[test]
    fn test_defaults() {
        let p = query(None, None).pagination();
        assert_eq!(p, Pagination { page: 1, limit: 10 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_malformed_values_fall_back_to_defaults() {
        let p = query(Some("abc"), Some("-5")).pagination();
        assert_eq!(p, Pagination { page: 1, limit: 10 });

        let p = query(Some("0"), Some("0")).pagination();
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_second_page_of_twenty_five() {
        let p = query(Some("2"), Some("10")).pagination();
        assert_eq!(p.offset(), 10);
        assert_eq!(p.total_pages(25), 3);

        let page = p.page_of((11..=20).collect::<Vec<u64>>(), 25);
        assert_eq!(page.items.first(), Some(&11));
        assert_eq!(page.items.last(), Some(&20));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.count, 25);
    }

    #[test]
    fn test_total_pages_edges() {
        let p = Pagination::new(None, Some(10));
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
    }

    #[test]
    fn test_limit_is_capped() {
        let p = query(None, Some("5000")).pagination();
        assert_eq!(p.limit, MAX_LIMIT);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let p = query(Some("18446744073709551615"), Some("10")).pagination();
        assert_eq!(p.page, MAX_PAGE);
        assert!(p.offset() <= i64::MAX as u64);

        let p = query(Some("1000000000000000000"), Some("100")).pagination();
        assert!(p.offset() <= i64::MAX as u64);
    }

    #[test]
    fn test_page_map_keeps_counts() {
        let page = Pagination::default().page_of(vec![1, 2], 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_name_filter() {
        assert!(NameFilter::new("   ").is_none());

        let filter = NameFilter::new(" Ann_a% ").unwrap();
        assert_eq!(filter.needle(), "ann_a%");
        assert_eq!(filter.like_pattern(), "%ann\\_a\\%%");
    }
}
