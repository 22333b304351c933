//! Pagination math for the book feed

/// Page used when none (or an unusable value) is requested
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none (or an unusable value) is requested
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on the page size a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page request. Both fields are always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, replacing zero with the defaults and capping the limit
    pub fn new(page: u32, limit: u32, max_limit: u32) -> Self {
        let page = if page == 0 { DEFAULT_PAGE } else { page };
        let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };
        Self {
            page,
            limit: limit.min(max_limit.max(1)),
        }
    }

    /// Coerce raw query-string values.
    ///
    /// Missing, non-numeric, zero and negative values fall back to the
    /// defaults rather than failing the request.
    pub fn from_query(page: Option<&str>, limit: Option<&str>, max_limit: u32) -> Self {
        Self::new(
            coerce_positive(page).unwrap_or(DEFAULT_PAGE),
            coerce_positive(limit).unwrap_or(DEFAULT_PAGE_SIZE),
            max_limit,
        )
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// `ceil(total / limit)`; zero when there is nothing to list
    pub fn total_pages(&self, total: u64) -> u32 {
        let limit = u64::from(self.limit);
        let pages = total.div_ceil(limit);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

fn coerce_positive(raw: Option<&str>) -> Option<u32> {
    let value: i64 = raw?.trim().parse().ok()?;
    if value <= 0 {
        return None;
    }
    Some(u32::try_from(value).unwrap_or(u32::MAX))
}
