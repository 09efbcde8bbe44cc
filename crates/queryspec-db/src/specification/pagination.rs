//! Page-based pagination.

use serde::{Deserialize, Serialize};

/// The page size used when none (or zero) is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A 1-based page number and a page size.
///
/// This is the page view of a specification's skip/take state:
/// `skip = (page - 1) * page_size`, `take = page_size`.
///
/// # Examples
///
/// ```
/// use queryspec_db::specification::PaginationFilter;
///
/// let page = PaginationFilter::new(3, 20);
/// assert_eq!(page.skip(), 40);
/// assert_eq!(page.take(), 20);
///
/// // Zero values are normalized.
/// let page = PaginationFilter::new(0, 0);
/// assert_eq!((page.page_number(), page.page_size()), (1, 10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaginationFilter {
    page_number: usize,
    page_size: usize,
}

impl PaginationFilter {
    /// Creates a filter, normalizing page `0` to `1` and size `0` to
    /// [`DEFAULT_PAGE_SIZE`].
    pub const fn new(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number: if page_number == 0 { 1 } else { page_number },
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    /// Derives the page view of a skip/take pair.
    pub const fn from_skip_take(skip: usize, take: usize) -> Self {
        if take == 0 {
            return Self::new(1, 0);
        }
        Self::new(skip / take + 1, take)
    }

    /// Returns the 1-based page number.
    pub const fn page_number(&self) -> usize {
        self.page_number
    }

    /// Returns the page size.
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the number of items before this page.
    pub const fn skip(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Returns the number of items on this page.
    pub const fn take(&self) -> usize {
        self.page_size
    }
}

impl Default for PaginationFilter {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}
