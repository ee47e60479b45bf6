//! One page of an ordered result set
//!
//! [`PagedList`] carries the items of the requested page together with the
//! numbers a client needs to navigate: total count, page size, current page
//! and the derived page count.
//!
//! ```rust
//! use library_api::repository::PagedList;
//!
//! let page = PagedList::create((1..=25).collect::<Vec<u32>>(), 3, 10);
//! assert_eq!(page.total_pages(), 3);
//! assert_eq!(page.items(), &[21, 22, 23, 24, 25]);
//! assert!(page.has_previous());
//! assert!(!page.has_next());
//! ```

use serde::{Deserialize, Serialize};

/// Navigation numbers of a page, without the items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Number of rows across all pages
    pub total_count: u64,
    /// Maximum number of rows per page
    pub page_size: u32,
    /// 1-based page number
    pub current_page: u32,
    /// `ceil(total_count / page_size)`, zero when there are no rows
    pub total_pages: u32,
}

/// A page of already-sorted items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedList<T> {
    items: Vec<T>,
    info: PageInfo,
}

impl<T> PagedList<T> {
    /// Wrap an already-cut page
    pub fn new(items: Vec<T>, total_count: u64, page_size: u32, current_page: u32) -> Self {
        Self {
            items,
            info: PageInfo {
                total_count,
                page_size,
                current_page,
                total_pages: calculate_total_pages(total_count, page_size),
            },
        }
    }

    /// Cut page `page_number` out of the full ordered `source`
    ///
    /// Page 1 holds the first `page_size` rows. A page past the end is empty
    /// but still reports the real totals.
    pub fn create(source: Vec<T>, page_number: u32, page_size: u32) -> Self {
        let total_count = source.len() as u64;
        let skip = (page_number.saturating_sub(1) as usize).saturating_mul(page_size as usize);
        let items = source
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .collect();
        Self::new(items, total_count, page_size, page_number)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn info(&self) -> PageInfo {
        self.info
    }

    pub fn total_count(&self) -> u64 {
        self.info.total_count
    }

    pub fn page_size(&self) -> u32 {
        self.info.page_size
    }

    pub fn current_page(&self) -> u32 {
        self.info.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.info.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.info.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.info.current_page < self.info.total_pages
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn calculate_total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let page_size = u64::from(page_size);
    // Ceiling division: (total + page_size - 1) / page_size
    let pages = total.saturating_add(page_size).saturating_sub(1) / page_size;
    pages.min(u64::from(u32::MAX)) as u32
}
