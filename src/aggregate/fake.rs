//! In-memory `PageFetcher` for tests.

use std::cell::RefCell;

use crate::aggregate::fetch::{Endpoint, Page, PageFetcher, PageRequest};
use crate::domain::RawRecord;
use crate::error::AppError;

/// Serves canned pages by page number and records every request.
///
/// Requests past the last canned page get an empty page, which mirrors what
/// the Fiscal Data API returns for an out-of-range cursor.
pub struct FakeFetcher {
    pages: Vec<Page>,
    fail_on: Option<u32>,
    /// (endpoint, page number, page size, filter, sort)
    seen: RefCell<Vec<(Endpoint, u32, u32, String, String)>>,
}

impl FakeFetcher {
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            fail_on: None,
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Pages of records, all reporting the same `total_pages`.
    pub fn with_total(records: Vec<Vec<RawRecord>>, total_pages: u32) -> Self {
        let pages = records
            .into_iter()
            .enumerate()
            .map(|(i, records)| Page {
                records,
                page_number: i as u32 + 1,
                total_pages: Some(total_pages),
            })
            .collect();
        Self::from_pages(pages)
    }

    /// Pages of records with a consistent `total_pages` equal to their count.
    pub fn paged(records: Vec<Vec<RawRecord>>) -> Self {
        let total = records.len() as u32;
        Self::with_total(records, total)
    }

    pub fn failing_on(mut self, page_number: u32) -> Self {
        self.fail_on = Some(page_number);
        self
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.seen.borrow().iter().map(|r| r.1).collect()
    }

    pub fn requests(&self) -> Vec<(Endpoint, u32, u32, String, String)> {
        self.seen.borrow().clone()
    }
}

impl PageFetcher for FakeFetcher {
    fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Page, AppError> {
        let query = request.query;
        self.seen.borrow_mut().push((
            query.endpoint,
            request.page_number,
            query.page_size,
            query.filter.as_ref().map(|f| f.to_string()).unwrap_or_default(),
            query.sort.as_ref().map(|s| s.to_string()).unwrap_or_default(),
        ));

        if self.fail_on == Some(request.page_number) {
            return Err(AppError::upstream("fake fetch failure"));
        }

        let idx = request.page_number as usize;
        Ok(self
            .pages
            .get(idx.wrapping_sub(1))
            .cloned()
            .unwrap_or(Page {
                records: Vec::new(),
                page_number: request.page_number,
                total_pages: None,
            }))
    }
}
