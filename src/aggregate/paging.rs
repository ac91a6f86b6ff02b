//! Sequential pagination driver.
//!
//! Page `n + 1` is only requested after every record of page `n` has been
//! folded. The loop stops on an empty page or once the cursor reaches the
//! provider-reported total, whichever comes first.

use tracing::debug;

use crate::aggregate::fetch::{PageFetcher, PageQuery};
use crate::domain::RawRecord;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagingState {
    Fetching(u32),
    Done,
}

/// Counters from one paging run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    pub pages: u32,
    pub records: usize,
    pub accepted: usize,
}

impl PageStats {
    pub fn skipped(&self) -> usize {
        self.records - self.accepted
    }
}

/// Walk every page of `query`, offering each record to `fold`.
///
/// `fold` returns whether the record was used. A fetch error aborts the walk
/// and is returned as-is; nothing folded so far is reported.
pub fn paginate<F>(fetcher: &dyn PageFetcher, query: &PageQuery, mut fold: F) -> Result<PageStats, AppError>
where
    F: FnMut(&RawRecord) -> bool,
{
    let mut stats = PageStats::default();
    let mut state = PagingState::Fetching(1);

    while let PagingState::Fetching(page_number) = state {
        let page = fetcher.fetch_page(&query.page(page_number))?;
        stats.pages += 1;

        debug!(
            endpoint = %query.endpoint,
            page = page_number,
            total_pages = ?page.total_pages,
            records = page.records.len(),
            "fetched page"
        );

        for record in &page.records {
            stats.records += 1;
            if fold(record) {
                stats.accepted += 1;
            }
        }

        state = match page_number.checked_add(1) {
            Some(next) if !page.is_last() => PagingState::Fetching(next),
            _ => PagingState::Done,
        };
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fake::FakeFetcher;
    use crate::aggregate::fetch::{Endpoint, Page};
    use crate::error::ErrorKind;

    fn rec(v: &str) -> RawRecord {
        RawRecord::from_pairs([("v", v)])
    }

    fn query() -> PageQuery {
        PageQuery::new(Endpoint::AuctionsQuery, 100)
    }

    #[test]
    fn stops_on_empty_page_without_metadata() {
        let fetcher = FakeFetcher::from_pages(vec![
            Page { records: vec![rec("1")], page_number: 1, total_pages: Some(99) },
            Page { records: vec![], page_number: 2, total_pages: None },
            Page { records: vec![rec("never")], page_number: 3, total_pages: Some(99) },
        ]);
        let mut seen = Vec::new();
        let stats = paginate(&fetcher, &query(), |r| {
            seen.push(r.field("v").unwrap().to_string());
            true
        })
        .unwrap();

        assert_eq!(seen, ["1"]);
        assert_eq!(stats.pages, 2);
        assert_eq!(fetcher.requested_pages(), [1, 2]);
    }

    #[test]
    fn stops_when_cursor_reaches_total_pages() {
        let fetcher = FakeFetcher::with_total(vec![vec![rec("1")], vec![rec("2")], vec![rec("3")]], 2);
        let stats = paginate(&fetcher, &query(), |_| true).unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(fetcher.requested_pages(), [1, 2]);
    }

    #[test]
    fn missing_total_pages_stops_after_first_page() {
        let fetcher = FakeFetcher::from_pages(vec![
            Page { records: vec![rec("1")], page_number: 1, total_pages: None },
            Page { records: vec![rec("2")], page_number: 2, total_pages: None },
        ]);
        let stats = paginate(&fetcher, &query(), |_| true).unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(fetcher.requested_pages(), [1]);
    }

    #[test]
    fn counts_skipped_records() {
        let fetcher = FakeFetcher::with_total(vec![vec![rec("1"), rec("x"), rec("3")]], 1);
        let stats = paginate(&fetcher, &query(), |r| r.field("v") != Some("x")).unwrap();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.skipped(), 1);
    }

    #[test]
    fn fetch_failure_aborts_the_walk() {
        let fetcher = FakeFetcher::with_total(vec![vec![rec("1")], vec![rec("2")]], 3).failing_on(2);
        let err = paginate(&fetcher, &query(), |_| true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(fetcher.requested_pages(), [1, 2]);
    }

    #[test]
    fn passes_query_and_cursor_to_fetcher() {
        let fetcher = FakeFetcher::with_total(vec![vec![rec("1")]], 1);
        let q = PageQuery::new(Endpoint::DebtToPenny, 25);
        paginate(&fetcher, &q, |_| true).unwrap();
        let seen = fetcher.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, Endpoint::DebtToPenny);
        assert_eq!(seen[0].1, 1);
        assert_eq!(seen[0].2, 25);
    }
}
