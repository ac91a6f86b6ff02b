//! Pagination-aware aggregation over the Treasury Fiscal Data API.
//!
//! Layers, leaves first:
//!
//! - `fetch`: the `PageFetcher` boundary and typed query builders
//! - `coerce`: best-effort numeric parsing and output rounding
//! - `paging`: the sequential page loop
//! - `accumulate`: per-strategy fold state (`Accumulator`)
//! - `derive`: date ordering and running deltas
//! - `reports`: the Treasury reports wired from the pieces above
//!
//! Nothing here caches, logs to stdout, or knows about HTTP.

pub mod accumulate;
pub mod coerce;
pub mod derive;
pub mod fetch;
pub mod paging;
pub mod reports;

#[cfg(test)]
pub(crate) mod fake;

pub use accumulate::{Accumulator, aggregate};
pub use coerce::{coerce_number, round_to};
pub use fetch::{Endpoint, FilterExpr, FilterOp, Page, PageFetcher, PageQuery, PageRequest, SortSpec};
pub use reports::*;
