//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the upstream row shape (`RawRecord`)
//! - the yield-curve maturity vocabulary (`Maturity`)
//! - canonical output records (`BondAggregation`, `DebtPoint`, `AssetPrice`, etc.)

pub mod types;

pub use types::*;
