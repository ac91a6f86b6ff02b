//! `finagg` library crate.
//!
//! The binary is a thin wrapper around this library so that:
//!
//! - the aggregation core is testable without spawning processes or hitting the network
//! - providers, cache, and presentation can be swapped independently

pub mod aggregate;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
