//! Input/output helpers: report exports (`export`).

pub mod export;

pub use export::*;
