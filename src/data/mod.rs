//! Upstream providers.
//!
//! `treasury` is the paged Fiscal Data source behind the aggregation engine;
//! the rest return a single normalized record per call.

pub mod crypto;
pub mod ecb;
pub mod forex;
pub mod fred;
pub mod http;
pub mod stock;
pub mod treasury;
pub mod worldbank;

pub use crypto::CoinGeckoClient;
pub use ecb::EcbClient;
pub use forex::FrankfurterClient;
pub use fred::FredClient;
pub use stock::YahooClient;
pub use treasury::TreasuryClient;
pub use worldbank::WorldBankClient;
