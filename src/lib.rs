pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::http::ExchangeRateApi;
pub use crate::config::AppConfig;
pub use crate::core::converter::{CurrencyConverter, RatePoller};
pub use crate::core::percentage::PercentageMode;
pub use crate::core::tip::{TipInput, TipPreset, TipRate};
pub use crate::utils::error::{CalcError, Result};
