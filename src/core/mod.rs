pub mod converter;
pub mod format;
pub mod input;
pub mod percentage;
pub mod tip;

pub use crate::domain::model::{Conversion, ConverterState, ConverterStatus, RateCache, RateTable};
pub use crate::domain::ports::{ConfigProvider, RateSource};
pub use crate::utils::error::Result;
