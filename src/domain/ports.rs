use crate::domain::model::RateTable;
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Latest rate table for `base`. Must not cache; the converter owns caching.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}

pub trait ConfigProvider: Send + Sync {
    fn rates_endpoint(&self) -> &str;
    fn refresh_interval_seconds(&self) -> u64;
    fn timeout_seconds(&self) -> u64;
    fn default_from(&self) -> &str;
    fn default_to(&self) -> &str;
}
