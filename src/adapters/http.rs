use crate::domain::model::{normalize_code, RateTable};
use crate::domain::ports::{ConfigProvider, RateSource};
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_RATES_ENDPOINT: &str = "https://api.exchangerate-api.com/v4/latest";

/// Body of `GET {endpoint}/{BASE}`. Only `rates` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestRatesResponse {
    pub base: Option<String>,
    pub date: Option<String>,
    pub rates: RateTable,
}

/// Rate source for exchangerate-api.com style endpoints. No retries: a failed
/// request waits for the next scheduled refresh.
#[derive(Debug, Clone)]
pub struct ExchangeRateApi {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl ExchangeRateApi {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.rates_endpoint())
            .with_timeout(Duration::from_secs(config.timeout_seconds()))
    }

    pub fn url_for(&self, base: &str) -> String {
        format!("{}/{}", self.endpoint, normalize_code(base))
    }
}

impl Default for ExchangeRateApi {
    fn default() -> Self {
        Self::new(DEFAULT_RATES_ENDPOINT)
    }
}

#[async_trait]
impl RateSource for ExchangeRateApi {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        let url = self.url_for(base);
        let mut request = self.client.get(&url);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Making API request to: {}", url);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(CalcError::RateFetchFailed {
                base: normalize_code(base),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: LatestRatesResponse = serde_json::from_str(&body)?;

        if let Some(date) = &parsed.date {
            tracing::debug!(
                "Rates for {} dated {}",
                parsed.base.as_deref().unwrap_or(base),
                date
            );
        }

        Ok(parsed.rates)
    }
}
