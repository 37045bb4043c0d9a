use crate::adapters::http::DEFAULT_RATES_ENDPOINT;
use crate::core::converter::DEFAULT_REFRESH_INTERVAL;
use crate::core::tip::TipPreset;
use crate::core::ConfigProvider;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{
    validate_currency_code, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rates: RatesConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
    #[serde(default = "default_tip_percentage")]
    pub tip_percentage: f64,
}

fn default_endpoint() -> String {
    DEFAULT_RATES_ENDPOINT.to_string()
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL.as_secs()
}

fn default_timeout() -> u64 {
    10
}

fn default_from() -> String {
    "USD".to_string()
}

fn default_to() -> String {
    "EUR".to_string()
}

fn default_tip_percentage() -> f64 {
    10.0
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            refresh_interval_seconds: default_refresh_interval(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            tip_percentage: default_tip_percentage(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CalcError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Reads `path` when given, otherwise built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path);
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CalcError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CalcError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn default_tip_preset(&self) -> TipPreset {
        TipPreset::from_percentage(self.defaults.tip_percentage).unwrap_or_default()
    }
}

impl ConfigProvider for AppConfig {
    fn rates_endpoint(&self) -> &str {
        &self.rates.endpoint
    }

    fn refresh_interval_seconds(&self) -> u64 {
        self.rates.refresh_interval_seconds
    }

    fn timeout_seconds(&self) -> u64 {
        self.rates.timeout_seconds
    }

    fn default_from(&self) -> &str {
        &self.defaults.from
    }

    fn default_to(&self) -> &str {
        &self.defaults.to
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("rates.endpoint", &self.rates.endpoint)?;
        validate_positive_number(
            "rates.refresh_interval_seconds",
            self.rates.refresh_interval_seconds,
            1,
        )?;
        validate_range("rates.timeout_seconds", self.rates.timeout_seconds, 1, 300)?;
        validate_currency_code("defaults.from", &self.defaults.from)?;
        validate_currency_code("defaults.to", &self.defaults.to)?;

        if TipPreset::from_percentage(self.defaults.tip_percentage).is_none() {
            return Err(CalcError::InvalidConfigValueError {
                field: "defaults.tip_percentage".to_string(),
                value: self.defaults.tip_percentage.to_string(),
                reason: "Tip preset must be one of 10, 15, 18, 20".to_string(),
            });
        }

        Ok(())
    }
}
