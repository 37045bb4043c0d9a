use thiserror::Error;

/// Message surfaced to the user whenever a rate refresh fails.
pub const RATE_FETCH_WARNING: &str =
    "Failed to update exchange rates. Using cached data if available.";

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Rate fetch for {base} failed with HTTP status {status}")]
    RateFetchFailed { base: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CalcError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CalcError::ApiError(_) | CalcError::RateFetchFailed { .. } => ErrorCategory::Network,
            CalcError::ConfigValidationError { .. }
            | CalcError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            CalcError::SerializationError(_) => ErrorCategory::Data,
            CalcError::IoError(_) => ErrorCategory::System,
        }
    }

    /// Network and data errors are recoverable; configuration and system
    /// errors stop the binary.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CalcError::ApiError(_) | CalcError::RateFetchFailed { .. } => {
                RATE_FETCH_WARNING.to_string()
            }
            CalcError::IoError(e) => format!("Could not read or write a file: {}", e),
            CalcError::SerializationError(_) => {
                "The exchange-rate service returned data that could not be understood".to_string()
            }
            CalcError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            CalcError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CalcError::ApiError(_) => {
                "Check your network connection; rates are retried on the next refresh".to_string()
            }
            CalcError::RateFetchFailed { status, .. } if *status == 404 => {
                "Check that the currency code is supported by the rate endpoint".to_string()
            }
            CalcError::RateFetchFailed { .. } => {
                "The rate service may be unavailable; wait for the next refresh".to_string()
            }
            CalcError::IoError(_) => "Check the file path and its permissions".to_string(),
            CalcError::SerializationError(_) => {
                "Verify that the rates endpoint points at an exchangerate-api compatible service"
                    .to_string()
            }
            CalcError::ConfigValidationError { .. }
            | CalcError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line arguments and try again".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
