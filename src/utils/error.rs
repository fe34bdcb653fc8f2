use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which step of a fetch failed at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkCause {
    Connect,
    Status,
    Read,
}

impl fmt::Display for NetworkCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkCause::Connect => write!(f, "connect"),
            NetworkCause::Status => write!(f, "status"),
            NetworkCause::Read => write!(f, "read"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Network failure ({cause}): {message}")]
    Network {
        cause: NetworkCause,
        message: String,
    },

    #[error("Decode failure: {message}")]
    Decode { message: String },

    #[error("Mapping failure at list[{index}]: {message}")]
    Mapping { index: usize, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Request,
    Network,
    Parse,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorCategory {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // the user can retype the location
            ErrorCategory::Request => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parse => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }
}

impl ForecastError {
    pub fn network(cause: NetworkCause, message: impl Into<String>) -> Self {
        ForecastError::Network {
            cause,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::InvalidRequest { .. } => ErrorCategory::Request,
            ForecastError::Network { .. } => ErrorCategory::Network,
            ForecastError::Decode { .. } | ForecastError::Mapping { .. } => ErrorCategory::Parse,
            ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ForecastError::IoError(_)
            | ForecastError::SerializationError(_)
            | ForecastError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.category().severity()
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ForecastError::InvalidRequest { .. } => "Enter a non-empty city name and try again",
            ForecastError::Network {
                cause: NetworkCause::Connect,
                ..
            } => "Check your network connection and the service endpoint",
            ForecastError::Network {
                cause: NetworkCause::Status,
                ..
            } => "Check the API key and location; the service rejected the request",
            ForecastError::Network {
                cause: NetworkCause::Read,
                ..
            } => "The connection dropped while reading; try the fetch again",
            ForecastError::Decode { .. } | ForecastError::Mapping { .. } => {
                "The service returned an unexpected document; verify the endpoint"
            }
            ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. } => {
                "Fix the configuration value and run again"
            }
            ForecastError::IoError(_)
            | ForecastError::SerializationError(_)
            | ForecastError::CsvError(_) => "Check that stdout and the config file are accessible",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Request => format!("Invalid location: {}", self),
            ErrorCategory::Network => "Unable to connect to the weather service".to_string(),
            ErrorCategory::Parse => "Unable to read the weather forecast".to_string(),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
