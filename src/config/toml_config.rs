use crate::core::mapper::{FormatConfig, DEFAULT_ICON_BASE};
use crate::core::request::RequestTemplate;
use crate::core::ConfigProvider;
use crate::domain::ports::{StalePolicy, Units};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/forecast/daily";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub format: FormatSection,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub units: Units,
    #[serde(default = "default_days")]
    pub days: u8,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatSection {
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Empty disables grouping.
    #[serde(default = "default_grouping")]
    pub grouping_separator: String,
    #[serde(default = "default_icon_base")]
    pub icon_base: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub suppress_stale: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_days() -> u8 {
    16
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_grouping() -> String {
    ",".to_string()
}

fn default_icon_base() -> String {
    DEFAULT_ICON_BASE.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            units: Units::default(),
            days: default_days(),
            timeout_seconds: None,
        }
    }
}

impl Default for FormatSection {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            locale: default_locale(),
            grouping_separator: default_grouping(),
            icon_base: default_icon_base(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left
    /// as written so validation can point at them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(key) = &self.source.api_key {
            if key.starts_with("${") {
                return Err(ForecastError::ConfigValidationError {
                    field: "source.api_key".to_string(),
                    message: format!("environment variable for {} is not set", key),
                });
            }
        }
        crate::utils::validation::validate_required_field("source.api_key", &self.source.api_key)?;

        if self.format.grouping_separator.chars().count() > 1 {
            return Err(ForecastError::InvalidConfigValueError {
                field: "format.grouping_separator".to_string(),
                value: self.format.grouping_separator.clone(),
                reason: "must be a single character or empty".to_string(),
            });
        }

        RequestTemplate::from_config(self)?;
        FormatConfig::from_config(self)?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn api_key(&self) -> &str {
        self.source.api_key.as_deref().unwrap_or_default()
    }

    fn units(&self) -> Units {
        self.source.units
    }

    fn forecast_days(&self) -> u8 {
        self.source.days
    }

    fn icon_base(&self) -> &str {
        &self.format.icon_base
    }

    fn time_zone(&self) -> &str {
        &self.format.time_zone
    }

    fn locale(&self) -> &str {
        &self.format.locale
    }

    fn grouping_separator(&self) -> Option<char> {
        self.format.grouping_separator.chars().next()
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn stale_policy(&self) -> StalePolicy {
        if self.dispatch.suppress_stale {
            StalePolicy::SuppressStale
        } else {
            StalePolicy::Deliver
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
