use crate::app::render::OutputFormat;
use crate::config::toml_config::DEFAULT_ENDPOINT;
use crate::core::mapper::{FormatConfig, DEFAULT_ICON_BASE};
use crate::core::request::RequestTemplate;
use crate::core::ConfigProvider;
use crate::domain::ports::{StalePolicy, Units};
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "forecast-etl")]
#[command(about = "Fetch a daily weather forecast and print it day by day")]
pub struct CliConfig {
    /// One or more locations, e.g. "Boston, US". Each is fetched concurrently.
    #[arg(required = true)]
    pub locations: Vec<String>,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, env = "OWM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, value_enum, default_value_t = Units::Imperial)]
    pub units: Units,

    #[arg(long, default_value = "16")]
    pub days: u8,

    #[arg(long, default_value = DEFAULT_ICON_BASE)]
    pub icon_base: String,

    /// IANA time zone used to name the day of each forecast entry
    #[arg(long, default_value = "UTC")]
    pub time_zone: String,

    #[arg(long, default_value = "en_US")]
    pub locale: String,

    #[arg(long, default_value = ",")]
    pub grouping_separator: char,

    #[arg(long, help = "Disable digit grouping in temperatures")]
    pub no_grouping: bool,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Drop results from fetches superseded by a newer one")]
    pub suppress_stale: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Read source/format/dispatch settings from a TOML file instead of flags
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    fn units(&self) -> Units {
        self.units
    }

    fn forecast_days(&self) -> u8 {
        self.days
    }

    fn icon_base(&self) -> &str {
        &self.icon_base
    }

    fn time_zone(&self) -> &str {
        &self.time_zone
    }

    fn locale(&self) -> &str {
        &self.locale
    }

    fn grouping_separator(&self) -> Option<char> {
        if self.no_grouping {
            None
        } else {
            Some(self.grouping_separator)
        }
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    fn stale_policy(&self) -> StalePolicy {
        if self.suppress_stale {
            StalePolicy::SuppressStale
        } else {
            StalePolicy::Deliver
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_required_field("api_key", &self.api_key)?;
        RequestTemplate::from_config(self)?;
        FormatConfig::from_config(self)?;
        Ok(())
    }
}
