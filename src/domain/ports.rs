use crate::domain::model::{ForecastUpdate, RawResponse, RequestDescriptor};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
    Standard,
}

impl Units {
    /// Value of the `units` query parameter.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "\u{00B0}F",
            Units::Metric => "\u{00B0}C",
            Units::Standard => "K",
        }
    }
}

/// What to do with a result that arrives after a newer fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Every result is delivered; the last one to complete wins.
    #[default]
    Deliver,
    /// Results from superseded fetches are dropped before delivery.
    SuppressStale,
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn units(&self) -> Units;
    fn forecast_days(&self) -> u8;
    fn icon_base(&self) -> &str;
    fn time_zone(&self) -> &str;
    fn locale(&self) -> &str;
    fn grouping_separator(&self) -> Option<char>;
    fn request_timeout(&self) -> Option<Duration>;
    fn stale_policy(&self) -> StalePolicy;
}

/// Performs the network exchange for one request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<RawResponse>;
}

/// Receives dispatched updates on the presentation context.
pub trait ForecastConsumer {
    fn on_forecast_ready(&mut self, update: ForecastUpdate);
}

impl<F> ForecastConsumer for F
where
    F: FnMut(ForecastUpdate),
{
    fn on_forecast_ready(&mut self, update: ForecastUpdate) {
        self(update)
    }
}
