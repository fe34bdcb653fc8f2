use crate::domain::model::RequestDescriptor;
use crate::domain::ports::{ConfigProvider, Units};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url};
use url::Url;

pub const MAX_FORECAST_DAYS: u8 = 16;

/// Fixed service parameters every request is assembled from.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    endpoint: String,
    api_key: String,
    units: Units,
    days: u8,
}

impl RequestTemplate {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, units: Units, days: u8) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            units,
            days,
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        validate_url("source.endpoint", config.api_endpoint())?;
        validate_non_empty_string("source.api_key", config.api_key())?;
        validate_range("source.days", config.forecast_days(), 1, MAX_FORECAST_DAYS)?;

        Ok(Self::new(
            config.api_endpoint(),
            config.api_key(),
            config.units(),
            config.forecast_days(),
        ))
    }

    /// Encodes `location` into the service URL. Fails without side effects on
    /// an empty location, one with control characters, or a URL that does not
    /// come out absolute.
    pub fn build(&self, location: &str) -> Result<RequestDescriptor> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ForecastError::InvalidRequest {
                reason: "location is empty".to_string(),
            });
        }
        if location.chars().any(char::is_control) {
            return Err(ForecastError::InvalidRequest {
                reason: format!("location {:?} contains control characters", location),
            });
        }

        let mut url = Url::parse(&self.endpoint).map_err(|e| ForecastError::InvalidRequest {
            reason: format!("endpoint '{}' is not a valid URL: {}", self.endpoint, e),
        })?;
        if url.cannot_be_a_base() || !url.has_host() {
            return Err(ForecastError::InvalidRequest {
                reason: format!("endpoint '{}' is not an absolute URL", self.endpoint),
            });
        }

        url.query_pairs_mut()
            .append_pair("q", location)
            .append_pair("units", self.units.as_query_value())
            .append_pair("cnt", &self.days.to_string())
            .append_pair("APPID", &self.api_key);

        tracing::debug!("Built request for '{}'", location);
        Ok(RequestDescriptor::new(url, location.to_string()))
    }
}
