use crate::utils::error::{ErrorCategory, ForecastError, NetworkCause};
use serde::{Deserialize, Serialize};
use url::Url;

/// A validated, fully encoded request for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: Url,
    location: String,
}

impl RequestDescriptor {
    pub(crate) fn new(url: Url, location: String) -> Self {
        Self { url, location }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Status code and body bytes of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// A forecast document whose top-level shape has been checked; the per-day
/// entries are still untyped.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDocument {
    pub list: Vec<serde_json::Value>,
}

/// Typed view of one element of `list`.
#[derive(Debug, Clone, Deserialize)]
pub struct DayEntry {
    pub dt: i64,
    pub temp: TemperatureRange,
    pub humidity: f64,
    pub weather: Vec<ConditionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionEntry {
    pub description: String,
    pub icon: String,
}

/// One display-ready day of the forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastDay {
    day_of_week: String,
    min_temperature: String,
    max_temperature: String,
    humidity_percent: String,
    condition_description: String,
    icon_reference: String,
}

impl ForecastDay {
    pub(crate) fn new(
        day_of_week: String,
        min_temperature: String,
        max_temperature: String,
        humidity_percent: String,
        condition_description: String,
        icon_reference: String,
    ) -> Self {
        Self {
            day_of_week,
            min_temperature,
            max_temperature,
            humidity_percent,
            condition_description,
            icon_reference,
        }
    }

    pub fn day_of_week(&self) -> &str {
        &self.day_of_week
    }

    pub fn min_temperature(&self) -> &str {
        &self.min_temperature
    }

    pub fn max_temperature(&self) -> &str {
        &self.max_temperature
    }

    pub fn humidity_percent(&self) -> &str {
        &self.humidity_percent
    }

    pub fn condition_description(&self) -> &str {
        &self.condition_description
    }

    pub fn icon_reference(&self) -> &str {
        &self.icon_reference
    }
}

/// The complete, chronologically ordered result of a successful mapping.
/// Only ever built whole; there is no way to push into it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forecast {
    days: Vec<ForecastDay>,
}

impl Forecast {
    pub(crate) fn new(days: Vec<ForecastDay>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[ForecastDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidRequest,
    Network,
    Decode,
    Mapping,
    Internal,
}

/// What the presentation layer learns about a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureNotification {
    pub kind: FailureKind,
    pub category: ErrorCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<NetworkCause>,
    pub message: String,
}

impl From<&ForecastError> for FailureNotification {
    fn from(err: &ForecastError) -> Self {
        let (kind, cause) = match err {
            ForecastError::InvalidRequest { .. } => (FailureKind::InvalidRequest, None),
            ForecastError::Network { cause, .. } => (FailureKind::Network, Some(*cause)),
            ForecastError::Decode { .. } => (FailureKind::Decode, None),
            ForecastError::Mapping { .. } => (FailureKind::Mapping, None),
            _ => (FailureKind::Internal, None),
        };
        Self {
            kind,
            category: err.category(),
            cause,
            message: err.to_string(),
        }
    }
}

impl From<ForecastError> for FailureNotification {
    fn from(err: ForecastError) -> Self {
        Self::from(&err)
    }
}

/// A single dispatched outcome, delivered once per fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastUpdate {
    pub generation: u64,
    pub location: String,
    #[serde(flatten)]
    pub outcome: UpdateOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Ready(Forecast),
    Failed(FailureNotification),
}

impl ForecastUpdate {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::Ready(_))
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        match &self.outcome {
            UpdateOutcome::Ready(forecast) => Some(forecast),
            UpdateOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureNotification> {
        match &self.outcome {
            UpdateOutcome::Ready(_) => None,
            UpdateOutcome::Failed(failure) => Some(failure),
        }
    }
}
