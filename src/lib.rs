pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use core::{
    dispatch::{PresentationContext, ResultDispatcher},
    engine::ForecastEngine,
    fetch::HttpFetcher,
    mapper::{FormatConfig, ForecastMapper},
    request::RequestTemplate,
    service::ForecastService,
};
pub use domain::model::{
    FailureKind, FailureNotification, Forecast, ForecastDay, ForecastUpdate, UpdateOutcome,
};
pub use domain::ports::{ConfigProvider, Fetcher, ForecastConsumer, StalePolicy, Units};
pub use utils::error::{ForecastError, NetworkCause, Result};
