pub mod decode;
pub mod dispatch;
pub mod engine;
pub mod fetch;
pub mod mapper;
pub mod request;
pub mod service;

pub use crate::domain::model::{Forecast, ForecastDay, ForecastUpdate};
pub use crate::domain::ports::{ConfigProvider, Fetcher, ForecastConsumer};
pub use crate::utils::error::Result;
