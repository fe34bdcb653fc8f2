use crate::core::decode;
use crate::core::mapper::ForecastMapper;
use crate::domain::model::{Forecast, RequestDescriptor};
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;

/// Runs one fetch through its stages in order: fetch, decode, map.
pub struct ForecastEngine<F: Fetcher> {
    fetcher: F,
    mapper: ForecastMapper,
}

impl<F: Fetcher> ForecastEngine<F> {
    pub fn new(fetcher: F, mapper: ForecastMapper) -> Self {
        Self { fetcher, mapper }
    }

    pub async fn run(&self, request: &RequestDescriptor) -> Result<Forecast> {
        tracing::debug!("Fetching forecast for '{}'", request.location());
        let raw = self.fetcher.fetch(request).await?;
        tracing::debug!("Received {} bytes (HTTP {})", raw.body.len(), raw.status);

        let document = decode::decode(raw)?;
        let forecast = self.mapper.map(&document)?;

        tracing::info!(
            "Forecast for '{}' ready with {} days",
            request.location(),
            forecast.len()
        );
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::request::RequestTemplate;
    use crate::domain::model::RawResponse;
    use crate::domain::ports::Units;
    use crate::utils::error::ForecastError;
    use async_trait::async_trait;

    struct CannedFetcher {
        body: &'static str,
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, _request: &RequestDescriptor) -> Result<RawResponse> {
            Ok(RawResponse {
                status: 200,
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    fn request() -> RequestDescriptor {
        RequestTemplate::new("http://localhost/forecast", "k", Units::Imperial, 16)
            .build("Reno")
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_maps_canned_document() {
        let engine = ForecastEngine::new(
            CannedFetcher {
                body: r#"{"list":[{"dt":0,"temp":{"min":59.9,"max":61.4},"humidity":87,
                    "weather":[{"description":"clear sky","icon":"01d"}]}]}"#,
            },
            ForecastMapper::default(),
        );

        let forecast = engine.run(&request()).await.unwrap();
        assert_eq!(forecast.len(), 1);
        assert_eq!(forecast.days()[0].day_of_week(), "Thursday");
        assert_eq!(forecast.days()[0].humidity_percent(), "87%");
    }

    #[tokio::test]
    async fn test_run_stops_at_decode_failure() {
        let engine = ForecastEngine::new(
            CannedFetcher {
                body: r#"{"message":"city not found"}"#,
            },
            ForecastMapper::default(),
        );

        let err = engine.run(&request()).await.unwrap_err();
        assert!(matches!(err, ForecastError::Decode { .. }));
    }
}
