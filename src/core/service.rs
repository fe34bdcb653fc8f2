use crate::core::dispatch::ResultDispatcher;
use crate::core::engine::ForecastEngine;
use crate::core::fetch::HttpFetcher;
use crate::core::mapper::{FormatConfig, ForecastMapper};
use crate::core::request::RequestTemplate;
use crate::domain::ports::{ConfigProvider, Fetcher};
use crate::utils::error::{ForecastError, Result};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Entry point for the presentation layer. `fetch_forecast` returns
/// immediately; the outcome arrives later through the dispatcher.
pub struct ForecastService<F: Fetcher + 'static> {
    template: RequestTemplate,
    engine: Arc<ForecastEngine<F>>,
    dispatcher: ResultDispatcher,
    runtime: Handle,
}

impl ForecastService<HttpFetcher> {
    pub fn from_config<C: ConfigProvider + ?Sized>(
        config: &C,
        dispatcher: ResultDispatcher,
    ) -> Result<Self> {
        let template = RequestTemplate::from_config(config)?;
        let mapper = ForecastMapper::new(FormatConfig::from_config(config)?);
        let fetcher = HttpFetcher::new(config.request_timeout())?;
        Self::new(template, ForecastEngine::new(fetcher, mapper), dispatcher)
    }
}

impl<F: Fetcher + 'static> ForecastService<F> {
    /// Spawns work on the current tokio runtime.
    pub fn new(
        template: RequestTemplate,
        engine: ForecastEngine<F>,
        dispatcher: ResultDispatcher,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| ForecastError::ConfigValidationError {
            field: "runtime".to_string(),
            message: format!("no tokio runtime to run fetches on: {}", e),
        })?;
        Ok(Self::with_runtime(template, engine, dispatcher, runtime))
    }

    pub fn with_runtime(
        template: RequestTemplate,
        engine: ForecastEngine<F>,
        dispatcher: ResultDispatcher,
        runtime: Handle,
    ) -> Self {
        Self {
            template,
            engine: Arc::new(engine),
            dispatcher,
            runtime,
        }
    }

    /// A rejected location is reported under the current generation without
    /// taking a new one, so it never makes an in-flight fetch stale.
    pub fn fetch_forecast(&self, location: &str) {
        let request = match self.template.build(location) {
            Ok(request) => request,
            Err(e) => {
                let generation = self.dispatcher.latest_generation();
                self.dispatcher.dispatch(generation, location, Err(e));
                return;
            }
        };

        let generation = self.dispatcher.next_generation();
        tracing::info!(generation, "Fetching forecast for '{}'", request.location());

        let engine = Arc::clone(&self.engine);
        let dispatcher = self.dispatcher.clone();
        self.runtime.spawn(async move {
            let outcome = engine.run(&request).await;
            dispatcher.dispatch(generation, request.location(), outcome);
        });
    }
}
