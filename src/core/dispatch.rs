//! Hands fetch outcomes back to the presentation context.
//!
//! Workers never call the consumer directly. They post a [`ForecastUpdate`]
//! into a channel, and the [`PresentationContext`] that owns the consumer
//! drains it on whichever task or thread drives it. One update is posted per
//! fetch, so the consumer hears about each fetch at most once, and exactly
//! once unless the update is suppressed as stale.

use crate::domain::model::{FailureNotification, Forecast, ForecastUpdate, UpdateOutcome};
use crate::domain::ports::{ForecastConsumer, StalePolicy};
use crate::utils::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Worker-side handle. Cheap to clone; one clone travels with each fetch.
#[derive(Debug, Clone)]
pub struct ResultDispatcher {
    tx: mpsc::UnboundedSender<ForecastUpdate>,
    latest: Arc<AtomicU64>,
}

impl ResultDispatcher {
    pub fn channel<C: ForecastConsumer>(
        policy: StalePolicy,
        consumer: C,
    ) -> (ResultDispatcher, PresentationContext<C>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let latest = Arc::new(AtomicU64::new(0));

        let dispatcher = ResultDispatcher {
            tx,
            latest: Arc::clone(&latest),
        };
        let context = PresentationContext {
            rx,
            latest,
            policy,
            consumer,
            delivered: 0,
            suppressed: 0,
        };
        (dispatcher, context)
    }

    /// Tags a new fetch. Generations start at 1 and only increase.
    pub fn next_generation(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn dispatch(&self, generation: u64, location: &str, outcome: Result<Forecast>) {
        let outcome = match outcome {
            Ok(forecast) => UpdateOutcome::Ready(forecast),
            Err(e) => {
                tracing::warn!(
                    generation,
                    "Fetch for '{}' failed: {} ({:?})",
                    location,
                    e,
                    e.category()
                );
                UpdateOutcome::Failed(FailureNotification::from(&e))
            }
        };

        let update = ForecastUpdate {
            generation,
            location: location.to_string(),
            outcome,
        };

        if self.tx.send(update).is_err() {
            tracing::warn!(
                generation,
                "Presentation context is gone, dropping update for '{}'",
                location
            );
        }
    }
}

/// Owns the consumer and the receiving end of the update channel.
pub struct PresentationContext<C> {
    rx: mpsc::UnboundedReceiver<ForecastUpdate>,
    latest: Arc<AtomicU64>,
    policy: StalePolicy,
    consumer: C,
    delivered: u64,
    suppressed: u64,
}

impl<C: ForecastConsumer> PresentationContext<C> {
    /// Delivers updates until every dispatcher handle has been dropped, then
    /// hands the consumer back.
    pub async fn run(mut self) -> C {
        while let Some(update) = self.rx.recv().await {
            self.deliver(update);
        }
        tracing::debug!(
            "Presentation context closed after {} delivered, {} suppressed",
            self.delivered,
            self.suppressed
        );
        self.consumer
    }

    /// Delivers whatever is already queued without waiting. For event loops
    /// that tick on their own schedule.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        while let Ok(update) = self.rx.try_recv() {
            if self.deliver(update) {
                count += 1;
            }
        }
        count
    }

    /// Waits for the next update and delivers it. Returns `false` once the
    /// channel is closed.
    pub async fn next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(update) => {
                self.deliver(update);
                true
            }
            None => false,
        }
    }

    fn deliver(&mut self, update: ForecastUpdate) -> bool {
        if self.policy == StalePolicy::SuppressStale {
            let latest = self.latest.load(Ordering::SeqCst);
            if update.generation < latest {
                tracing::info!(
                    "Suppressing stale result for '{}' (generation {} < {})",
                    update.location,
                    update.generation,
                    latest
                );
                self.suppressed += 1;
                return false;
            }
        }

        tracing::debug!(
            "Delivering generation {} for '{}'",
            update.generation,
            update.location
        );
        self.delivered += 1;
        self.consumer.on_forecast_ready(update);
        true
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}
