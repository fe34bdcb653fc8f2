use crate::domain::model::{FailureNotification, ForecastUpdate, UpdateOutcome};
use crate::domain::ports::ForecastConsumer;
use crate::utils::error::{ErrorCategory, ErrorSeverity, ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    location: &'a str,
    generation: u64,
    day_of_week: &'a str,
    min_temperature: &'a str,
    max_temperature: &'a str,
    humidity: &'a str,
    description: &'a str,
    icon: &'a str,
}

enum Sink<W: Write> {
    Plain(W),
    Csv(csv::Writer<W>),
}

/// Prints each update as it is delivered.
pub struct ForecastPrinter<W: Write> {
    format: OutputFormat,
    sink: Sink<W>,
    failures: Vec<FailureNotification>,
    forecasts: usize,
}

pub fn failure_headline(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Request => "Invalid location",
        ErrorCategory::Network => "Unable to connect to the weather service",
        ErrorCategory::Parse => "Unable to read the weather forecast",
        ErrorCategory::Configuration | ErrorCategory::System => "Internal error",
    }
}

impl<W: Write> ForecastPrinter<W> {
    pub fn new(format: OutputFormat, writer: W) -> Self {
        let sink = match format {
            OutputFormat::Csv => Sink::Csv(csv::Writer::from_writer(writer)),
            OutputFormat::Text | OutputFormat::Json => Sink::Plain(writer),
        };
        Self {
            format,
            sink,
            failures: Vec::new(),
            forecasts: 0,
        }
    }

    pub fn failures(&self) -> &[FailureNotification] {
        &self.failures
    }

    pub fn forecasts(&self) -> usize {
        self.forecasts
    }

    /// Text and JSON output carry failures in the stream itself; CSV rows
    /// only hold forecast days.
    pub fn reports_failures_inline(&self) -> bool {
        self.format != OutputFormat::Csv
    }

    pub fn worst_severity(&self) -> Option<ErrorSeverity> {
        self.failures.iter().map(|f| f.category.severity()).max()
    }

    pub fn finish(self) -> Result<W> {
        match self.sink {
            Sink::Plain(mut writer) => {
                writer.flush()?;
                Ok(writer)
            }
            Sink::Csv(writer) => writer
                .into_inner()
                .map_err(|e| ForecastError::IoError(std::io::Error::other(e.to_string()))),
        }
    }

    fn write_update(&mut self, update: &ForecastUpdate) -> Result<()> {
        match &mut self.sink {
            Sink::Plain(writer) => match self.format {
                OutputFormat::Json => {
                    serde_json::to_writer(&mut *writer, update)?;
                    writeln!(writer)?;
                }
                _ => write_text(writer, update)?,
            },
            Sink::Csv(writer) => {
                // failures have no rows; they are reported on stderr
                if let UpdateOutcome::Ready(forecast) = &update.outcome {
                    for day in forecast.days() {
                        writer.serialize(CsvRow {
                            location: &update.location,
                            generation: update.generation,
                            day_of_week: day.day_of_week(),
                            min_temperature: day.min_temperature(),
                            max_temperature: day.max_temperature(),
                            humidity: day.humidity_percent(),
                            description: day.condition_description(),
                            icon: day.icon_reference(),
                        })?;
                    }
                    writer.flush()?;
                }
            }
        }
        Ok(())
    }
}

fn write_text<W: Write>(writer: &mut W, update: &ForecastUpdate) -> Result<()> {
    match &update.outcome {
        UpdateOutcome::Ready(forecast) => {
            writeln!(writer, "{} (#{})", update.location, update.generation)?;
            for day in forecast.days() {
                writeln!(
                    writer,
                    "  {:<10} {:>6} / {:<6} {:>4}  {}  {}",
                    day.day_of_week(),
                    day.min_temperature(),
                    day.max_temperature(),
                    day.humidity_percent(),
                    day.condition_description(),
                    day.icon_reference()
                )?;
            }
        }
        UpdateOutcome::Failed(failure) => {
            writeln!(
                writer,
                "{} (#{}): {} [{}]",
                update.location,
                update.generation,
                failure_headline(failure.category),
                failure.message
            )?;
        }
    }
    Ok(())
}

impl<W: Write> ForecastConsumer for ForecastPrinter<W> {
    fn on_forecast_ready(&mut self, update: ForecastUpdate) {
        if let Err(e) = self.write_update(&update) {
            tracing::error!("Failed to print update for '{}': {}", update.location, e);
        }
        match update.outcome {
            UpdateOutcome::Ready(_) => self.forecasts += 1,
            UpdateOutcome::Failed(failure) => self.failures.push(failure),
        }
    }
}
