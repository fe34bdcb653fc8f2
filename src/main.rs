use clap::Parser;
use forecast_etl::app::render::{failure_headline, ForecastPrinter};
use forecast_etl::utils::error::ErrorSeverity;
use forecast_etl::utils::{logger, validation::Validate};
use forecast_etl::{
    CliConfig, ConfigProvider, ForecastError, ForecastService, ResultDispatcher, TomlConfig,
};

fn exit_on_config_error(e: &ForecastError) -> ! {
    tracing::error!("❌ Configuration validation failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}

fn load_config(cli: &CliConfig) -> Box<dyn ConfigProvider> {
    match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            };
            if let Err(e) = config.validate() {
                exit_on_config_error(&e);
            }
            Box::new(config)
        }
        None => {
            if let Err(e) = cli.validate() {
                exit_on_config_error(&e);
            }
            Box::new(cli.clone())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting forecast-etl");
    if cli.verbose {
        tracing::debug!("Locations: {:?}, format: {:?}", cli.locations, cli.format);
    }

    let config = load_config(&cli);

    let printer = ForecastPrinter::new(cli.format, std::io::stdout());
    let (dispatcher, context) = ResultDispatcher::channel(config.stale_policy(), printer);

    let service = match ForecastService::from_config(config.as_ref(), dispatcher) {
        Ok(service) => service,
        Err(e) => exit_on_config_error(&e),
    };

    for location in &cli.locations {
        service.fetch_forecast(location);
    }
    // Workers hold their own dispatcher clones; the context closes once the
    // last of them has reported.
    drop(service);

    let printer = context.run().await;
    let failures = printer.failures().to_vec();
    let worst = printer.worst_severity();
    let summarize_failures = !printer.reports_failures_inline();
    tracing::info!(
        "✅ {} forecast(s) delivered, {} failure(s)",
        printer.forecasts(),
        failures.len()
    );
    printer.finish()?;

    if summarize_failures {
        for failure in &failures {
            eprintln!("❌ {}: {}", failure_headline(failure.category), failure.message);
        }
    }

    let exit_code = match worst {
        None | Some(ErrorSeverity::Low) => 0,
        Some(ErrorSeverity::Medium) => 2,
        Some(ErrorSeverity::High) => 1,
        Some(ErrorSeverity::Critical) => 3,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
