use clap::Parser;
use inat_species::utils::{logger, validation::Validate};
use inat_species::{CliConfig, EtlEngine, InatClient, LocalStorage, SurveyError, SurveyPipeline};

fn fail(stage: &str, e: &SurveyError) -> ! {
    tracing::debug!(
        "{} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting inat-species");

    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => fail("Configuration", &e),
    };
    tracing::debug!("Resolved config: {:?}", config);

    let client = match InatClient::new(&config.api) {
        Ok(client) => client,
        Err(e) => fail("HTTP client setup", &SurveyError::config(e.to_string())),
    };

    tracing::info!(
        "Surveying place {} at up to {} API calls per minute",
        config.place_id,
        config.api.calls_per_minute
    );
    let pipeline = SurveyPipeline::new(LocalStorage::new(), config, client);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Data collection complete!");
            println!("✅ Data collection complete! Results saved to {}", summary.output_path);
            println!("Total species: {}", summary.rows_written);
            if !summary.skipped.is_empty() {
                println!(
                    "⚠️ {} species skipped after fetch failures (see log)",
                    summary.skipped.len()
                );
            }
        }
        Err(e) => fail("Survey", &e),
    }
}
