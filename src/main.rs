use anyhow::Context;
use clap::Parser;
use paper_updater::config::LogFormat;
use paper_updater::core::ConfigProvider;
use paper_updater::utils::{logger, validation::Validate};
use paper_updater::{
    update, ArxivPipeline, CliConfig, LocalStorage, RunReport, TomlConfig, UpdateEngine,
    UpdateError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting paper-updater");
    tracing::debug!("CLI config: {:?}", cli);

    let (dry_run, json) = (cli.dry_run, cli.json);

    let code = match cli.config.clone() {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            let config = TomlConfig::from_file(&path)
                .with_context(|| format!("failed to load config file '{}'", path));
            match config {
                Ok(config) => run(config, dry_run, json).await?,
                Err(e) => {
                    tracing::error!("{:#}", e);
                    eprintln!("Error: {:#}", e);
                    1
                }
            }
        }
        None => run(cli, dry_run, json).await?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Returns the process exit status.
async fn run<C: ConfigProvider + Validate>(
    config: C,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<i32> {
    if let Err(e) = config.validate() {
        return report_failure(&e, json);
    }

    tracing::info!(
        "Author: {} -> {}{}",
        config.author(),
        config.output_path(),
        if dry_run { " (dry run)" } else { "" }
    );

    if dry_run {
        let pipeline = match ArxivPipeline::new(LocalStorage::new("."), config) {
            Ok(pipeline) => pipeline,
            Err(e) => return report_failure(&e, json),
        };
        return match UpdateEngine::new(pipeline).render_only().await {
            Ok(fragment) => {
                if json {
                    println!("{}", serde_json::to_string(&RunReport::dry_run(&fragment))?);
                } else {
                    print!("{}", fragment.html);
                }
                Ok(0)
            }
            Err(e) => report_failure(&e, json),
        };
    }

    match update(config).await {
        Ok(outcome) => {
            if json {
                println!("{}", serde_json::to_string(&RunReport::from_outcome(&outcome))?);
            } else if outcome.is_changed() {
                println!("Updated {}", outcome.path().display());
            } else {
                println!("{} is up to date", outcome.path().display());
            }
            Ok(0)
        }
        Err(e) => report_failure(&e, json),
    }
}

fn report_failure(e: &UpdateError, json: bool) -> anyhow::Result<i32> {
    tracing::error!(
        "Update failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    if e.is_fetch_error() {
        tracing::warn!("Existing output left untouched");
    }

    if json {
        println!("{}", serde_json::to_string(&RunReport::failed(e.to_string()))?);
    }
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());

    Ok(e.exit_code())
}
