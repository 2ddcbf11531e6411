use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{error, info};

mod cli;

use cli::{Cli, Commands};
use csv2pdf::{
    config::Config,
    downloader::HttpFetcher,
    events::LogObserver,
    ingest,
    models::Summary,
    Batch,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "csv2pdf=info");
    }

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_appender = tracing_appender::rolling::never(".", "csv2pdf.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    cli.command.apply_overrides(&mut config);
    config.validate()?;

    match &cli.command {
        Commands::Fetch { input, json, .. } => {
            let summary = fetch(input, &config).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::Preview { input, .. } => {
            let rows = ingest::read_rows_from_path(input, &config.columns)
                .with_context(|| format!("Cannot preview {}", input.display()))?;
            let shown = ingest::preview(&rows, config.preview_rows);

            println!("Preview of {} ({} rows):", input.display(), rows.len());
            for row in shown {
                println!("{:>4}  {}  {}", row.position, row.name, row.url);
            }
            if rows.len() > shown.len() {
                println!("      ... {} more rows", rows.len() - shown.len());
            }
        }
    }

    Ok(())
}

async fn fetch(input: &Path, config: &Config) -> Result<Summary> {
    let output_dir = config.resolve_output_dir();
    info!("Reading {}", input.display());

    let mut batch = Batch::new(&output_dir);
    if let Err(e) = batch.load_path(input, &config.columns) {
        error!("Cannot start download: {}", e);
        return Err(e).with_context(|| format!("Invalid input file {}", input.display()));
    }

    let fetcher = HttpFetcher::new(config)?;
    let summary = batch.run(&fetcher, &mut LogObserver).await?;
    Ok(summary)
}

fn print_summary(summary: &Summary) {
    for row in summary.rows.iter().filter(|r| r.reason.is_some()) {
        println!(
            "✗ row {} ({}): {}",
            row.position,
            if row.name.is_empty() { "-" } else { row.name.as_str() },
            row.reason.as_deref().unwrap_or_default()
        );
    }
    println!(
        "Downloaded {} of {} PDFs ({} failed) into {}",
        summary.successful,
        summary.total,
        summary.failed,
        summary.output_dir.display()
    );
}
