//! csv2pdf TUI binary entry point

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

use csv2pdf::{config::Config, tui::App};

#[derive(Parser)]
#[command(name = "csv2pdf-tui")]
#[command(about = "Terminal UI for downloading the PDFs listed in a CSV file")]
#[command(version)]
pub struct Cli {
    /// CSV file with a header row
    pub input: PathBuf,

    /// Output directory (default: a new directory under the system temp dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "csv2pdf_tui=info,csv2pdf=info");
    }

    // Log to file only, so the display is not disturbed
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("csv2pdf_tui.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    info!("Starting csv2pdf TUI...");

    let mut config = Config::from_env()?;
    if let Some(output) = cli.output {
        config.output_dir = Some(output);
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout_seconds = timeout;
    }
    config.validate()?;

    let mut app = App::new(config, &cli.input);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(_) => {
            info!("csv2pdf TUI exited successfully");
        }
        Err(e) => {
            error!("csv2pdf TUI encountered an error: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    if let Some(summary) = &app.summary {
        println!(
            "Downloaded {} of {} PDFs ({} failed) into {}",
            summary.successful,
            summary.total,
            summary.failed,
            summary.output_dir.display()
        );
    }

    Ok(())
}
