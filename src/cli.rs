use clap::{Parser, Subcommand};
use std::path::PathBuf;

use csv2pdf::config::Config;

#[derive(Parser)]
#[command(name = "csv2pdf")]
#[command(about = "Download the PDFs listed in a CSV file (columns: nom_fichier, url_pdf)")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download every PDF listed in the CSV file
    Fetch {
        /// CSV file with a header row
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (default: a new directory under the system temp dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Header of the file name column
        #[arg(long)]
        name_column: Option<String>,

        /// Header of the URL column
        #[arg(long)]
        url_column: Option<String>,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show the first rows of the CSV file without downloading anything
    Preview {
        /// CSV file with a header row
        #[arg(short, long)]
        input: PathBuf,

        /// Number of rows to show
        #[arg(short, long)]
        rows: Option<usize>,

        /// Header of the file name column
        #[arg(long)]
        name_column: Option<String>,

        /// Header of the URL column
        #[arg(long)]
        url_column: Option<String>,
    },
}

impl Commands {
    /// Layer command-line flags over the environment configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        match self {
            Commands::Fetch {
                output,
                timeout,
                name_column,
                url_column,
                ..
            } => {
                if let Some(output) = output {
                    config.output_dir = Some(output.clone());
                }
                if let Some(timeout) = timeout {
                    config.http.timeout_seconds = *timeout;
                }
                override_columns(config, name_column, url_column);
            }
            Commands::Preview {
                rows,
                name_column,
                url_column,
                ..
            } => {
                if let Some(rows) = rows {
                    config.preview_rows = *rows;
                }
                override_columns(config, name_column, url_column);
            }
        }
    }
}

fn override_columns(config: &mut Config, name: &Option<String>, url: &Option<String>) {
    if let Some(name) = name {
        config.columns.name = name.clone();
    }
    if let Some(url) = url {
        config.columns.url = url.clone();
    }
}
