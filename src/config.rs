//! Centralized configuration management for csv2pdf

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Columns;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
const DEFAULT_USER_AGENT: &str = concat!("csv2pdf/", env!("CARGO_PKG_VERSION"));

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the PDFs are written to. `None` means a fresh temp directory per run.
    pub output_dir: Option<PathBuf>,
    /// Names of the required CSV columns
    pub columns: Columns,
    /// Number of rows shown before a run starts
    pub preview_rows: usize,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            columns: Columns::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let output_dir = std::env::var("CSV2PDF_OUTPUT_DIR").ok().map(PathBuf::from);

        let columns = Columns {
            name: std::env::var("CSV2PDF_NAME_COLUMN").unwrap_or(defaults.columns.name),
            url: std::env::var("CSV2PDF_URL_COLUMN").unwrap_or(defaults.columns.url),
        };

        let http = HttpConfig {
            timeout_seconds: parse_env_var("CSV2PDF_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.http.timeout_seconds),
            user_agent: std::env::var("CSV2PDF_USER_AGENT").unwrap_or(defaults.http.user_agent),
        };

        Ok(Config {
            output_dir,
            columns,
            preview_rows: parse_env_var("CSV2PDF_PREVIEW_ROWS")?.unwrap_or(defaults.preview_rows),
            http,
        })
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Output directory for a run: the configured one, or a new timestamped
    /// directory under the system temp dir. The directory is not created here.
    pub fn resolve_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => std::env::temp_dir().join(format!(
                "csv2pdf-{}",
                chrono::Local::now().format("%Y%m%d-%H%M%S-%3f")
            )),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be at least one second"));
        }

        if self.columns.name.trim().is_empty() || self.columns.url.trim().is_empty() {
            return Err(anyhow::anyhow!("CSV column names must not be empty"));
        }

        if self.columns.name == self.columns.url {
            return Err(anyhow::anyhow!(
                "File name and URL columns must differ (both are '{}')",
                self.columns.name
            ));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
