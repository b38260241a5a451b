//! `wiki serve` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use wiki_config::{CliSettings, Config};
use wiki_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::StartupReport;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover wiki.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding page files (overrides config).
    #[arg(short, long, env = "WIKI_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory with view.html and edit.html templates (overrides config).
    #[arg(short, long)]
    templates_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (request and save logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            data_dir: self.data_dir,
            templates_dir: self.templates_dir,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        ensure_data_dir(&config.storage_resolved.data_dir)?;

        StartupReport::from_config(&config).print();

        run_server(server_config_from_config(&config))
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Ensure the page data directory exists.
fn ensure_data_dir(data_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(data_dir).map_err(|e| {
        CliError::Server(format!(
            "Failed to create data directory {}: {e}",
            data_dir.display()
        ))
    })
}
