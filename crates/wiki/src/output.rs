//! Terminal reporting for the CLI.

use std::path::PathBuf;

use console::{Style, Term};
use wiki_config::Config;

/// What `wiki serve` is about to do, printed before the server starts.
#[derive(Debug)]
pub(crate) struct StartupReport {
    address: String,
    data_dir: PathBuf,
    templates_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl StartupReport {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            address: format!("{}:{}", config.server.host, config.server.port),
            data_dir: config.storage_resolved.data_dir.clone(),
            templates_dir: config.templates_resolved.dir.clone(),
            config_path: config.config_path.clone(),
        }
    }

    /// Headline followed by detail lines, unstyled.
    fn lines(&self) -> (String, Vec<String>) {
        let headline = format!("Serving wiki at http://{}/view/FrontPage", self.address);
        let templates = match &self.templates_dir {
            Some(dir) => dir.display().to_string(),
            None => "built-in".to_owned(),
        };
        let config = match &self.config_path {
            Some(path) => path.display().to_string(),
            None => "defaults (no wiki.toml found)".to_owned(),
        };
        let details = vec![
            format!("  Pages:     {}", self.data_dir.display()),
            format!("  Templates: {templates}"),
            format!("  Config:    {config}"),
        ];
        (headline, details)
    }

    /// Write the report to stderr, headline highlighted.
    pub(crate) fn print(&self) {
        let term = Term::stderr();
        let (headline, details) = self.lines();
        let _ = term.write_line(&Style::new().cyan().bold().apply_to(headline).to_string());
        for line in details {
            let _ = term.write_line(&line);
        }
    }
}

/// Write a fatal error to stderr in red.
pub(crate) fn print_error(err: &dyn std::fmt::Display) {
    let message = format!("Error: {err}");
    let _ = Term::stderr().write_line(&Style::new().red().apply_to(message).to_string());
}
