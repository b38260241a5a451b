//! HTTP server for the wiki.
//!
//! Serves three page operations over plain HTML:
//!
//! | Path           | Result                                              |
//! |----------------|-----------------------------------------------------|
//! | `/view/{title}` | rendered page, or redirect to `/edit/{title}`      |
//! | `/edit/{title}` | edit form, pre-filled when the page exists         |
//! | `/save/{title}` | stores form field `body`, redirects to `/view/...` |
//!
//! Titles are one or more ASCII letters or digits. Any other path is
//! answered with 404 before a handler runs.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use wiki_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 8080,
//!         data_dir: PathBuf::from("data"),
//!         templates_dir: None,
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum (single entry point)
//!                        │
//!                        └─► Dispatcher ──► parse_path ──► 404
//!                                │
//!                                └─► view / edit / save handler
//!                                        │
//!                                        ├─► PageStore (wiki-storage-fs)
//!                                        └─► Renderer (minijinja templates)
//! ```

mod app;
mod dispatch;
mod error;
mod handlers;
mod render;
mod route;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use wiki_storage::PageStore;
use wiki_storage_fs::FsPageStore;

pub use render::{TemplateError, Templates};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the page files.
    pub data_dir: PathBuf,
    /// Directory with `view.html` and `edit.html` (`None` uses built-in templates).
    pub templates_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            templates_dir: None,
        }
    }
}

/// Run the server.
///
/// Templates are loaded before the socket is bound; if they cannot be
/// loaded the server does not start.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the templates fail to load or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let templates = Templates::load(config.templates_dir.as_deref())?;
    match &config.templates_dir {
        Some(dir) => tracing::info!(dir = %dir.display(), "Loaded templates"),
        None => tracing::info!("Using built-in templates"),
    }

    let store: Arc<dyn PageStore> = Arc::new(FsPageStore::new(config.data_dir.clone()));
    let state = Arc::new(AppState::new(store, templates));

    let app = app::create_router(state);

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, data_dir = %config.data_dir.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from wiki config.
#[must_use]
pub fn server_config_from_config(config: &wiki_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        data_dir: config.storage_resolved.data_dir.clone(),
        templates_dir: config.templates_resolved.dir.clone(),
    }
}
