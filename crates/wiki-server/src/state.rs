//! Application state.
//!
//! Shared state for all request handlers. Everything here is read-only once
//! the server starts; the page store is the only thing that changes, and it
//! lives on disk.

use std::sync::Arc;

use wiki_storage::PageStore;

use crate::dispatch::Dispatcher;
use crate::render::{Renderer, Templates};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Durable page storage.
    pub(crate) store: Arc<dyn PageStore>,
    /// Renderer over the startup template set.
    pub(crate) renderer: Renderer,
    /// Operation to handler table.
    pub(crate) dispatcher: Dispatcher,
}

impl AppState {
    pub(crate) fn new(store: Arc<dyn PageStore>, templates: Templates) -> Self {
        Self {
            store,
            renderer: Renderer::new(templates),
            dispatcher: Dispatcher::new(),
        }
    }
}
