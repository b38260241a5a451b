//! Operation dispatch.
//!
//! The [`Dispatcher`] owns a fixed table from [`Operation`] to [`Handler`].
//! The table is built once when the server starts and never changes, so it
//! is shared between request tasks without locking.

use std::collections::HashMap;

use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::handlers::PageRequest;
use crate::handlers::pages::{EditHandler, SaveHandler, ViewHandler};
use crate::route::{InvalidPath, Operation, parse_path};
use crate::state::AppState;

/// A page operation.
///
/// `title` has passed the path grammar but is otherwise untrusted.
pub(crate) trait Handler: Send + Sync {
    fn handle(
        &self,
        state: &AppState,
        title: &str,
        request: &PageRequest,
    ) -> Result<Response, ServerError>;
}

/// Route table from operation token to handler.
pub(crate) struct Dispatcher {
    handlers: HashMap<Operation, Box<dyn Handler>>,
}

impl Dispatcher {
    /// Table with the `view`, `edit` and `save` handlers.
    pub(crate) fn new() -> Self {
        Self::from_handlers([
            (Operation::View, Box::new(ViewHandler) as Box<dyn Handler>),
            (Operation::Edit, Box::new(EditHandler)),
            (Operation::Save, Box::new(SaveHandler)),
        ])
    }

    pub(crate) fn from_handlers(
        handlers: impl IntoIterator<Item = (Operation, Box<dyn Handler>)>,
    ) -> Self {
        Self {
            handlers: handlers.into_iter().collect(),
        }
    }

    /// Validate `raw_path` and run the matching handler.
    ///
    /// Always produces a response: unmatched paths become 404 without any
    /// handler running, handler errors become their error response.
    pub(crate) fn route(&self, state: &AppState, raw_path: &str, request: &PageRequest) -> Response {
        self.dispatch(state, raw_path, request)
            .unwrap_or_else(IntoResponse::into_response)
    }

    fn dispatch(
        &self,
        state: &AppState,
        raw_path: &str,
        request: &PageRequest,
    ) -> Result<Response, ServerError> {
        let path = parse_path(raw_path).inspect_err(|_| {
            tracing::debug!(path = raw_path, "No page route matches");
        })?;
        let handler = self.handlers.get(&path.operation).ok_or(InvalidPath)?;
        handler.handle(state, path.title, request)
    }
}
