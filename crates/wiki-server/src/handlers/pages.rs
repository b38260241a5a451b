//! View, edit and save handlers.
//!
//! - `view`: render an existing page, or send the client to the editor
//! - `edit`: render the editor, pre-filled if the page exists
//! - `save`: store the submitted body and send the client to the page

use axum::response::{Html, IntoResponse, Response};
use wiki_storage::Page;

use crate::dispatch::Handler;
use crate::error::ServerError;
use crate::handlers::{PageRequest, found};
use crate::render::TemplateName;
use crate::route::Operation;
use crate::state::AppState;

/// Form field carrying the page body on save.
const BODY_FIELD: &str = "body";

/// Render a page into an HTML response.
fn render_page(state: &AppState, name: TemplateName, page: &Page) -> Result<Response, ServerError> {
    let html = state.renderer.render(name, page)?;
    Ok(Html(html).into_response())
}

/// Handle `/view/{title}`.
pub(crate) struct ViewHandler;

impl Handler for ViewHandler {
    fn handle(
        &self,
        state: &AppState,
        title: &str,
        _request: &PageRequest,
    ) -> Result<Response, ServerError> {
        match state.store.load(title) {
            Ok(page) => render_page(state, TemplateName::View, &page),
            Err(e) if e.is_not_found() => {
                tracing::debug!(title, "Page not found, redirecting to editor");
                Ok(found(&Operation::Edit.path_for(title)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Handle `/edit/{title}`.
pub(crate) struct EditHandler;

impl Handler for EditHandler {
    fn handle(
        &self,
        state: &AppState,
        title: &str,
        _request: &PageRequest,
    ) -> Result<Response, ServerError> {
        // Only a missing page starts out empty; store faults surface as errors.
        let page = match state.store.load(title) {
            Ok(page) => page,
            Err(e) if e.is_not_found() => Page::empty(title),
            Err(e) => return Err(e.into()),
        };
        render_page(state, TemplateName::Edit, &page)
    }
}

/// Handle `/save/{title}`.
pub(crate) struct SaveHandler;

impl Handler for SaveHandler {
    fn handle(
        &self,
        state: &AppState,
        title: &str,
        request: &PageRequest,
    ) -> Result<Response, ServerError> {
        let body = request.form_value(BODY_FIELD)?.unwrap_or_default();
        let page = Page::new(title, body);
        state.store.save(&page)?;
        tracing::info!(title, bytes = page.body.len(), "Page saved");
        Ok(found(&Operation::View.path_for(title)))
    }
}
