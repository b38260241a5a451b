//! Router construction.
//!
//! Every request goes to a single entry point that hands the raw path to the
//! [`Dispatcher`](crate::dispatch::Dispatcher). Security headers and request
//! tracing wrap all responses.

use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Uri, header};
use axum::response::Response;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::PageRequest;
use crate::state::AppState;

/// Content-Security-Policy for wiki pages.
///
/// Pages are server-rendered HTML without scripts. The only form posts back
/// to `/save/` on this origin.
const CSP: &str = "default-src 'self'; \
                   script-src 'none'; \
                   style-src 'self' 'unsafe-inline'; \
                   img-src 'self' data:; \
                   form-action 'self'; \
                   frame-ancestors 'none'";

/// Create the application router.
///
/// Page bodies have no size limit, so the default request body limit is off.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch_request)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(security_header(header::CONTENT_SECURITY_POLICY, CSP))
                .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                .layer(security_header(header::X_FRAME_OPTIONS, "DENY")),
        )
        .with_state(state)
}

/// Layer that sets `name` on every response, replacing any handler value.
fn security_header(
    name: header::HeaderName,
    value: &'static str,
) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Transport entry point: forward the raw path and form input to the dispatcher.
async fn dispatch_request(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    request: PageRequest,
) -> Response {
    state.dispatcher.route(&state, uri.path(), &request)
}
