//! Error types for the HTTP server.

use std::error::Error as _;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use wiki_storage::StorageError;

use crate::handlers::FormError;
use crate::render::RenderError;
use crate::route::InvalidPath;

/// Server error type.
///
/// Every handler failure ends up here and is turned into a response; nothing
/// escapes the request task.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Path does not name a page operation.
    #[error("404 page not found")]
    NotFound(#[from] InvalidPath),

    /// Submitted form could not be decoded.
    #[error("{0}")]
    Form(#[from] FormError),

    /// Page store failure.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Template execution failure.
    #[error("{0}")]
    Render(#[from] RenderError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Form(e) => e.status(),
            Self::Storage(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    ///
    /// Storage failures report their kind and cause only; file paths stay in
    /// the server log.
    fn client_message(&self) -> String {
        match self {
            Self::Storage(e) => match e.source() {
                Some(source) => format!("{}: {source}", e.kind),
                None => e.kind.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else if let Self::Form(e) = &self {
            tracing::warn!(error = %e, "Rejected form submission");
        }
        (status, self.client_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use wiki_storage::StorageErrorKind;

    use super::*;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_not_found_status() {
        let response = ServerError::from(InvalidPath).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_form_error_statuses() {
        let unsupported = ServerError::from(FormError::UnsupportedMediaType("text/csv".to_owned()));
        let malformed = ServerError::from(FormError::Malformed("cut".to_owned()));

        assert_eq!(
            unsupported.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(malformed.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_storage_error_body_hides_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ServerError::from(
            StorageError::io(io_err, Some("/srv/wiki/data/Locked.txt".into())).with_backend("Fs"),
        );
        assert!(err.to_string().contains("/srv/wiki/data/Locked.txt"));

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Permission denied: access denied");
    }

    #[tokio::test]
    async fn test_storage_error_without_source() {
        let err = ServerError::from(
            StorageError::new(StorageErrorKind::Other).with_path("/srv/wiki/data/X.txt"),
        );

        assert_eq!(body_string(err.into_response()).await, "Error");
    }
}
