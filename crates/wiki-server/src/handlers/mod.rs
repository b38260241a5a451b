//! Page operation handlers.

pub(crate) mod pages;

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode;

/// A decoded form field: name and raw value bytes.
type FormField = (String, Vec<u8>);

/// The submitted form could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum FormError {
    /// Body sent with a content type that is not a form encoding.
    #[error("unsupported form content type: {0}")]
    UnsupportedMediaType(String),

    /// Form body is truncated or not valid for its content type.
    #[error("malformed form body: {0}")]
    Malformed(String),
}

impl FormError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Malformed(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Request input a handler may read.
///
/// Only the form is exposed: `save` reads its `body` field, `view` and
/// `edit` ignore the request entirely. A body that cannot be decoded is kept
/// as an error so it only fails the operation that reads it; path
/// validation still runs first.
#[derive(Debug)]
pub(crate) struct PageRequest {
    query: Option<String>,
    form: Result<Vec<FormField>, FormError>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            query: None,
            form: Ok(Vec::new()),
        }
    }
}

impl PageRequest {
    #[cfg(test)]
    pub(crate) fn new(query: Option<&str>, form: Result<Vec<FormField>, FormError>) -> Self {
        Self {
            query: query.map(ToOwned::to_owned),
            form,
        }
    }

    /// Raw bytes of the first value of form field `key`.
    ///
    /// Fields from a `POST`, `PUT` or `PATCH` body are searched first, then
    /// the query string.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] recorded when the body could not be decoded.
    pub(crate) fn form_value(&self, key: &str) -> Result<Option<Vec<u8>>, FormError> {
        let fields = self.form.as_ref().map_err(Clone::clone)?;
        if let Some((_, value)) = fields.iter().find(|(name, _)| name == key) {
            return Ok(Some(value.clone()));
        }
        let query_value = self
            .query
            .as_deref()
            .map(|q| parse_urlencoded(q.as_bytes()))
            .and_then(|pairs| pairs.into_iter().find(|(name, _)| name == key))
            .map(|(_, value)| value);
        Ok(query_value)
    }
}

impl<S: Send + Sync> FromRequest<S> for PageRequest {
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(ToOwned::to_owned);
        let has_form_body = matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH);
        let form = if has_form_body {
            read_form(req, state).await
        } else {
            Ok(Vec::new())
        };
        Ok(Self { query, form })
    }
}

/// Form encodings accepted in a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormEncoding {
    Urlencoded,
    Multipart,
}

impl FormEncoding {
    /// Encoding named by the `Content-Type` header.
    ///
    /// A missing header is read as urlencoded. `Err` carries the unsupported
    /// media type.
    fn from_headers(headers: &HeaderMap) -> Result<Self, String> {
        let Some(value) = headers.get(header::CONTENT_TYPE) else {
            return Ok(Self::Urlencoded);
        };
        let raw = String::from_utf8_lossy(value.as_bytes());
        let media_type = raw.split(';').next().unwrap_or_default().trim();
        if media_type.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            Ok(Self::Urlencoded)
        } else if media_type.eq_ignore_ascii_case("multipart/form-data") {
            Ok(Self::Multipart)
        } else {
            Err(media_type.to_owned())
        }
    }
}

/// Decode the form fields carried in the request body.
async fn read_form<S: Send + Sync>(
    req: Request,
    state: &S,
) -> Result<Vec<FormField>, FormError> {
    match FormEncoding::from_headers(req.headers()) {
        Ok(FormEncoding::Urlencoded) => {
            let body = read_body(req, state).await?;
            Ok(parse_urlencoded(&body))
        }
        Ok(FormEncoding::Multipart) => read_multipart(req, state).await,
        // An empty body carries no form, whatever its declared type.
        Err(media_type) => {
            if read_body(req, state).await?.is_empty() {
                Ok(Vec::new())
            } else {
                Err(FormError::UnsupportedMediaType(media_type))
            }
        }
    }
}

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<Bytes, FormError> {
    Bytes::from_request(req, state)
        .await
        .map_err(|e| FormError::Malformed(e.body_text()))
}

async fn read_multipart<S: Send + Sync>(
    req: Request,
    state: &S,
) -> Result<Vec<FormField>, FormError> {
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|e| FormError::Malformed(e.body_text()))?;
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FormError::Malformed(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        let value = field
            .bytes()
            .await
            .map_err(|e| FormError::Malformed(e.body_text()))?;
        fields.push((name, value.to_vec()));
    }
    Ok(fields)
}

/// Split an `application/x-www-form-urlencoded` payload into fields.
///
/// Values are percent-decoded to raw bytes with no UTF-8 requirement; names
/// are decoded lossily.
fn parse_urlencoded(encoded: &[u8]) -> Vec<FormField> {
    encoded
        .split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = match pair.iter().position(|&b| b == b'=') {
                Some(eq) => (&pair[..eq], &pair[eq + 1..]),
                None => (pair, &[][..]),
            };
            let name = String::from_utf8_lossy(&decode_component(name)).into_owned();
            (name, decode_component(value))
        })
        .collect()
}

/// Decode one urlencoded component: `+` is a space, `%XX` is a raw byte.
fn decode_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}

/// `302 Found` redirect to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}
