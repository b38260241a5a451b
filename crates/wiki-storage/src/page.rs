//! The page entity.

/// A named unit of content.
///
/// Constructed per request, either from storage on load or from request
/// input on save. Storage is the only durable record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Unique identifier and storage key. Must satisfy [`is_valid_title`].
    pub title: String,
    /// Raw page content. No size or encoding constraint.
    pub body: Vec<u8>,
}

impl Page {
    /// Create a page from a title and body.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Create a page with an empty body.
    ///
    /// Used when editing a page that has never been saved.
    #[must_use]
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Check that a title is one or more ASCII alphanumeric characters.
///
/// Titles become file names, so nothing else may pass: no `.`, no `/`,
/// no whitespace, no non-ASCII.
#[must_use]
pub fn is_valid_title(title: &str) -> bool {
    !title.is_empty() && title.bytes().all(|b| b.is_ascii_alphanumeric())
}
