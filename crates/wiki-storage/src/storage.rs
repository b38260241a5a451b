//! Page store trait and error types.
//!
//! Provides the core [`PageStore`] trait for loading and saving pages,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Title Convention
//!
//! Every title passed to a store is the identifier extracted from a request
//! path and has already been checked by the route grammar. Backends map the
//! title to their own storage key deterministically.

use std::path::PathBuf;

use crate::page::Page;

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// No entry exists for the title.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Title is not a valid storage key.
    InvalidTitle,
    /// Other/unknown error category.
    Other,
}

impl std::fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotFound => "Not found",
            Self::PermissionDenied => "Permission denied",
            Self::InvalidTitle => "Invalid title",
            Self::Other => "Error",
        })
    }
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create an invalid title error.
    #[must_use]
    pub fn invalid_title(title: &str) -> Self {
        Self::new(StorageErrorKind::InvalidTitle).with_path(title)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// True if the entry simply does not exist.
    ///
    /// Every other kind is a genuine fault and must not be treated as a
    /// missing page.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        write!(f, "{}", self.kind)?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Durable page storage.
///
/// Implementations keep no page cache between calls: every `load` and `save`
/// goes through the backend. They must be safe to call concurrently from
/// request tasks.
pub trait PageStore: Send + Sync {
    /// Load the page stored under `title`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] with kind [`StorageErrorKind::NotFound`] if no
    /// entry exists, or another kind if the backend fails. No partial page is
    /// ever returned.
    fn load(&self, title: &str) -> Result<Page, StorageError>;

    /// Save `page`, fully replacing any prior content for its title.
    ///
    /// A concurrent `load` of the same title observes either the old content
    /// or the new content in full. The entry is created if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails. Prior content is left
    /// untouched in that case.
    fn save(&self, page: &Page) -> Result<(), StorageError>;
}
