//! Mock page store for testing.
//!
//! Provides [`MockPageStore`] for unit testing handlers without filesystem access.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::page::Page;
use crate::storage::{PageStore, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// Mock page store for testing.
///
/// Stores page bodies in memory. Use the builder methods to configure the
/// mock with test data or to make specific titles fail.
///
/// # Example
///
/// ```ignore
/// use wiki_storage::{MockPageStore, PageStore, StorageErrorKind};
///
/// let store = MockPageStore::new()
///     .with_page("TestPage", "Hello, TestPage!")
///     .with_failing_title("Broken", StorageErrorKind::PermissionDenied);
///
/// let page = store.load("TestPage").unwrap();
/// assert!(store.load("Broken").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockPageStore {
    pages: RwLock<HashMap<String, Vec<u8>>>,
    failing: RwLock<HashMap<String, StorageErrorKind>>,
    read_only: RwLock<HashSet<String>>,
}

impl MockPageStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page with the given title and body.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, title: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.pages.write().unwrap().insert(title.into(), body.into());
        self
    }

    /// Make both `load` and `save` fail for `title` with the given kind.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_title(self, title: impl Into<String>, kind: StorageErrorKind) -> Self {
        self.failing.write().unwrap().insert(title.into(), kind);
        self
    }

    /// Make `save` fail with `PermissionDenied` for `title` while `load` keeps working.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_read_only_title(self, title: impl Into<String>) -> Self {
        self.read_only.write().unwrap().insert(title.into());
        self
    }

    /// Current body stored for `title`, bypassing failure injection.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn body(&self, title: &str) -> Option<Vec<u8>> {
        self.pages.read().unwrap().get(title).cloned()
    }

    fn injected_failure(&self, title: &str) -> Option<StorageError> {
        self.failing.read().unwrap().get(title).map(|kind| {
            StorageError::new(*kind)
                .with_path(title)
                .with_backend(BACKEND)
        })
    }
}

impl PageStore for MockPageStore {
    fn load(&self, title: &str) -> Result<Page, StorageError> {
        if let Some(err) = self.injected_failure(title) {
            return Err(err);
        }
        self.pages
            .read()
            .unwrap()
            .get(title)
            .map(|body| Page::new(title, body.clone()))
            .ok_or_else(|| StorageError::not_found(title).with_backend(BACKEND))
    }

    fn save(&self, page: &Page) -> Result<(), StorageError> {
        if let Some(err) = self.injected_failure(&page.title) {
            return Err(err);
        }
        if self.read_only.read().unwrap().contains(&page.title) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_path(page.title.as_str())
                .with_backend(BACKEND));
        }
        self.pages
            .write()
            .unwrap()
            .insert(page.title.clone(), page.body.clone());
        Ok(())
    }
}
