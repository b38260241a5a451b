//! Page entity and storage abstraction for the wiki.
//!
//! This crate provides the [`Page`] value and the [`PageStore`] trait that
//! decouples request handling from the durable backend:
//!
//! - **Unit testing** handlers without touching the real filesystem
//! - **Backend flexibility**: the filesystem backend lives in `wiki-storage-fs`
//!
//! # Architecture
//!
//! - [`Page`]: title + raw body bytes, built per request and never cached
//! - [`PageStore`] trait with `load()` and `save()`
//! - [`StorageError`] with a semantic [`StorageErrorKind`]
//! - [`MockPageStore`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use wiki_storage::{Page, PageStore};
//!
//! store.save(&Page::new("TestPage", "Hello, TestPage!"))?;
//! let page = store.load("TestPage")?;
//! assert_eq!(page.body, b"Hello, TestPage!");
//! ```

#[cfg(feature = "mock")]
mod mock;
mod page;
mod storage;

#[cfg(feature = "mock")]
pub use mock::MockPageStore;
pub use page::{Page, is_valid_title};
pub use storage::{PageStore, StorageError, StorageErrorKind};
