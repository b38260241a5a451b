//! Filesystem page store for the wiki.
//!
//! This crate provides [`FsPageStore`], a filesystem-based implementation of
//! the [`PageStore`](wiki_storage::PageStore) trait. Each page is one file:
//!
//! ```text
//! {data_dir}/
//! +-- FrontPage.txt
//! +-- TestPage.txt
//! ```
//!
//! Files hold the raw body bytes and are readable and writable by the owner
//! only. Saves write a temporary file next to the target and rename it into
//! place, so readers never observe a partial write.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use wiki_storage::{Page, PageStore};
//! use wiki_storage_fs::FsPageStore;
//!
//! let store = FsPageStore::new(PathBuf::from("data"));
//! store.save(&Page::new("TestPage", "Hello, TestPage!"))?;
//! let page = store.load("TestPage")?;
//! ```

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use wiki_storage::{Page, PageStore, StorageError, StorageErrorKind, is_valid_title};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// File extension for page files.
const PAGE_EXTENSION: &str = "txt";

/// Owner read/write, nothing for group or world.
#[cfg(unix)]
const PAGE_FILE_MODE: u32 = 0o600;

/// Filesystem page store.
///
/// Keeps no state besides the data directory: every call goes to disk.
#[derive(Debug, Clone)]
pub struct FsPageStore {
    /// Directory holding the page files.
    data_dir: PathBuf,
}

impl FsPageStore {
    /// Create a store rooted at `data_dir`.
    ///
    /// The directory is not created here; callers ensure it exists before
    /// serving.
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// File path for a title: `{data_dir}/{title}.txt`.
    #[must_use]
    pub fn page_path(&self, title: &str) -> PathBuf {
        self.data_dir.join(format!("{title}.{PAGE_EXTENSION}"))
    }

    /// Reject titles that are not plain alphanumeric file stems.
    ///
    /// Requests are already filtered by the route grammar; this keeps the
    /// store safe when used directly.
    fn validate_title(title: &str) -> Result<(), StorageError> {
        if is_valid_title(title) {
            Ok(())
        } else {
            Err(StorageError::invalid_title(title).with_backend(BACKEND))
        }
    }
}

impl PageStore for FsPageStore {
    fn load(&self, title: &str) -> Result<Page, StorageError> {
        Self::validate_title(title)?;
        let path = self.page_path(title);
        let body = fs::read(&path)
            .map_err(|e| StorageError::io(e, Some(path)).with_backend(BACKEND))?;
        Ok(Page::new(title, body))
    }

    fn save(&self, page: &Page) -> Result<(), StorageError> {
        Self::validate_title(&page.title)?;
        let path = self.page_path(&page.title);
        write_atomic(&self.data_dir, &path, &page.body).map_err(|e| save_error(e, path))?;
        tracing::debug!(title = %page.title, bytes = page.body.len(), "Saved page");
        Ok(())
    }
}

/// Map a write failure to a storage error.
///
/// A missing file or directory during a save is a fault of the data
/// directory, never a missing page.
fn save_error(err: io::Error, path: PathBuf) -> StorageError {
    let not_found = err.kind() == io::ErrorKind::NotFound;
    let mut error = StorageError::io(err, Some(path)).with_backend(BACKEND);
    if not_found {
        error.kind = StorageErrorKind::Other;
    }
    error
}

/// Write `body` to `path` through a temporary file in `dir`.
///
/// The temporary file is removed if any step fails, leaving the previous
/// content of `path` untouched.
fn write_atomic(dir: &Path, path: &Path, body: &[u8]) -> io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    restrict_permissions(tmp.as_file())?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(PAGE_FILE_MODE))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_page_store_is_send_sync() {
        assert_send_sync::<FsPageStore>();
    }

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    /// Names of all entries in `dir`, sorted.
    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_page_path() {
        let store = FsPageStore::new(PathBuf::from("/data"));

        assert_eq!(store.page_path("TestPage"), PathBuf::from("/data/TestPage.txt"));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());

        store.save(&Page::new("TestPage", "Hello, TestPage!")).unwrap();
        let page = store.load("TestPage").unwrap();

        assert_eq!(page.title, "TestPage");
        assert_eq!(page.body, b"Hello, TestPage!".to_vec());
    }

    #[test]
    fn test_save_writes_raw_body_to_txt_file() {
        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());

        store.save(&Page::new("Raw", vec![0u8, 1, 2, 0xff])).unwrap();

        assert_eq!(fs::read(temp_dir.path().join("Raw.txt")).unwrap(), vec![0u8, 1, 2, 0xff]);
        assert_eq!(dir_entries(temp_dir.path()), vec!["Raw.txt".to_owned()]);
    }

    #[test]
    fn test_load_reads_existing_file() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("Manual.txt"), "written elsewhere").unwrap();

        let store = FsPageStore::new(temp_dir.path().to_path_buf());
        let page = store.load("Manual").unwrap();

        assert_eq!(page.body, b"written elsewhere".to_vec());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());

        let err = store.load("NewPage").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_load_unreadable_entry_is_not_not_found() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("Odd.txt")).unwrap();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());

        let err = store.load("Odd").unwrap_err();

        assert!(!err.is_not_found(), "expected a fault, got {err}");
    }

    #[test]
    fn test_save_replaces_prior_content() {
        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());

        store.save(&Page::new("Page", "a much longer first version")).unwrap();
        store.save(&Page::new("Page", "short")).unwrap();

        assert_eq!(store.load("Page").unwrap().body, b"short".to_vec());
    }

    #[test]
    fn test_save_empty_body() {
        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());

        store.save(&Page::empty("Blank")).unwrap();

        assert!(store.load("Blank").unwrap().body.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());

        store.save(&Page::new("Private", "secret")).unwrap();

        let mode = fs::metadata(temp_dir.path().join("Private.txt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_invalid_titles_never_touch_disk() {
        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().join("inner"));
        fs::create_dir(temp_dir.path().join("inner")).unwrap();

        for title in ["", "..", "../escape", "a.b", "a/b", "with space"] {
            let err = store.save(&Page::new(title, "x")).unwrap_err();
            assert_eq!(err.kind, StorageErrorKind::InvalidTitle, "title {title:?}");
            let err = store.load(title).unwrap_err();
            assert_eq!(err.kind, StorageErrorKind::InvalidTitle, "title {title:?}");
        }

        assert_eq!(dir_entries(temp_dir.path()), vec!["inner".to_owned()]);
        assert!(dir_entries(&temp_dir.path().join("inner")).is_empty());
    }

    #[test]
    fn test_save_into_missing_dir_is_a_fault() {
        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().join("missing"));

        let err = store.save(&Page::new("Page", "x")).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::Other);
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let temp_dir = create_test_dir();
        // A directory in the page's place makes the final rename fail.
        fs::create_dir(temp_dir.path().join("Blocked.txt")).unwrap();
        fs::write(temp_dir.path().join("Blocked.txt").join("keep"), "x").unwrap();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());

        let result = store.save(&Page::new("Blocked", "new"));

        assert!(result.is_err());
        assert_eq!(dir_entries(temp_dir.path()), vec!["Blocked.txt".to_owned()]);
        assert!(temp_dir.path().join("Blocked.txt").join("keep").exists());
    }

    #[test]
    fn test_concurrent_saves_never_interleave() {
        let temp_dir = create_test_dir();
        let store = FsPageStore::new(temp_dir.path().to_path_buf());
        let body_a = vec![b'A'; 256 * 1024];
        let body_b = vec![b'B'; 256 * 1024];
        store.save(&Page::new("X", body_a.clone())).unwrap();

        let done = AtomicBool::new(false);
        std::thread::scope(|s| {
            let writer_a = s.spawn(|| {
                for _ in 0..20 {
                    store.save(&Page::new("X", body_a.clone())).unwrap();
                }
            });
            let writer_b = s.spawn(|| {
                for _ in 0..20 {
                    store.save(&Page::new("X", body_b.clone())).unwrap();
                }
            });
            s.spawn(|| {
                while !done.load(Ordering::Relaxed) {
                    let body = store.load("X").unwrap().body;
                    assert!(body == body_a || body == body_b, "observed a mixed body");
                }
            });
            writer_a.join().unwrap();
            writer_b.join().unwrap();
            done.store(true, Ordering::Relaxed);
        });

        let body = store.load("X").unwrap().body;
        assert!(body == body_a || body == body_b);
        assert_eq!(dir_entries(temp_dir.path()), vec!["X.txt".to_owned()]);
    }
}
