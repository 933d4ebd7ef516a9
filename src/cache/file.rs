//! File Cache Module
//!
//! Persists one [`CacheItem`] per key as `<dir>/<key><extension>`.
//! There is no index: `clear` removes the whole directory.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::item::{self, CacheItem};
use crate::cache::ttl::{self, Ttl};
use crate::cache::{key, Cache};
use crate::error::{CacheError, Result};
use crate::storage::{Filesystem, LocalFilesystem};

/// Extension used for cache files unless another is configured.
pub const DEFAULT_EXTENSION: &str = ".do";

// == File Cache ==
/// Cache backend storing each key in its own file.
#[derive(Debug, Clone)]
pub struct FileCache<F = LocalFilesystem> {
    /// Filesystem the records are written through
    fs: F,
    /// Directory holding the cache files
    dir: PathBuf,
    /// Suffix appended to each key to form its file name
    extension: String,
}

impl FileCache<LocalFilesystem> {
    /// Creates a file cache in `dir` on the local filesystem using [`DEFAULT_EXTENSION`].
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_filesystem(LocalFilesystem, dir, DEFAULT_EXTENSION)
    }

    /// Creates a file cache in `dir` on the local filesystem with a custom extension.
    pub fn with_extension(dir: impl AsRef<Path>, extension: impl Into<String>) -> Result<Self> {
        Self::with_filesystem(LocalFilesystem, dir, extension)
    }
}

impl<F: Filesystem> FileCache<F> {
    // == Constructor ==
    /// Creates a file cache writing through `fs`.
    ///
    /// Trailing separators on `dir` are dropped. The directory is created if
    /// it does not exist yet; failure to create it is logged and retried on
    /// the next `set`.
    ///
    /// # Errors
    /// [`CacheError::InvalidDirectory`] if `dir` is empty. `clear` removes
    /// the whole directory, so the cache needs one of its own.
    pub fn with_filesystem(
        fs: F,
        dir: impl AsRef<Path>,
        extension: impl Into<String>,
    ) -> Result<Self> {
        let dir: PathBuf = dir.as_ref().components().collect();
        if dir.as_os_str().is_empty() {
            return Err(CacheError::InvalidDirectory(
                "cache directory must not be empty".to_string(),
            ));
        }

        let cache = Self {
            fs,
            dir,
            extension: extension.into(),
        };
        cache.ensure_dir();
        Ok(cache)
    }

    /// Returns the cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn ensure_dir(&self) -> bool {
        if self.fs.exists(&self.dir) {
            return true;
        }

        match self.fs.make_directory(&self.dir) {
            Ok(()) => {
                debug!(dir = %self.dir.display(), "created cache directory");
                true
            }
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "failed to create cache directory");
                false
            }
        }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}", key, self.extension))
    }

    /// Reads the record for `key`, returning it only if it is still valid.
    fn read_item(&self, key: &str) -> Option<CacheItem> {
        let path = self.file_path(key);

        let bytes = match self.fs.read(&path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read cache file");
                return None;
            }
        };

        let Some(item) = CacheItem::decode(&bytes) else {
            debug!(path = %path.display(), "ignoring unreadable cache file");
            return None;
        };

        item::is_valid(key, &item, item::current_timestamp()).then_some(item)
    }
}

impl<F: Filesystem> Cache for FileCache<F> {
    fn get(&self, key: &str, default: Value) -> Result<Value> {
        if !key::validate(key)? {
            return Ok(default);
        }

        Ok(self.read_item(key).map(|item| item.data).unwrap_or(default))
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Ttl>) -> Result<bool> {
        if !key::validate(key)? {
            return Ok(false);
        }

        if !self.ensure_dir() {
            return Ok(false);
        }

        let item = CacheItem::new(key, value, ttl::to_seconds(ttl), item::current_timestamp());
        let bytes = match item.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "failed to encode cache item");
                return Ok(false);
            }
        };

        let path = self.file_path(key);
        match self.fs.write(&path, &bytes) {
            Ok(()) => {
                debug!(key, expiry = item.expiry, "stored cache file");
                Ok(true)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to write cache file");
                Ok(false)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        if !key::validate(key)? {
            return Ok(false);
        }

        let path = self.file_path(key);
        match self.fs.delete(&path, false) {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to delete cache file");
                Ok(false)
            }
        }
    }

    fn clear(&self) -> bool {
        match self.fs.delete(&self.dir, true) {
            Ok(_) => {
                debug!(dir = %self.dir.display(), "cleared cache directory");
                true
            }
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "failed to clear cache directory");
                false
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;
    use tempfile::TempDir;

    fn create_test_cache() -> (TempDir, FileCache) {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache")).unwrap();
        (tmp, cache)
    }

    #[test]
    fn test_new_creates_directory() {
        let (_tmp, cache) = create_test_cache();
        assert!(cache.dir().is_dir());
        assert_eq!(cache.extension(), DEFAULT_EXTENSION);
    }

    #[test]
    fn test_trailing_separator_is_trimmed() {
        let tmp = TempDir::new().unwrap();
        let with_slash = format!("{}/", tmp.path().join("cache").display());
        let cache = FileCache::new(with_slash).unwrap();

        assert_eq!(cache.dir(), tmp.path().join("cache"));
    }

    #[test]
    fn test_empty_directory_is_rejected() {
        assert!(matches!(
            FileCache::new(""),
            Err(CacheError::InvalidDirectory(_))
        ));
        assert!(matches!(
            FileCache::with_extension("", ".cache"),
            Err(CacheError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn test_set_writes_one_file_per_key() {
        let (_tmp, cache) = create_test_cache();

        assert!(cache.set("alpha", json!("Alpha"), None).unwrap());

        let path = cache.dir().join("alpha.do");
        let item = CacheItem::decode(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(item.key, "alpha");
        assert_eq!(item.data, json!("Alpha"));
        assert_eq!(item.expiry, 0);
    }

    #[test]
    fn test_custom_extension() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::with_extension(tmp.path(), ".cache").unwrap();

        cache.set("alpha", json!(1), None).unwrap();
        assert!(tmp.path().join("alpha.cache").is_file());
    }

    #[test]
    fn test_get_ignores_garbage_file() {
        let (_tmp, cache) = create_test_cache();
        std::fs::write(cache.dir().join("junk.do"), b"\x00\x01 not a record").unwrap();

        assert_eq!(cache.get("junk", json!("fallback")).unwrap(), json!("fallback"));
    }

    #[test]
    fn test_get_ignores_record_for_other_key() {
        let (_tmp, cache) = create_test_cache();
        let foreign = CacheItem::new("other", json!("secret"), 0, item::current_timestamp());
        std::fs::write(cache.dir().join("mine.do"), foreign.encode().unwrap()).unwrap();

        assert_eq!(cache.get("mine", Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_get_ignores_expired_record() {
        let (_tmp, cache) = create_test_cache();
        let stale = CacheItem {
            key: "old".to_string(),
            data: json!("stale"),
            expiry: item::current_timestamp() - 10,
        };
        std::fs::write(cache.dir().join("old.do"), stale.encode().unwrap()).unwrap();

        assert!(!cache.has("old").unwrap());
    }

    #[test]
    fn test_negative_ttl_is_already_expired() {
        let (_tmp, cache) = create_test_cache();

        assert!(cache.set("gone", json!("value"), Some(Ttl::Seconds(-5))).unwrap());
        assert_eq!(cache.get("gone", json!("default")).unwrap(), json!("default"));
    }

    #[test]
    fn test_clear_then_set_recreates_directory() {
        let (_tmp, cache) = create_test_cache();
        cache.set("a", json!(1), None).unwrap();

        assert!(cache.clear());
        assert!(!cache.dir().exists());
        assert!(cache.clear(), "Clearing a missing directory succeeds");

        assert!(cache.set("b", json!(2), None).unwrap());
        assert_eq!(cache.get("b", Value::Null).unwrap(), json!(2));
    }

    #[test]
    fn test_malformed_key_never_touches_disk() {
        let (_tmp, cache) = create_test_cache();

        assert!(!cache.set("../escape", json!(1), None).unwrap());
        assert!(!cache.delete("a.b").unwrap());
        assert_eq!(std::fs::read_dir(cache.dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_key_is_error() {
        let (_tmp, cache) = create_test_cache();
        assert!(matches!(
            cache.set("", json!("Blank"), None),
            Err(CacheError::InvalidKeyType(_))
        ));
    }

    // == Failing Filesystem ==
    struct FailingFs;

    fn denied() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "denied")
    }

    impl Filesystem for FailingFs {
        fn exists(&self, _path: &Path) -> bool {
            true
        }

        fn make_directory(&self, _path: &Path) -> io::Result<()> {
            Err(denied())
        }

        fn read(&self, _path: &Path) -> io::Result<Option<Vec<u8>>> {
            Err(denied())
        }

        fn write(&self, _path: &Path, _contents: &[u8]) -> io::Result<()> {
            Err(denied())
        }

        fn delete(&self, _path: &Path, _recursive: bool) -> io::Result<bool> {
            Err(denied())
        }
    }

    #[test]
    fn test_storage_failures_are_soft() {
        let cache = FileCache::with_filesystem(FailingFs, "/nowhere", DEFAULT_EXTENSION).unwrap();

        assert!(!cache.set("a", json!(1), None).unwrap());
        assert_eq!(cache.get("a", json!("default")).unwrap(), json!("default"));
        assert!(!cache.delete("a").unwrap());
        assert!(!cache.clear());
        assert!(!cache.set_multiple(json!({"a": 1, "b": 2}).as_object().unwrap(), None).unwrap());
    }
}
