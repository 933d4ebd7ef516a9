//! Filesystem Provider
//!
//! The narrow filesystem interface the file backend writes through, plus the
//! `std::fs` implementation used outside of tests.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

// == Filesystem Trait ==
/// Filesystem operations needed by [`crate::cache::FileCache`].
pub trait Filesystem: Send + Sync {
    /// Returns true if anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Creates `path` and any missing parents.
    fn make_directory(&self, path: &Path) -> io::Result<()>;

    /// Reads a whole file, returning `None` if it does not exist.
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Writes a whole file, replacing any previous contents.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Removes a file, or a directory tree when `recursive` is set.
    ///
    /// Returns `Ok(false)` if there was nothing to remove.
    fn delete(&self, path: &Path, recursive: bool) -> io::Result<bool>;
}

// == Local Filesystem ==
/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn make_directory(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn delete(&self, path: &Path, recursive: bool) -> io::Result<bool> {
        let result = if recursive && path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match result {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
