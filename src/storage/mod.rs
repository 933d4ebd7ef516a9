//! Storage Module
//!
//! Storage collaborators the cache backends are built on.

pub mod fs;
pub mod memory;

pub use fs::{Filesystem, LocalFilesystem};
pub use memory::{EphemeralStore, MemoryStore};
