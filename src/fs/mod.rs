//! Filesystem abstraction
//!
//! The staging core never touches a disk directly; it talks to a
//! `FileSystem` client obtained from a `FileSystemProvider`:
//! - `LocalFileSystem`: local disk, either `file://` or a logical
//!   namespace (`hdfs://nn1`) rooted at a local directory
//! - `MountTable`: resolves a path to the client serving its namespace

mod cleanup;
mod local;
mod registry;

pub use cleanup::CleanupRegistry;
pub use local::LocalFileSystem;
pub use registry::MountTable;

use crate::error::StagingResult;
use crate::path::FsPath;
use std::io;
use std::sync::Arc;

/// Client for one filesystem namespace (`scheme://authority`)
pub trait FileSystem: Send + Sync {
    /// Scheme this client serves
    fn scheme(&self) -> &str;

    /// Authority this client serves (may be empty)
    fn authority(&self) -> &str;

    /// Filesystem identity: `scheme://authority`
    fn uri(&self) -> String {
        format!("{}://{}", self.scheme(), self.authority())
    }

    /// Qualify a path against this filesystem
    fn make_qualified(&self, path: &FsPath) -> FsPath {
        path.qualified_by(self.scheme(), self.authority())
    }

    /// Check whether a path exists
    fn exists(&self, path: &FsPath) -> io::Result<bool>;

    /// Create a directory and every missing parent
    ///
    /// `Ok(false)` means the filesystem refused the creation. With
    /// `inherit_perms`, new directories take the permissions of their
    /// nearest existing ancestor.
    fn mkdirs(&self, path: &FsPath, inherit_perms: bool) -> io::Result<bool>;

    /// Register a path for removal when this filesystem session ends
    ///
    /// Returns `false` if the path was already registered.
    fn delete_on_exit(&self, path: &FsPath) -> bool;

    /// Withdraw a `delete_on_exit` registration; `false` if none existed
    fn cancel_delete_on_exit(&self, _path: &FsPath) -> bool {
        false
    }

    /// End the session, running deferred cleanup; returns paths removed
    fn close(&self) -> usize {
        0
    }
}

/// Source of filesystem clients
pub trait FileSystemProvider: Send + Sync {
    /// Get the client serving `path`'s namespace
    fn get(&self, path: &FsPath) -> StagingResult<Arc<dyn FileSystem>>;
}
