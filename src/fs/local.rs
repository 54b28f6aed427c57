//! Local-disk filesystem client

use crate::fs::{CleanupRegistry, FileSystem};
use crate::path::FsPath;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem client backed by the local disk
///
/// Serves either `file://` rooted at `/`, or a logical namespace such as
/// `hdfs://nn1` mapped onto a local directory. Paths registered with
/// `delete_on_exit` are removed on `close()` or when the client drops.
#[derive(Debug)]
pub struct LocalFileSystem {
    scheme: String,
    authority: String,
    root: PathBuf,
    cleanup: CleanupRegistry,
}

impl LocalFileSystem {
    /// Client for `file://` paths
    pub fn new() -> Self {
        Self::rooted("file", "", PathBuf::from("/"))
    }

    /// Client serving `scheme://authority` out of `root`
    pub fn rooted(
        scheme: impl Into<String>,
        authority: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            authority: authority.into(),
            root: root.into(),
            cleanup: CleanupRegistry::new(),
        }
    }

    /// Local directory backing this namespace
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deferred-deletion registry for this session
    pub fn cleanup(&self) -> &CleanupRegistry {
        &self.cleanup
    }

    /// Map a qualified path onto the local disk
    pub fn local_path(&self, path: &FsPath) -> io::Result<PathBuf> {
        if path.scheme() != self.scheme || path.authority() != self.authority {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not served by {}", path, self.uri()),
            ));
        }

        let mut local = self.root.clone();
        for segment in path.segments() {
            if segment == ".." || segment == "." {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("relative segment in {}", path),
                ));
            }
            local.push(segment);
        }
        Ok(local)
    }
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for LocalFileSystem {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn authority(&self) -> &str {
        &self.authority
    }

    fn exists(&self, path: &FsPath) -> io::Result<bool> {
        self.local_path(path)?.try_exists()
    }

    fn mkdirs(&self, path: &FsPath, inherit_perms: bool) -> io::Result<bool> {
        let local = self.local_path(path)?;

        if local.is_dir() {
            return Ok(true);
        }
        if local.exists() {
            debug!("{} exists and is not a directory", local.display());
            return Ok(false);
        }

        // Nearest ancestor that already exists; everything below it is new
        let Some(existing) = local.ancestors().skip(1).find(|p| p.exists()) else {
            return Ok(false);
        };
        if !existing.is_dir() {
            debug!("{} is not a directory", existing.display());
            return Ok(false);
        }
        let existing = existing.to_path_buf();

        std::fs::create_dir_all(&local)?;

        if inherit_perms {
            inherit_permissions(&existing, &local)?;
        }

        Ok(true)
    }

    fn delete_on_exit(&self, path: &FsPath) -> bool {
        self.cleanup.register(path)
    }

    fn cancel_delete_on_exit(&self, path: &FsPath) -> bool {
        self.cleanup.cancel(path)
    }

    fn close(&self) -> usize {
        self.cleanup.run(|path| {
            let local = self.local_path(path)?;
            match std::fs::remove_dir_all(&local) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e),
            }
        })
    }
}

impl Drop for LocalFileSystem {
    fn drop(&mut self) {
        self.close();
    }
}

/// Copy `ancestor`'s permission bits onto every directory from `leaf` up
/// to, but not including, `ancestor`
fn inherit_permissions(ancestor: &Path, leaf: &Path) -> io::Result<()> {
    let perms = std::fs::metadata(ancestor)?.permissions();

    for dir in leaf.ancestors().take_while(|p| *p != ancestor) {
        std::fs::set_permissions(dir, perms.clone())?;
    }
    Ok(())
}
