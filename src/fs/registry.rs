//! Mount table: resolves a path to the client serving its namespace

use crate::config::schema::MountConfig;
use crate::error::{StagingError, StagingResult};
use crate::fs::{FileSystem, FileSystemProvider, LocalFileSystem};
use crate::path::FsPath;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Filesystem clients keyed by `scheme://authority`
#[derive(Default)]
pub struct MountTable {
    clients: HashMap<String, Arc<dyn FileSystem>>,
}

impl MountTable {
    /// Empty table; every lookup fails until something is mounted
    pub fn new() -> Self {
        Self::default()
    }

    /// Build local clients for `file://` plus every configured mount
    pub fn from_config(mounts: &[MountConfig]) -> StagingResult<Self> {
        let mut table = Self::new();
        table.mount(Arc::new(LocalFileSystem::new()));

        for mount in mounts {
            let uri = FsPath::parse(&mount.uri)?;
            if !uri.is_root() {
                return Err(StagingError::SettingsInvalid(format!(
                    "mount uri {} must not carry a path",
                    mount.uri
                )));
            }
            debug!("Mounting {} at {}", uri.fs_uri(), mount.root.display());
            table.mount(Arc::new(LocalFileSystem::rooted(
                uri.scheme(),
                uri.authority(),
                &mount.root,
            )));
        }

        Ok(table)
    }

    /// Mount a client, replacing any previous client for its namespace
    pub fn mount(&mut self, fs: Arc<dyn FileSystem>) -> Option<Arc<dyn FileSystem>> {
        self.clients.insert(fs.uri(), fs)
    }

    /// Namespaces currently mounted, sorted
    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.clients.keys().cloned().collect();
        uris.sort();
        uris
    }

    /// End every filesystem session; returns total paths cleaned up
    pub fn close_all(&self) -> usize {
        self.clients.values().map(|fs| fs.close()).sum()
    }
}

impl FileSystemProvider for MountTable {
    fn get(&self, path: &FsPath) -> StagingResult<Arc<dyn FileSystem>> {
        let uri = path.fs_uri();
        self.clients
            .get(&uri)
            .cloned()
            .ok_or_else(|| StagingError::unavailable(path.to_string(), format!("{} is not mounted", uri)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn resolves_mounted_namespace() {
        let table = MountTable::from_config(&[MountConfig {
            uri: "hdfs://nn1".to_string(),
            root: PathBuf::from("/data/nn1"),
        }])
        .unwrap();

        let path = FsPath::parse("hdfs://nn1/warehouse").unwrap();
        assert_eq!(table.get(&path).unwrap().uri(), "hdfs://nn1");

        let local = FsPath::parse("file:///tmp").unwrap();
        assert_eq!(table.get(&local).unwrap().uri(), "file://");
        assert_eq!(table.uris(), vec!["file://", "hdfs://nn1"]);
    }

    #[test]
    fn unknown_namespace_is_unavailable() {
        let table = MountTable::new();
        let path = FsPath::parse("s3://bucket/key").unwrap();

        let err = table.get(&path).err().unwrap();
        assert!(matches!(err, StagingError::FileSystemUnavailable { .. }));
        assert!(err.to_string().contains("s3://bucket/key"));
    }

    #[test]
    fn mount_uri_with_path_is_rejected() {
        let result = MountTable::from_config(&[MountConfig {
            uri: "hdfs://nn1/warehouse".to_string(),
            root: PathBuf::from("/data"),
        }]);
        assert!(matches!(result, Err(StagingError::SettingsInvalid(_))));
    }
}
