//! External temp path allocation
//!
//! Turns a destination path into a unique temp path inside a staging
//! directory that lives in the destination's own namespace, so promoting
//! the result is a same-filesystem rename.

use crate::config::StagingConfig;
use crate::context::ExecutionContext;
use crate::error::{StagingError, StagingResult};
use crate::fs::FileSystemProvider;
use crate::path::FsPath;
use crate::staging::{derive_staging_root, PathIdCounter, StagingCache, StagingKey};
use std::sync::Arc;
use tracing::debug;

/// Staging-path allocator
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct StagingAllocator {
    settings: StagingConfig,
    filesystems: Arc<dyn FileSystemProvider>,
    context: Arc<dyn ExecutionContext>,
    cache: Arc<StagingCache>,
    ids: PathIdCounter,
}

impl StagingAllocator {
    /// Create an allocator with its own cache
    pub fn new(
        settings: StagingConfig,
        filesystems: Arc<dyn FileSystemProvider>,
        context: Arc<dyn ExecutionContext>,
    ) -> StagingResult<Self> {
        Self::with_cache(settings, filesystems, context, Arc::new(StagingCache::new()))
    }

    /// Create an allocator backed by a shared cache
    pub fn with_cache(
        settings: StagingConfig,
        filesystems: Arc<dyn FileSystemProvider>,
        context: Arc<dyn ExecutionContext>,
        cache: Arc<StagingCache>,
    ) -> StagingResult<Self> {
        settings.validate()?;
        let ids = PathIdCounter::new(settings.id_seed);
        Ok(Self {
            settings,
            filesystems,
            context,
            cache,
            ids,
        })
    }

    pub fn settings(&self) -> &StagingConfig {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<StagingCache> {
        &self.cache
    }

    /// Most recently issued path id
    pub fn last_id(&self) -> u64 {
        self.ids.last_id()
    }

    /// Allocate an external temp path for `destination`
    ///
    /// The returned path's parent (the staging directory) exists when this
    /// returns; the leaf itself is left for the caller to create.
    pub fn external_tmp_path(&self, destination: &str) -> StagingResult<FsPath> {
        let destination = FsPath::parse(destination)?;
        self.external_tmp_path_for(&destination)
    }

    /// Allocate an external temp path for an already parsed destination
    pub fn external_tmp_path_for(&self, destination: &FsPath) -> StagingResult<FsPath> {
        let basis = self.basis_for(destination);
        let dir = self.staging_dir(&basis)?;
        let id = self.ids.next_id();
        Ok(dir.join(&format!("{}{}", self.settings.tmp_prefix, id)))
    }

    /// Path the staging root is derived from
    ///
    /// Destinations on a view mount stage next to their parent so the
    /// final rename never crosses an underlying filesystem. A root
    /// destination has no parent and is used as is.
    pub fn basis_for(&self, destination: &FsPath) -> FsPath {
        if self.settings.is_view_scheme(destination.scheme()) {
            destination.parent().unwrap_or_else(|| destination.clone())
        } else {
            destination.clone()
        }
    }

    /// Staging root for `basis`, before any execution suffix
    pub fn staging_root(&self, basis: &FsPath) -> FsPath {
        basis.with_path(&derive_staging_root(basis.path(), &self.settings.dir))
    }

    /// Cache key `basis` maps to for the current execution unit
    pub fn staging_key(&self, basis: &FsPath) -> StagingKey {
        let root = self.staging_root(basis);
        StagingKey::new(basis.fs_uri(), root.path(), self.context.unit_id())
    }

    /// Staging directory for `basis`, created on first use
    pub fn staging_dir(&self, basis: &FsPath) -> StagingResult<FsPath> {
        let root = self.staging_root(basis);
        let unit = self.context.unit_id();
        let key = StagingKey::new(basis.fs_uri(), root.path(), unit.as_str());

        self.cache
            .get_or_create(&key, || self.materialize(basis, &root, &unit))
    }

    fn materialize(&self, basis: &FsPath, root: &FsPath, unit: &str) -> StagingResult<FsPath> {
        let fs = self.filesystems.get(basis)?;

        // Sibling of the root, never nested under it
        let name = format!("{}_{}-{}", root.path(), self.context.execution_id(), unit);
        let dir = fs.make_qualified(&root.with_path(&name));

        match fs.mkdirs(&dir, self.settings.inherit_perms) {
            Ok(true) => {}
            Ok(false) => {
                return Err(StagingError::StagingDirDenied {
                    path: dir.to_string(),
                })
            }
            Err(source) => {
                return Err(StagingError::StagingDirIo {
                    path: dir.to_string(),
                    source,
                })
            }
        }

        fs.delete_on_exit(&dir);
        debug!("Created staging dir = {} for path = {}", dir, basis);
        Ok(dir)
    }
}
