//! Staging cache keys and staging-root derivation

use std::fmt;

/// Identity of one staging directory
///
/// Two requests with the same filesystem, staging root and execution
/// unit share a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StagingKey {
    fs_uri: String,
    root: String,
    unit: String,
}

impl StagingKey {
    pub fn new(fs_uri: impl Into<String>, root: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            fs_uri: fs_uri.into(),
            root: root.into(),
            unit: unit.into(),
        }
    }

    /// `scheme://authority` of the filesystem
    pub fn fs_uri(&self) -> &str {
        &self.fs_uri
    }

    /// Absolute path of the staging root
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Execution unit the directory belongs to
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl fmt::Display for StagingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.fs_uri, self.root, self.unit)
    }
}

/// Compute the staging root for an absolute `path`
///
/// If `path` already runs through the staging directory (either the bare
/// name or a materialized `<name>_...` directory), the root is cut right
/// after the name so repeated calls converge on one root. Otherwise the
/// name is appended to `path`.
pub fn derive_staging_root(path: &str, staging_dir: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let name: Vec<&str> = staging_dir.split('/').filter(|s| !s.is_empty()).collect();

    let Some((last, leading)) = name.split_last() else {
        return format!("/{}", segments.join("/"));
    };
    let materialized = format!("{}_", last);

    let hit = (0..segments.len()).find(|&i| {
        let end = i + leading.len();
        end < segments.len()
            && segments[i..end] == *leading
            && (segments[end] == *last || segments[end].starts_with(&materialized))
    });

    let kept: Vec<&str> = match hit {
        Some(i) => segments[..i + leading.len()]
            .iter()
            .copied()
            .chain(std::iter::once(*last))
            .collect(),
        None => segments.into_iter().chain(name.iter().copied()).collect(),
    };

    format!("/{}", kept.join("/"))
}
