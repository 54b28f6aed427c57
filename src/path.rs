//! Fully qualified filesystem paths
//!
//! `FsPath` is the `scheme://authority/path` triple every staging
//! operation works on. Parsing goes through `url`; once parsed, the path
//! part is kept as normalized `/`-separated segments so parent/join never
//! have to reason about trailing slashes.

use crate::error::{StagingError, StagingResult};
use percent_encoding::percent_decode_str;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A path qualified with the scheme and authority of its filesystem
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsPath {
    scheme: String,
    authority: String,
    path: String,
}

impl FsPath {
    /// Build a path from its parts; `path` is normalized to absolute form
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>, path: &str) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            authority: authority.into(),
            path: normalize(path),
        }
    }

    /// Parse a fully qualified path such as `hdfs://nn1/warehouse/db/tbl`
    ///
    /// Scheme-less input is a caller error. Percent-escapes in the path
    /// are decoded, so the stored path names the real directory.
    pub fn parse(input: &str) -> StagingResult<Self> {
        let url = Url::parse(input).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => {
                StagingError::malformed(input, "missing filesystem scheme")
            }
            other => StagingError::malformed(input, other.to_string()),
        })?;

        if url.cannot_be_a_base() {
            return Err(StagingError::malformed(input, "path is not hierarchical"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(StagingError::malformed(
                input,
                "query and fragment are not allowed",
            ));
        }

        let mut authority = String::new();
        if !url.username().is_empty() {
            authority.push_str(url.username());
            authority.push('@');
        }
        authority.push_str(url.host_str().unwrap_or(""));
        if let Some(port) = url.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
            path: decode_path(input, url.path())?,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// The absolute path part, always starting with `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Filesystem identity: `scheme://authority`
    pub fn fs_uri(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }

    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// Path segments, root first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, `None` for the root
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Parent directory, `None` for the root
    pub fn parent(&self) -> Option<FsPath> {
        if self.is_root() {
            return None;
        }
        let cut = self.path.rfind('/').unwrap_or(0);
        Some(self.with_path(&self.path[..cut]))
    }

    /// Append one or more `/`-separated segments
    pub fn join(&self, child: &str) -> FsPath {
        self.with_path(&format!("{}/{}", self.path, child))
    }

    /// Same filesystem, different path
    pub fn with_path(&self, path: &str) -> FsPath {
        Self {
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            path: normalize(path),
        }
    }

    /// Same path, qualified against another filesystem
    pub fn qualified_by(&self, scheme: &str, authority: &str) -> FsPath {
        Self::new(scheme, authority, &self.path)
    }

    /// Whether `self` lives at or below `other` on the same filesystem
    pub fn starts_with(&self, other: &FsPath) -> bool {
        if self.scheme != other.scheme || self.authority != other.authority {
            return false;
        }
        let mut mine = self.segments();
        other.segments().all(|seg| mine.next() == Some(seg))
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)
    }
}

impl FromStr for FsPath {
    type Err = StagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Decode each `/`-separated segment of a percent-encoded URL path
fn decode_path(input: &str, encoded: &str) -> StagingResult<String> {
    let mut segments = Vec::new();
    for raw in encoded.split('/').filter(|s| !s.is_empty()) {
        let segment = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| StagingError::malformed(input, "path is not valid UTF-8"))?;
        if segment.contains('/') {
            return Err(StagingError::malformed(input, "encoded '/' inside a path segment"));
        }
        segments.push(segment.into_owned());
    }
    Ok(format!("/{}", segments.join("/")))
}

fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}
