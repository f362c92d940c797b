//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for paths, identifiers and
//! fingerprints used by the reconciliation engine. Each newtype ensures data
//! validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Path types
// ============================================================================

/// A validated absolute path on the local filesystem
///
/// SyncPath ensures the path is:
/// - Absolute (starts with /)
/// - Normalized (no . or .. components)
/// - Within the sync root when validated against one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct SyncPath(PathBuf);

impl SyncPath {
    /// Create a new SyncPath, validating it is absolute
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is not absolute
    pub fn new(path: PathBuf) -> Result<Self, DomainError> {
        if !path.is_absolute() {
            return Err(DomainError::InvalidPath(format!(
                "Path must be absolute: {}",
                path.display()
            )));
        }

        let normalized = Self::normalize_path(&path)?;
        Ok(Self(normalized))
    }

    /// Get the inner path reference
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Join a single path component to this SyncPath
    ///
    /// # Errors
    /// Returns error if the component is empty, `.`/`..` or contains a separator
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if !is_valid_component(component) {
            return Err(DomainError::InvalidPath(format!(
                "Invalid path component: {component}"
            )));
        }

        Self::new(self.0.join(component))
    }

    /// Resolve a [`RelativePath`] against this path (used as the sync root)
    #[must_use]
    pub fn join_relative(&self, relative: &RelativePath) -> Self {
        let mut path = self.0.clone();
        for component in relative.components() {
            path.push(component);
        }
        // components of a RelativePath are already validated
        Self(path)
    }

    /// Normalize a path by resolving . and .. components
    fn normalize_path(path: &Path) -> Result<PathBuf, DomainError> {
        use std::path::Component;

        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::Prefix(p) => normalized.push(p.as_os_str()),
                Component::RootDir => normalized.push("/"),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(DomainError::InvalidPath(
                            "Path escapes root via ..".to_string(),
                        ));
                    }
                }
                Component::Normal(c) => normalized.push(c),
            }
        }

        Ok(normalized)
    }
}

impl Display for SyncPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl TryFrom<PathBuf> for SyncPath {
    type Error = DomainError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<SyncPath> for PathBuf {
    fn from(sync_path: SyncPath) -> Self {
        sync_path.0
    }
}

impl AsRef<Path> for SyncPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// A path relative to the sync root, shared by both sides of a scan
///
/// Always starts with `/`, e.g. "/docs/a.txt". The root itself is "/".
/// Every entry of a diff report is keyed by one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    /// Create a new RelativePath
    ///
    /// # Errors
    /// Returns error if the path doesn't start with / or has invalid components
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRelativePath(format!(
                "Relative path must start with '/': {path}"
            )));
        }

        if path != "/" && !path[1..].split('/').all(is_valid_component) {
            return Err(DomainError::InvalidRelativePath(format!(
                "Relative path has an invalid component: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// The sync root, "/"
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Join a single name component
    ///
    /// # Errors
    /// Returns error if the component is empty, `.`/`..` or contains '/'
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if !is_valid_component(component) {
            return Err(DomainError::InvalidRelativePath(format!(
                "Invalid path component: {component}"
            )));
        }

        let joined = if self.is_root() {
            format!("/{component}")
        } else {
            format!("{}/{component}", self.0)
        };

        Ok(Self(joined))
    }

    /// Get the final name component
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }

        self.0.rsplit('/').next()
    }

    /// Iterate over the name components, root first
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|c| !c.is_empty())
    }
}

impl Display for RelativePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RelativePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RelativePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RelativePath> for String {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}

fn is_valid_component(component: &str) -> bool {
    !component.is_empty() && component != "." && component != ".." && !component.contains('/')
}

// ============================================================================
// Drive-specific types
// ============================================================================

/// Drive file or folder ID
///
/// Opaque identifier such as "1a2B3c_-XyZ". The alias "root" addresses the
/// top of the principal's drive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains characters Drive never issues
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidRemoteId(format!(
                "Remote ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// The "root" alias
    #[must_use]
    pub fn root() -> Self {
        Self("root".to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

/// MD5 content fingerprint in lowercase hex
///
/// Matches the `md5Checksum` Drive reports for binary files.
/// Parsing accepts either case and normalizes to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Hex length of a 16-byte MD5 digest
    const HEX_LEN: usize = 32;

    /// Create a new ContentHash
    ///
    /// # Errors
    /// Returns error if the value is not 32 hex characters
    pub fn new(hash: String) -> Result<Self, DomainError> {
        if hash.len() != Self::HEX_LEN {
            return Err(DomainError::InvalidHash(format!(
                "Hash has wrong length: expected {} hex characters, got {}",
                Self::HEX_LEN,
                hash.len()
            )));
        }

        if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidHash(format!(
                "Hash is not hexadecimal: {hash}"
            )));
        }

        Ok(Self(hash.to_ascii_lowercase()))
    }

    /// Build a hash from a raw MD5 digest
    #[must_use]
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentHash {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ContentHash {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Drive listing page token (opaque string)
///
/// Valid only for the request sequence that produced it.
/// The token is opaque - we don't validate its contents, only that it's non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageToken(String);

impl PageToken {
    /// Create a new PageToken
    ///
    /// # Errors
    /// Returns error if the token is empty
    pub fn new(token: String) -> Result<Self, DomainError> {
        if token.is_empty() {
            return Err(DomainError::InvalidPageToken(
                "Page token cannot be empty".to_string(),
            ));
        }

        Ok(Self(token))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PageToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageToken {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for PageToken {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PageToken> for String {
    fn from(token: PageToken) -> Self {
        token.0
    }
}

// ============================================================================
// Tests
// ============================================================================
