// CLASSIFICATION: COMMUNITY
// Filename: path.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-06-21

//! Hierarchical path values used by every CombFS interface.
//!
//! A path is an ordered sequence of non-empty components. The text form is
//! forward-slash delimited and always begins with a slash; the root is the
//! single character `/`. The colon is reserved for application use and the
//! slash is the delimiter, so neither may appear inside a component.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use log::warn;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors produced when constructing a [`Path`] from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path string was empty.
    #[error("path is empty")]
    Empty,
    /// The path string did not begin with a forward slash.
    #[error("path does not begin with a forward slash")]
    NotAbsolute,
    /// The path or component contained a reserved colon.
    #[error("colon is reserved and may not appear in a path")]
    ReservedColon,
    /// A component was empty.
    #[error("component is empty")]
    EmptyComponent,
    /// A component contained the separator.
    #[error("component contains the separator")]
    SeparatorInComponent,
}

/// An immutable filesystem path.
///
/// Paths are values: cheap to clone, comparable, hashable, and serialized on
/// the wire as their canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    components: Vec<String>,
}

impl Path {
    /// The path of the root directory.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Parse a path from its string form.
    ///
    /// The string must begin with a forward slash and must not contain a
    /// colon. Empty components between consecutive slashes are dropped, so
    /// `"/a//b/"` parses to `/a/b`.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Err(PathError::Empty);
        }
        if !text.starts_with('/') {
            return Err(PathError::NotAbsolute);
        }
        if text.contains(':') {
            return Err(PathError::ReservedColon);
        }
        let components = text
            .split('/')
            .filter(|component| !component.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(Self { components })
    }

    /// Extend this path by one component.
    pub fn child(&self, component: &str) -> Result<Self, PathError> {
        if component.is_empty() {
            return Err(PathError::EmptyComponent);
        }
        if component.contains(':') {
            return Err(PathError::ReservedColon);
        }
        if component.contains('/') {
            return Err(PathError::SeparatorInComponent);
        }
        let mut components = self.components.clone();
        components.push(component.to_owned());
        Ok(Self { components })
    }

    /// Whether this path is the root directory.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// The parent of this path. The root has no parent.
    pub fn parent(&self) -> Result<Self, PathError> {
        match self.components.split_last() {
            None => Err(PathError::Empty),
            Some((_, rest)) => Ok(Self {
                components: rest.to_vec(),
            }),
        }
    }

    /// The final component of this path. The root has no last component.
    pub fn last(&self) -> Result<&str, PathError> {
        self.components
            .last()
            .map(String::as_str)
            .ok_or(PathError::Empty)
    }

    /// Whether `other` is a prefix of this path.
    ///
    /// Every path is a subpath of itself, and every path is a subpath of the
    /// root.
    pub fn is_subpath(&self, other: &Path) -> bool {
        other.components.len() <= self.components.len()
            && self.components[..other.components.len()] == other.components[..]
    }

    /// Iterate over the components of this path, in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }

    /// Number of components in this path. The root has zero.
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// Map this path onto a local directory root.
    ///
    /// The namespace path `/a/b/c` resolves to `<root>/a/b/c`; the root path
    /// resolves to `root` itself.
    pub fn resolve(&self, root: &std::path::Path) -> PathBuf {
        let mut resolved = root.to_path_buf();
        for component in &self.components {
            resolved.push(component);
        }
        resolved
    }

    /// List the namespace-relative paths of all regular files under a local
    /// directory tree.
    ///
    /// Fails if `root` does not exist or is not a directory. Local file names
    /// that cannot form a legal path component (reserved characters,
    /// non-UTF-8) are skipped with a warning rather than aborting the scan.
    pub fn scan(root: &std::path::Path) -> io::Result<Vec<Path>> {
        let meta = fs::metadata(root).map_err(|_| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", root.display()),
            )
        })?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        let mut found = Vec::new();
        scan_into(root, &Path::root(), &mut found)?;
        found.sort();
        Ok(found)
    }
}

fn scan_into(dir: &std::path::Path, prefix: &Path, found: &mut Vec<Path>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!("skipping non-UTF-8 entry {:?} under {}", raw, dir.display());
                continue;
            }
        };
        let child = match prefix.child(&name) {
            Ok(child) => child,
            Err(err) => {
                warn!("skipping {:?} under {}: {}", name, dir.display(), err);
                continue;
            }
        };
        let kind = entry.file_type()?;
        if kind.is_dir() {
            scan_into(&entry.path(), &child, found)?;
        } else if kind.is_file() {
            found.push(child);
        }
    }
    Ok(())
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Path::parse(text)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Path::parse(&text).map_err(D::Error::custom)
    }
}
