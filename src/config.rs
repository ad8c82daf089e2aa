//! Manifest (`gopkg.toml`) and workspace configuration.
//!
//! ```toml
//! name = "hello"
//! authors = ["Your Name <email@example.com>"]
//!
//! [[packages]]
//! name = "yaml"
//! git = "https://github.com/go-yaml/yaml"
//! tag = "v2.4.0"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the canonical manifest at the top of a package.
pub const MANIFEST_FILE: &str = "gopkg.toml";
pub const LOCK_FILE: &str = "gopkg.lock";
pub const VENDOR_DIR: &str = "vendor";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub packages: Vec<Dependency>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub git: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
}

/// Workspace metadata handed back to the caller after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMeta {
    pub name: String,
    pub authors: Vec<String>,
}

/// The set of ref pins a declaration carries. Normally at most one is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RefSelector {
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub rev: Option<String>,
}

impl RefSelector {
    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.tag.is_none() && self.rev.is_none()
    }

    pub fn count(&self) -> usize {
        [&self.branch, &self.tag, &self.rev]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }
}

impl fmt::Display for RefSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Highest-precedence selector wins the label.
        if let Some(rev) = &self.rev {
            write!(f, "rev {}", rev)
        } else if let Some(tag) = &self.tag {
            write!(f, "tag {}", tag)
        } else if let Some(branch) = &self.branch {
            write!(f, "branch {}", branch)
        } else {
            write!(f, "default branch")
        }
    }
}

impl Dependency {
    pub fn selector(&self) -> RefSelector {
        RefSelector {
            branch: self.branch.clone(),
            tag: self.tag.clone(),
            rev: self.rev.clone(),
        }
    }
}

impl Manifest {
    /// Parses and validates a manifest document. `origin` is only used for
    /// error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(content).map_err(|e| Error::manifest(origin, e.to_string()))?;
        manifest.validate(origin)?;
        Ok(manifest)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::manifest(Path::new(MANIFEST_FILE), e.to_string()))
    }

    pub fn meta(&self) -> WorkspaceMeta {
        WorkspaceMeta {
            name: self.name.clone(),
            authors: self.authors.clone(),
        }
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        let mut seen = HashSet::new();
        for dep in &self.packages {
            validate_package_name(&dep.name).map_err(|reason| {
                Error::manifest(origin, format!("invalid package name '{}': {}", dep.name, reason))
            })?;
            if dep.git.trim().is_empty() {
                return Err(Error::manifest(
                    origin,
                    format!("package '{}' has an empty git URL", dep.name),
                ));
            }
            let values = [Some(&dep.git), dep.branch.as_ref(), dep.tag.as_ref(), dep.rev.as_ref()];
            if let Some(value) = values.into_iter().flatten().find(|v| v.starts_with('-')) {
                return Err(Error::manifest(
                    origin,
                    format!("package '{}': '{}' must not start with '-'", dep.name, value),
                ));
            }
            if !seen.insert(dep.name.as_str()) {
                return Err(Error::manifest(
                    origin,
                    format!("package '{}' is declared more than once", dep.name),
                ));
            }
            if dep.selector().count() > 1 {
                log::warn!(
                    "package '{}' in {} sets more than one of branch/tag/rev; {} takes precedence",
                    dep.name,
                    origin.display(),
                    dep.selector()
                );
            }
        }
        Ok(())
    }
}

/// Package names double as vendor directory names, so they must be a single
/// plain path segment.
pub fn validate_package_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name == "." || name == ".." {
        return Err("name must not be '.' or '..'");
    }
    if name.contains(['/', '\\']) {
        return Err("name must not contain path separators");
    }
    if name.contains('\0') {
        return Err("name must not contain NUL");
    }
    Ok(())
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| Error::manifest(path, e.to_string()))?;
    Manifest::from_toml_str(&content, path)
}

/// Paths that make up one workspace. Threaded explicitly into the resolver
/// and the toolchain instead of living in process environment.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub vendor_dir: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let vendor_dir = root.join(VENDOR_DIR);
        Self { root, vendor_dir }
    }

    /// Overrides the vendor directory. Relative paths are taken from the
    /// workspace root.
    pub fn with_vendor_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.vendor_dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        };
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Fail when an already-vendored package is requested again with a
    /// different URL or ref instead of silently keeping the first fetch.
    pub strict: bool,
}
