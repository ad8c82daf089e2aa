use crate::config::{Dependency, RefSelector};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LockFile {
    #[serde(rename = "package", default)]
    pub packages: BTreeMap<String, PackageLock>,
}

/// What was requested for a vendored package and the commit it resolved to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PackageLock {
    pub git: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
}

impl PackageLock {
    pub fn new(git: impl Into<String>, selector: &RefSelector, commit: Option<String>) -> Self {
        Self {
            git: git.into(),
            commit,
            branch: selector.branch.clone(),
            tag: selector.tag.clone(),
            rev: selector.rev.clone(),
        }
    }

    pub fn selector(&self) -> RefSelector {
        RefSelector {
            branch: self.branch.clone(),
            tag: self.tag.clone(),
            rev: self.rev.clone(),
        }
    }

    /// Whether `dep` asks for the same source this entry was vendored from.
    pub fn matches(&self, dep: &Dependency) -> bool {
        self.git == dep.git && self.selector() == dep.selector()
    }
}

impl LockFile {
    /// Reads the lockfile at `path`; a missing file is an empty lock.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| Error::Lock {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::Lock {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Lock {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).map_err(|e| Error::Lock {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&PackageLock> {
        self.packages.get(name)
    }

    pub fn insert(&mut self, name: String, entry: PackageLock) {
        self.packages.insert(name, entry);
    }
}
