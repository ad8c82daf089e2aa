//! Shared fixtures for the resolver integration tests.
//!
//! [`ScriptedVcs`] serves "repositories" from plain directories: a clone
//! copies the remote's default tree, and a checkout swaps the working copy
//! for the tree registered under that ref.

#![allow(dead_code)]

use gopkg::deps::mirror::mirror;
use gopkg::deps::{RefTarget, Vcs};
use gopkg::error::{Error, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Default)]
struct Remote {
    default: PathBuf,
    refs: HashMap<RefTarget, PathBuf>,
}

#[derive(Default)]
pub struct ScriptedVcs {
    remotes: HashMap<String, Remote>,
    failing: HashSet<String>,
    origins: RefCell<HashMap<PathBuf, String>>,
    heads: RefCell<HashMap<PathBuf, String>>,
    /// Names passed to `clone_repo`, in order.
    pub clones: RefCell<Vec<String>>,
    pub checkouts: RefCell<Vec<(String, RefTarget)>>,
}

impl ScriptedVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remote(mut self, url: &str, tree: impl Into<PathBuf>) -> Self {
        self.remotes.entry(url.to_string()).or_default().default = tree.into();
        self
    }

    pub fn with_ref(mut self, url: &str, target: RefTarget, tree: impl Into<PathBuf>) -> Self {
        self.remotes
            .entry(url.to_string())
            .or_default()
            .refs
            .insert(target, tree.into());
        self
    }

    /// Every clone of `url` fails.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn clone_count(&self, name: &str) -> usize {
        self.clones.borrow().iter().filter(|n| *n == name).count()
    }
}

impl Vcs for ScriptedVcs {
    fn clone_repo(&self, name: &str, url: &str, dest: &Path) -> Result<()> {
        self.clones.borrow_mut().push(name.to_string());
        let fetch_err = |message: &str| Error::Fetch {
            name: name.to_string(),
            url: url.to_string(),
            message: message.to_string(),
        };
        if self.failing.contains(url) {
            return Err(fetch_err("remote hung up unexpectedly"));
        }
        let remote = self
            .remotes
            .get(url)
            .ok_or_else(|| fetch_err("repository not found"))?;

        mirror(&remote.default, dest)?;
        fs::create_dir_all(dest.join(".git"))?;
        fs::write(dest.join(".git/HEAD"), "ref: refs/heads/main\n")?;
        self.origins
            .borrow_mut()
            .insert(dest.to_path_buf(), url.to_string());
        self.heads
            .borrow_mut()
            .insert(dest.to_path_buf(), format!("{}@HEAD", url));
        Ok(())
    }

    fn checkout(&self, name: &str, dest: &Path, target: &RefTarget) -> Result<()> {
        self.checkouts
            .borrow_mut()
            .push((name.to_string(), target.clone()));
        let ref_err = || Error::Ref {
            name: name.to_string(),
            target: target.to_string(),
            message: "reference not found".to_string(),
        };

        let origins = self.origins.borrow();
        let url = origins.get(dest).ok_or_else(ref_err)?;
        let tree = self
            .remotes
            .get(url)
            .and_then(|r| r.refs.get(target))
            .ok_or_else(ref_err)?;

        for entry in fs::read_dir(dest)? {
            let path = entry?.path();
            if path.file_name().is_some_and(|n| n == ".git") {
                continue;
            }
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        mirror(tree, dest)?;
        self.heads
            .borrow_mut()
            .insert(dest.to_path_buf(), format!("{}@{}", url, target));
        Ok(())
    }

    fn head_commit(&self, dest: &Path) -> Option<String> {
        self.heads.borrow().get(dest).cloned()
    }
}

/// Writes `files` (relative path, contents) under `root`.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) -> PathBuf {
    for (rel, body) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
    root.to_path_buf()
}

/// A `gopkg.toml` body declaring `deps` as (name, url, extra selector lines).
pub fn manifest(name: &str, deps: &[(&str, &str, &str)]) -> String {
    let mut out = format!("name = \"{}\"\nauthors = [\"tester\"]\n", name);
    for (dep, url, extra) in deps {
        out.push_str(&format!(
            "\n[[packages]]\nname = \"{}\"\ngit = \"{}\"\n{}\n",
            dep, url, extra
        ));
    }
    out
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e))
}
