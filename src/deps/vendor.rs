//! Workspace-level vendoring.
//!
//! Wraps the [`Resolver`] with the workspace's lockfile: existing lock
//! entries seed conflict detection, and every package fetched in the run is
//! recorded once the whole resolution succeeds.
//!
//! ```bash
//! gopkg get            # resolve gopkg.toml into ./vendor
//! gopkg get --strict   # fail on conflicting refs for the same package
//! ```

use super::resolve::{Resolution, Resolver};
use super::vcs::Vcs;
use crate::config::{ResolveOptions, Workspace};
use crate::error::{Error, Result};
use crate::lock::{LockFile, PackageLock};
use colored::*;
use std::fs;

pub fn vendor_dependencies<V: Vcs + ?Sized>(
    workspace: &Workspace,
    vcs: &V,
    options: ResolveOptions,
) -> Result<Resolution> {
    let lock_path = workspace.lock_path();
    let mut lock = LockFile::load(&lock_path)?;

    let resolution = Resolver::new(vcs, &workspace.vendor_dir)
        .with_options(options)
        .with_lock(lock.clone())
        .resolve(&workspace.manifest_path())?;

    if !resolution.vendored.is_empty() {
        for pkg in &resolution.vendored {
            lock.insert(
                pkg.name.clone(),
                PackageLock::new(&pkg.git, &pkg.selector, pkg.commit.clone()),
            );
        }
        lock.save(&lock_path)?;
    }

    if resolution.vendored.is_empty() {
        println!(
            "{} All {} dependencies already vendored.",
            "✓".green(),
            resolution.skipped.len()
        );
    } else {
        println!(
            "{} Vendored {} new, {} already present.",
            "✓".green(),
            resolution.vendored.len(),
            resolution.skipped.len()
        );
    }
    Ok(resolution)
}

/// Names of the packages currently in the vendor tree, sorted.
pub fn vendored_names(workspace: &Workspace) -> Result<Vec<String>> {
    let dir = &workspace.vendor_dir;
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::layout(dir, e))? {
        let entry = entry.map_err(|e| Error::layout(dir, e))?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Removes the vendor tree and the lockfile.
pub fn clean_vendor(workspace: &Workspace) -> Result<()> {
    let dir = &workspace.vendor_dir;
    if dir.exists() {
        println!("{} Removing {}", "🧹".yellow(), dir.display());
        fs::remove_dir_all(dir).map_err(|e| Error::layout(dir, e))?;
    }
    let lock = workspace.lock_path();
    if lock.exists() {
        fs::remove_file(&lock).map_err(|e| Error::layout(&lock, e))?;
    }
    println!("{} Vendor tree clean.", "✓".green());
    Ok(())
}
