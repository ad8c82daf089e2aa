//! Package layout detection and normalization.
//!
//! A package is *canonical* when it carries a `gopkg.toml` at its top level
//! and keeps its sources under `src/`. Anything else is *raw*: it gets its
//! source files moved under `src/` so every vendored package looks the same.

use crate::config::MANIFEST_FILE;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the Go toolchain compiles or assembles.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "go", "c", "h", "s", "S", "cc", "cpp", "cxx", "hh", "hpp", "hxx", "m", "f", "F", "for", "f90",
    "swig", "swigcxx", "syso",
];

pub const SOURCE_DIR: &str = "src";
const VCS_DIR: &str = ".git";

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

pub fn has_canonical_manifest(path: &Path) -> bool {
    path.join(MANIFEST_FILE).is_file()
}

/// Collects every non-directory entry under `root`, never descending into a
/// directory for which `skip_dir` returns true. The predicate sees each
/// directory's path relative to `root` and is evaluated before descending.
pub fn walk_files<F>(root: &Path, mut skip_dir: F) -> Result<Vec<PathBuf>>
where
    F: FnMut(&Path) -> bool,
{
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            !skip_dir(rel)
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::walk(root, e))?;
        if !entry.file_type().is_dir() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Moves every recognised source file under `path` into `path/src`,
/// keeping its path relative to `path`. Everything else stays where it is.
///
/// Sources are collected in a staging directory first and swapped in as
/// `src/` at the end, so a raw tree that already has its own `src/` keeps
/// it intact as `src/src/`. Non-source files left in the old `src/` are
/// dropped. A tree whose sources all live under `src/` (and whose `src/`
/// holds nothing else) is already normalized and is left unchanged.
pub fn normalize(path: &Path) -> Result<()> {
    let src_dir = path.join(SOURCE_DIR);
    let files = walk_files(path, |rel| rel == Path::new(VCS_DIR))?;

    if is_normalized(path, &files) {
        fs::create_dir_all(&src_dir).map_err(|e| Error::layout(&src_dir, e))?;
        log::debug!("{} is already normalized", path.display());
        return Ok(());
    }

    let staging = tempfile::Builder::new()
        .prefix(".gopkg-src-")
        .tempdir_in(path)
        .map_err(|e| Error::layout(path, e))?
        .keep();

    let mut moved = 0usize;
    for file in files.iter().filter(|f| is_source_file(f)) {
        let Ok(rel) = file.strip_prefix(path) else {
            continue;
        };
        let target = staging.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::layout(parent, e))?;
        }
        fs::rename(file, &target).map_err(|e| Error::layout(file, e))?;
        log::debug!("moved {} -> {}/{}", file.display(), SOURCE_DIR, rel.display());
        moved += 1;
    }

    if src_dir.is_dir() {
        fs::remove_dir_all(&src_dir).map_err(|e| Error::layout(&src_dir, e))?;
    }
    fs::rename(&staging, &src_dir).map_err(|e| Error::layout(&src_dir, e))?;

    log::debug!("normalized {}: {} source files relocated", path.display(), moved);
    Ok(())
}

/// True when every source file sits under `src/` and `src/` holds only
/// source files.
fn is_normalized(path: &Path, files: &[PathBuf]) -> bool {
    files.iter().all(|file| {
        let under_src = file
            .strip_prefix(path)
            .is_ok_and(|rel| rel.starts_with(SOURCE_DIR));
        under_src == is_source_file(file)
    })
}
