//! Recursive dependency resolution into a flat vendor tree.
//!
//! Each declaration in a manifest is handled in order:
//!
//! 1. `vendor/<name>` already exists: the package counts as satisfied and
//!    nothing is fetched. This is the only deduplication signal, and it is
//!    what stops cycles.
//! 2. Otherwise the repository is cloned into a per-run scratch directory,
//!    pinned to its branch/tag/rev and normalized if it is raw.
//! 3. Its `src/` tree and loose top-level files are mirrored into
//!    `vendor/<name>`.
//! 4. If the package has its own `gopkg.toml`, that manifest is resolved
//!    against the same vendor tree, depth first.
//!
//! Any failure aborts the whole resolution.

use super::checkout;
use super::layout::{self, SOURCE_DIR};
use super::mirror::mirror;
use super::vcs::Vcs;
use crate::config::{
    Dependency, MANIFEST_FILE, Manifest, RefSelector, ResolveOptions, WorkspaceMeta, load_manifest,
};
use crate::error::{Error, Result};
use crate::lock::LockFile;
use colored::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A package fetched during one resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendoredPackage {
    pub name: String,
    pub git: String,
    pub selector: RefSelector,
    /// Commit the working copy was on when it was vendored.
    pub commit: Option<String>,
    /// Whether the package shipped its own manifest (and was recursed into).
    pub canonical: bool,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub workspace: WorkspaceMeta,
    /// Fetched packages, in fetch order.
    pub vendored: Vec<VendoredPackage>,
    /// Declarations satisfied by an existing vendor entry, in encounter order.
    pub skipped: Vec<String>,
}

pub struct Resolver<'a, V: Vcs + ?Sized> {
    vcs: &'a V,
    vendor_root: PathBuf,
    options: ResolveOptions,
    baseline: LockFile,
    requested: HashMap<String, Dependency>,
    scratch: Option<TempDir>,
}

impl<'a, V: Vcs + ?Sized> Resolver<'a, V> {
    pub fn new(vcs: &'a V, vendor_root: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            vendor_root: vendor_root.into(),
            options: ResolveOptions::default(),
            baseline: LockFile::default(),
            requested: HashMap::new(),
            scratch: None,
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Lock entries describing packages vendored by earlier runs. Used to
    /// detect conflicting requests for them.
    pub fn with_lock(mut self, lock: LockFile) -> Self {
        self.baseline = lock;
        self
    }

    pub fn resolve(&mut self, manifest_path: &Path) -> Result<Resolution> {
        let manifest = load_manifest(manifest_path)?;
        fs::create_dir_all(&self.vendor_root).map_err(|e| Error::layout(&self.vendor_root, e))?;

        let mut resolution = Resolution {
            workspace: manifest.meta(),
            vendored: Vec::new(),
            skipped: Vec::new(),
        };
        self.resolve_manifest(&manifest, &mut resolution)?;
        Ok(resolution)
    }

    fn resolve_manifest(&mut self, manifest: &Manifest, out: &mut Resolution) -> Result<()> {
        for dep in &manifest.packages {
            let dest = self.vendor_root.join(&dep.name);
            if dest.exists() {
                self.check_already_vendored(dep)?;
                log::debug!("{} already vendored at {}", dep.name, dest.display());
                out.skipped.push(dep.name.clone());
                continue;
            }
            self.fetch(dep, &dest, out)?;
        }
        Ok(())
    }

    fn fetch(&mut self, dep: &Dependency, dest: &Path, out: &mut Resolution) -> Result<()> {
        println!("{} {} [{}]", "Getting".green().bold(), dep.name.bold(), dep.git);

        let wc = self.scratch_dir()?.join(&dep.name);
        if wc.exists() {
            fs::remove_dir_all(&wc).map_err(|e| Error::layout(&wc, e))?;
        }
        log::debug!("cloning {} into {}", dep.git, wc.display());
        self.vcs.clone_repo(&dep.name, &dep.git, &wc)?;
        checkout::pin(self.vcs, &dep.name, &wc, &dep.selector())?;
        let commit = self.vcs.head_commit(&wc);

        let canonical = layout::has_canonical_manifest(&wc);
        if !canonical {
            println!("  {} [{}]", "-".dimmed(), "Not a gopkg package".yellow());
            layout::normalize(&wc)?;
        }

        vendor_working_copy(&wc, dest)?;
        self.requested.insert(dep.name.clone(), dep.clone());
        out.vendored.push(VendoredPackage {
            name: dep.name.clone(),
            git: dep.git.clone(),
            selector: dep.selector(),
            commit,
            canonical,
        });
        println!("  {} {}", "-".dimmed(), "Done".green());

        if canonical {
            let nested = load_manifest(&wc.join(MANIFEST_FILE))?;
            self.resolve_manifest(&nested, out)?;
        }

        if let Err(e) = fs::remove_dir_all(&wc) {
            log::warn!("could not remove working copy {}: {}", wc.display(), e);
        }
        Ok(())
    }

    /// First fetch wins. A later declaration that disagrees with what was
    /// vendored is an error in strict mode and a warning otherwise.
    fn check_already_vendored(&self, dep: &Dependency) -> Result<()> {
        let vendored = if let Some(first) = self.requested.get(&dep.name) {
            if first.git == dep.git && first.selector() == dep.selector() {
                return Ok(());
            }
            format!("{} ({})", first.git, first.selector())
        } else if let Some(entry) = self.baseline.get(&dep.name) {
            if entry.matches(dep) {
                return Ok(());
            }
            format!("{} ({})", entry.git, entry.selector())
        } else {
            // Vendored by hand or by a run that left no lock entry.
            return Ok(());
        };

        let requested = format!("{} ({})", dep.git, dep.selector());
        if self.options.strict {
            return Err(Error::RefConflict {
                name: dep.name.clone(),
                vendored,
                requested,
            });
        }
        log::warn!(
            "'{}' is already vendored from {}; ignoring request for {}",
            dep.name,
            vendored,
            requested
        );
        Ok(())
    }

    fn scratch_dir(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.scratch {
            return Ok(dir.path().to_path_buf());
        }
        let dir = tempfile::Builder::new()
            .prefix("gopkg-")
            .tempdir()
            .map_err(|e| Error::layout(&std::env::temp_dir(), e))?;
        let path = dir.path().to_path_buf();
        self.scratch = Some(dir);
        Ok(path)
    }
}

/// Copies a normalized working copy into its vendor slot: the `src/` tree
/// plus every non-directory entry at the top level.
fn vendor_working_copy(wc: &Path, dest: &Path) -> Result<()> {
    let src = wc.join(SOURCE_DIR);
    let dest_src = dest.join(SOURCE_DIR);
    if src.is_dir() {
        mirror(&src, &dest_src)?;
    } else {
        fs::create_dir_all(&dest_src).map_err(|e| Error::layout(&dest_src, e))?;
    }

    let mut loose = Vec::new();
    for entry in fs::read_dir(wc).map_err(|e| Error::layout(wc, e))? {
        let entry = entry.map_err(|e| Error::layout(wc, e))?;
        let path = entry.path();
        if !path.is_dir() {
            loose.push(path);
        }
    }
    loose.sort();

    for file in loose {
        if let Some(file_name) = file.file_name() {
            mirror(&file, &dest.join(file_name))?;
        }
    }
    Ok(())
}

/// Resolves `manifest_path` into `vendor_root` with default options and
/// returns the top-level workspace metadata.
pub fn resolve<V: Vcs + ?Sized>(
    manifest_path: &Path,
    vendor_root: &Path,
    vcs: &V,
) -> Result<WorkspaceMeta> {
    Resolver::new(vcs, vendor_root)
        .resolve(manifest_path)
        .map(|r| r.workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::vcs::RefTarget;
    use std::cell::RefCell;

    /// Clones by copying a fixture directory; checkouts are recorded only.
    struct DirVcs {
        fixtures: HashMap<String, PathBuf>,
        checkouts: RefCell<Vec<(String, RefTarget)>>,
    }

    impl Vcs for DirVcs {
        fn clone_repo(&self, name: &str, url: &str, dest: &Path) -> Result<()> {
            let src = self.fixtures.get(url).ok_or_else(|| Error::Fetch {
                name: name.into(),
                url: url.into(),
                message: "unknown fixture".into(),
            })?;
            mirror(src, dest)
        }

        fn checkout(&self, name: &str, _dest: &Path, target: &RefTarget) -> Result<()> {
            self.checkouts
                .borrow_mut()
                .push((name.to_string(), target.clone()));
            Ok(())
        }

        fn head_commit(&self, _dest: &Path) -> Option<String> {
            None
        }
    }

    fn write(root: &Path, rel: &str, body: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }

    #[test]
    fn test_vendor_working_copy_copies_src_and_loose_files() {
        let tmp = tempfile::tempdir().unwrap();
        let wc = tmp.path().join("wc");
        write(&wc, "src/a.go", "package a");
        write(&wc, "LICENSE", "MIT");
        write(&wc, "gopkg.toml", "name = \"a\"");
        write(&wc, "docs/notes.txt", "not copied");
        write(&wc, ".git/HEAD", "ref");

        let dest = tmp.path().join("vendor/a");
        vendor_working_copy(&wc, &dest).unwrap();

        assert!(dest.join("src/a.go").is_file());
        assert!(dest.join("LICENSE").is_file());
        assert!(dest.join("gopkg.toml").is_file());
        assert!(!dest.join("docs").exists());
        assert!(!dest.join(".git").exists());
    }

    #[test]
    fn test_vendor_working_copy_without_src_creates_empty_src() {
        let tmp = tempfile::tempdir().unwrap();
        let wc = tmp.path().join("wc");
        write(&wc, "gopkg.toml", "name = \"meta\"");

        let dest = tmp.path().join("vendor/meta");
        vendor_working_copy(&wc, &dest).unwrap();
        assert!(dest.join("src").is_dir());
    }

    #[test]
    fn test_resolve_raw_dependency() {
        let tmp = tempfile::tempdir().unwrap();
        let fixture = tmp.path().join("fixtures/raw");
        write(&fixture, "a.go", "package raw");
        write(&fixture, "sub/b.c", "int b;");
        write(&fixture, "README.md", "# raw");

        let ws = tmp.path().join("ws");
        write(
            &ws,
            "gopkg.toml",
            "name = \"app\"\nauthors = [\"me\"]\n[[packages]]\nname = \"raw\"\ngit = \"mem://raw\"\ntag = \"v1\"\n",
        );

        let vcs = DirVcs {
            fixtures: HashMap::from([("mem://raw".to_string(), fixture)]),
            checkouts: RefCell::new(Vec::new()),
        };
        let vendor = ws.join("vendor");
        let meta = resolve(&ws.join("gopkg.toml"), &vendor, &vcs).unwrap();

        assert_eq!(meta.name, "app");
        assert_eq!(meta.authors, vec!["me"]);
        assert!(vendor.join("raw/src/a.go").is_file());
        assert!(vendor.join("raw/src/sub/b.c").is_file());
        assert!(vendor.join("raw/README.md").is_file());
        assert!(!vendor.join("raw/a.go").exists());
        assert_eq!(
            vcs.checkouts.borrow().as_slice(),
            &[("raw".to_string(), RefTarget::Tag("v1".into()))]
        );
    }

    #[test]
    fn test_skip_conflict_is_error_only_in_strict_mode() {
        let vcs = DirVcs {
            fixtures: HashMap::new(),
            checkouts: RefCell::new(Vec::new()),
        };
        let first = Dependency {
            name: "yaml".into(),
            git: "mem://yaml".into(),
            branch: None,
            tag: Some("v1".into()),
            rev: None,
        };
        let second = Dependency {
            tag: Some("v2".into()),
            ..first.clone()
        };

        let mut lenient = Resolver::new(&vcs, "/unused");
        lenient.requested.insert("yaml".into(), first.clone());
        assert!(lenient.check_already_vendored(&second).is_ok());
        assert!(lenient.check_already_vendored(&first).is_ok());

        let mut strict = Resolver::new(&vcs, "/unused").with_options(ResolveOptions { strict: true });
        strict.requested.insert("yaml".into(), first.clone());
        assert!(strict.check_already_vendored(&first).is_ok());
        let err = strict.check_already_vendored(&second).unwrap_err();
        assert!(matches!(err, Error::RefConflict { ref name, .. } if name == "yaml"));
    }
}
