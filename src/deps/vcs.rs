//! Version-control backends.
//!
//! The resolver only needs three things from git: clone a URL into a
//! directory, move that working copy to a branch/tag/revision, and report
//! the commit it ended up on. [`Git2Vcs`] does this in-process through
//! libgit2; [`GitCli`] shells out to the `git` executable, which picks up
//! SSH agents and credential helpers configured for the user.

use crate::error::{Error, Result};
use colored::*;
use git2::Repository;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::Path;
use std::process::Command;

/// A single checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefTarget {
    Branch(String),
    Tag(String),
    Revision(String),
}

impl fmt::Display for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefTarget::Branch(b) => write!(f, "branch {}", b),
            RefTarget::Tag(t) => write!(f, "tag {}", t),
            RefTarget::Revision(r) => write!(f, "rev {}", r),
        }
    }
}

pub trait Vcs {
    /// Clones `url` into `dest`. `name` is the dependency being fetched and
    /// only appears in errors and progress output.
    fn clone_repo(&self, name: &str, url: &str, dest: &Path) -> Result<()>;

    /// Moves the working copy at `dest` to `target`. Revisions are applied
    /// as a hard reset.
    fn checkout(&self, name: &str, dest: &Path, target: &RefTarget) -> Result<()>;

    /// Commit id the working copy currently sits on, if it can be told.
    fn head_commit(&self, dest: &Path) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Vcs;

impl Vcs for Git2Vcs {
    fn clone_repo(&self, name: &str, url: &str, dest: &Path) -> Result<()> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"),
        );
        pb.set_message(format!("Downloading {}...", name));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        match Repository::clone(url, dest) {
            Ok(_) => {
                pb.finish_and_clear();
                Ok(())
            }
            Err(err) => {
                pb.finish_with_message(format!("{} Failed {}", "x".red(), name));
                Err(Error::Fetch {
                    name: name.to_string(),
                    url: url.to_string(),
                    message: err.message().to_string(),
                })
            }
        }
    }

    fn checkout(&self, name: &str, dest: &Path, target: &RefTarget) -> Result<()> {
        let ref_err = |message: String| Error::Ref {
            name: name.to_string(),
            target: target.to_string(),
            message,
        };
        let repo = Repository::open(dest).map_err(|e| ref_err(e.message().to_string()))?;

        match target {
            RefTarget::Branch(branch) => {
                let oid = find_branch_commit(&repo, branch)
                    .ok_or_else(|| ref_err(format!("no local or origin branch named '{}'", branch)))?;
                checkout_detached(&repo, oid).map_err(|e| ref_err(e.message().to_string()))
            }
            RefTarget::Tag(tag) => {
                let refname = format!("refs/tags/{}", tag);
                let commit = repo
                    .find_reference(&refname)
                    .and_then(|r| r.peel_to_commit())
                    .map_err(|e| ref_err(e.message().to_string()))?;
                checkout_detached(&repo, commit.id()).map_err(|e| ref_err(e.message().to_string()))
            }
            RefTarget::Revision(rev) => {
                let obj = repo
                    .revparse_single(rev)
                    .and_then(|o| o.peel(git2::ObjectType::Commit))
                    .map_err(|e| ref_err(e.message().to_string()))?;
                repo.reset(&obj, git2::ResetType::Hard, None)
                    .map_err(|e| ref_err(e.message().to_string()))
            }
        }
    }

    fn head_commit(&self, dest: &Path) -> Option<String> {
        let repo = Repository::open(dest).ok()?;
        let head = repo.head().ok()?;
        let commit = head.peel_to_commit().ok()?;
        Some(commit.id().to_string())
    }
}

fn find_branch_commit(repo: &Repository, branch: &str) -> Option<git2::Oid> {
    if let Ok(reference) = repo.find_branch(branch, git2::BranchType::Local)
        && let Ok(commit) = reference.get().peel_to_commit()
    {
        return Some(commit.id());
    }

    let remote_ref = format!("origin/{}", branch);
    if let Ok(reference) = repo.find_branch(&remote_ref, git2::BranchType::Remote)
        && let Ok(commit) = reference.get().peel_to_commit()
    {
        return Some(commit.id());
    }

    None
}

// The tree is checked out before HEAD moves so files that only exist on the
// old commit are removed from the working copy.
fn checkout_detached(repo: &Repository, oid: git2::Oid) -> std::result::Result<(), git2::Error> {
    let obj = repo.find_object(oid, None)?;
    let mut opts = git2::build::CheckoutBuilder::new();
    opts.force();
    repo.checkout_tree(&obj, Some(&mut opts))?;
    repo.set_head_detached(oid)
}

/// Drives the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, dir: Option<&Path>, args: &[&str]) -> std::result::Result<String, String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        log::debug!("running {} {}", self.program, args.join(" "));

        let output = cmd
            .output()
            .map_err(|e| format!("could not run {}: {}", self.program, e))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
    }
}

impl Vcs for GitCli {
    fn clone_repo(&self, name: &str, url: &str, dest: &Path) -> Result<()> {
        let args = clone_args(url, dest);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(None, &args)
            .map(|_| ())
            .map_err(|message| Error::Fetch {
                name: name.to_string(),
                url: url.to_string(),
                message,
            })
    }

    fn checkout(&self, name: &str, dest: &Path, target: &RefTarget) -> Result<()> {
        let args = checkout_args(target);
        self.run(Some(dest), &args)
            .map(|_| ())
            .map_err(|message| Error::Ref {
                name: name.to_string(),
                target: target.to_string(),
                message,
            })
    }

    fn head_commit(&self, dest: &Path) -> Option<String> {
        self.run(Some(dest), &["rev-parse", "HEAD"])
            .ok()
            .filter(|s| !s.is_empty())
    }
}

// Manifest values come from remote repositories. `--` and
// `--end-of-options` keep a value starting with `-` from being read as an
// option.
fn clone_args(url: &str, dest: &Path) -> Vec<String> {
    vec![
        "clone".into(),
        "-q".into(),
        "--".into(),
        url.into(),
        dest.to_string_lossy().into_owned(),
    ]
}

fn checkout_args(target: &RefTarget) -> Vec<&str> {
    match target {
        RefTarget::Branch(r) | RefTarget::Tag(r) => {
            vec!["checkout", "-q", "--end-of-options", r.as_str(), "--"]
        }
        RefTarget::Revision(r) => vec!["reset", "-q", "--hard", "--end-of-options", r.as_str(), "--"],
    }
}
