//! Dependency tree visualization.
//!
//! `gopkg tree` walks the workspace manifest and then each vendored
//! package's own `gopkg.toml` (mirrored into `vendor/<name>/`).
//!
//! ```text
//! hello
//! ├── yaml (tag: v2.4.0)
//! │   └── check (branch: v1)
//! └── color (git: https://github.com/fatih/color)
//! ```

use crate::config::{Dependency, MANIFEST_FILE, Workspace, load_manifest};
use crate::error::Result;
use colored::*;
use std::collections::HashSet;

/// Renders the dependency tree as plain lines (no color).
pub fn render_tree(workspace: &Workspace) -> Result<Vec<String>> {
    let manifest = load_manifest(&workspace.manifest_path())?;
    let mut lines = vec![manifest.name.clone()];
    let mut visiting = HashSet::new();
    render_children(workspace, &manifest.packages, "", &mut visiting, &mut lines)?;
    Ok(lines)
}

fn render_children(
    workspace: &Workspace,
    deps: &[Dependency],
    prefix: &str,
    visiting: &mut HashSet<String>,
    lines: &mut Vec<String>,
) -> Result<()> {
    for (i, dep) in deps.iter().enumerate() {
        let is_last = i + 1 == deps.len();
        let branch = if is_last { "└── " } else { "├── " };
        let vendored = workspace.vendor_dir.join(&dep.name);

        let mut line = format!("{}{}{} ({})", prefix, branch, dep.name, describe(dep));
        if !vendored.exists() {
            line.push_str(" [not vendored]");
        }

        let nested = vendored.join(MANIFEST_FILE);
        if visiting.contains(&dep.name) {
            line.push_str(" (cycle)");
            lines.push(line);
            continue;
        }
        lines.push(line);

        if nested.is_file() {
            let manifest = load_manifest(&nested)?;
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            visiting.insert(dep.name.clone());
            render_children(workspace, &manifest.packages, &child_prefix, visiting, lines)?;
            visiting.remove(&dep.name);
        }
    }
    Ok(())
}

fn describe(dep: &Dependency) -> String {
    if let Some(r) = &dep.rev {
        format!("rev: {:.7}", r)
    } else if let Some(t) = &dep.tag {
        format!("tag: {}", t)
    } else if let Some(b) = &dep.branch {
        format!("branch: {}", b)
    } else {
        format!("git: {}", dep.git)
    }
}

pub fn print_tree(workspace: &Workspace) -> Result<()> {
    let lines = render_tree(workspace)?;
    let mut iter = lines.into_iter();
    if let Some(root) = iter.next() {
        println!("{}", root.bold().cyan());
    }
    let mut any = false;
    for line in iter {
        any = true;
        println!("{}", line);
    }
    if !any {
        println!("└── (no dependencies)");
    }
    Ok(())
}
