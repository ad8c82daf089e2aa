//! Project scaffolding for `gopkg new`.
//!
//! - binary (default): `src/main.go` printing a greeting
//! - library (`--lib`): `src/lib.go` exporting a function named after the package

use crate::config::{Dependency, MANIFEST_FILE, Manifest, validate_package_name};
use anyhow::{Context, Result, bail};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the starter `(file name, contents)` for the project's `src/`.
pub fn source_template(name: &str, lib: bool) -> (&'static str, String) {
    if lib {
        let package = go_identifier(name);
        (
            "lib.go",
            format!(
                "package {package}\n\nfunc {func}() string {{\n\treturn \"Hello World!\"\n}}\n",
                package = package,
                func = exported(&package)
            ),
        )
    } else {
        (
            "main.go",
            "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {\n\tfmt.Println(\"Hello World!\")\n}\n"
                .to_string(),
        )
    }
}

pub fn manifest_template(name: &str) -> Manifest {
    Manifest {
        name: name.to_string(),
        authors: vec!["Your Name <email@example.com>".to_string()],
        packages: vec![Dependency {
            name: "package".to_string(),
            git: "https://github.com/example/package".to_string(),
            branch: None,
            tag: None,
            rev: Some("49c95bdc21843256fb6c4e0d370a05f24a0bf213".to_string()),
        }],
    }
}

/// Creates `<parent>/<name>` with a manifest and a starter source file.
pub fn create_project(parent: &Path, name: &str, lib: bool) -> Result<PathBuf> {
    if let Err(reason) = validate_package_name(name) {
        bail!("invalid project name '{}': {}", name, reason);
    }
    let root = parent.join(name);
    if root.exists() {
        bail!("'{}' already exists", root.display());
    }

    let src = root.join("src");
    fs::create_dir_all(&src).with_context(|| format!("Failed to create {}", src.display()))?;

    let (file, body) = source_template(name, lib);
    fs::write(src.join(file), body)?;
    fs::write(root.join(MANIFEST_FILE), manifest_template(name).to_toml_string()?)?;

    let kind = if lib { "library" } else { "binary" };
    println!("{} Created {} project {}", "✓".green(), kind, name.bold());
    Ok(root)
}

fn go_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

fn exported(ident: &str) -> String {
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
