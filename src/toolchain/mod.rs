//! Go toolchain invocation.
//!
//! The vendor tree keeps each package at `vendor/<name>/src`, which is not a
//! GOPATH layout. Before every toolchain call the vendored sources are staged
//! into `.gopkg/src/<name>` and `GOPATH` is pointed there, on the child
//! process only.

use crate::config::Workspace;
use crate::deps::{mirror::mirror, vendored_names};
use crate::error::{Error, Result};
use colored::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const STAGING_DIR: &str = ".gopkg";

pub trait Toolchain {
    /// Compiles the workspace's `src/` into `<root>/<output_name>`.
    fn build(&self, workspace: &Workspace, output_name: &str) -> Result<PathBuf>;

    /// Builds, then runs the produced binary with `args`.
    fn run(&self, workspace: &Workspace, output_name: &str, args: &[String]) -> Result<()>;

    /// Runs tests for `package` (a path under `src/`), or the whole `src/`.
    fn test(&self, workspace: &Workspace, package: Option<&str>) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: String,
    /// Extra environment applied to every spawned command.
    pub env_vars: HashMap<String, String>,
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::with_program("go")
    }
}

impl GoToolchain {
    pub fn with_program(program: impl Into<String>) -> Self {
        let mut env_vars = HashMap::new();
        env_vars.insert("GO111MODULE".to_string(), "off".to_string());
        Self {
            program: program.into(),
            env_vars,
        }
    }

    fn command(&self, workspace: &Workspace, gopath: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&workspace.root)
            .envs(&self.env_vars)
            .env("GOPATH", gopath);
        cmd
    }

    fn exec(&self, mut cmd: Command, label: String) -> Result<()> {
        log::debug!("running {:?}", cmd);
        let status = cmd.status().map_err(|e| Error::Toolchain {
            command: label.clone(),
            message: e.to_string(),
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::Toolchain {
                command: label,
                message: format!("exited with {}", status),
            })
        }
    }
}

impl Toolchain for GoToolchain {
    fn build(&self, workspace: &Workspace, output_name: &str) -> Result<PathBuf> {
        let gopath = stage_gopath(workspace)?;
        let output = workspace.root.join(output_name);
        println!("{} Building {}...", "🔨".yellow(), output_name.bold());

        let mut cmd = self.command(workspace, &gopath);
        cmd.arg("build").arg("-o").arg(&output).arg("./src");
        self.exec(cmd, format!("{} build", self.program))?;
        Ok(output)
    }

    fn run(&self, workspace: &Workspace, output_name: &str, args: &[String]) -> Result<()> {
        let binary = self.build(workspace, output_name)?;
        println!("{} Running {}", "▶".green(), binary.display());
        let mut cmd = Command::new(&binary);
        cmd.args(args).current_dir(&workspace.root);
        self.exec(cmd, binary.display().to_string())
    }

    fn test(&self, workspace: &Workspace, package: Option<&str>) -> Result<()> {
        let gopath = stage_gopath(workspace)?;
        let target = match package {
            Some(p) => format!("./src/{}", p.trim_start_matches("./")),
            None => "./src/...".to_string(),
        };
        println!("{} Testing {}", "🧪".magenta(), target);

        let mut cmd = self.command(workspace, &gopath);
        cmd.arg("test").arg(&target);
        self.exec(cmd, format!("{} test {}", self.program, target))
    }
}

/// Rebuilds `<root>/.gopkg/src/<name>` from `vendor/<name>/src` for every
/// vendored package and returns the directory to use as `GOPATH`.
pub fn stage_gopath(workspace: &Workspace) -> Result<PathBuf> {
    let gopath = workspace.root.join(STAGING_DIR);
    let staged_src = gopath.join("src");
    if staged_src.exists() {
        fs::remove_dir_all(&staged_src).map_err(|e| Error::layout(&staged_src, e))?;
    }
    fs::create_dir_all(&staged_src).map_err(|e| Error::layout(&staged_src, e))?;

    for name in vendored_names(workspace)? {
        let src = workspace.vendor_dir.join(&name).join("src");
        if src.is_dir() {
            mirror(&src, &staged_src.join(&name))?;
        }
    }
    Ok(gopath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_gopath_mirrors_vendor_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path());
        fs::create_dir_all(ws.vendor_dir.join("yaml/src")).unwrap();
        fs::write(ws.vendor_dir.join("yaml/src/yaml.go"), "package yaml").unwrap();
        fs::write(ws.vendor_dir.join("yaml/LICENSE"), "MIT").unwrap();

        let gopath = stage_gopath(&ws).unwrap();
        assert_eq!(gopath, tmp.path().join(STAGING_DIR));
        assert!(gopath.join("src/yaml/yaml.go").is_file());
        assert!(!gopath.join("src/yaml/LICENSE").exists());

        // Packages removed from vendor disappear from the next staging.
        fs::remove_dir_all(ws.vendor_dir.join("yaml")).unwrap();
        let gopath = stage_gopath(&ws).unwrap();
        assert!(!gopath.join("src/yaml").exists());
    }

    #[test]
    fn test_env_is_scoped_to_toolchain() {
        let tc = GoToolchain::default();
        assert_eq!(tc.env_vars.get("GO111MODULE").map(String::as_str), Some("off"));
        assert!(!tc.env_vars.contains_key("GOPATH"));
    }

    #[test]
    fn test_missing_go_binary_is_toolchain_error() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path());
        let tc = GoToolchain::with_program("gopkg-test-no-such-go");
        let err = tc.build(&ws, "app").unwrap_err();
        assert!(matches!(err, Error::Toolchain { .. }));
    }
}
