//! # gopkg CLI Entry Point
//!
//! Parses arguments with clap and routes them to the library.
//!
//! - **Project**: `new`
//! - **Dependencies**: `get`, `tree`, `list`, `clean`
//! - **Toolchain**: `build`, `run`, `test`

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use env_logger::Env;
use inquire::Text;
use std::path::PathBuf;

use gopkg::config::{ResolveOptions, Workspace};
use gopkg::deps::{self, Git2Vcs, GitCli, Resolution, Vcs};
use gopkg::lock::LockFile;
use gopkg::templates;
use gopkg::toolchain::{GoToolchain, Toolchain};
use gopkg::tree;
use gopkg::ui;

#[derive(Parser)]
#[command(name = "gopkg")]
#[command(about = "Vendoring package manager for Go workspaces", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Workspace root (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Vendor directory, relative to the workspace root
    #[arg(long, global = true, env = "GOPKG_VENDOR_DIR", value_name = "DIR")]
    vendor_dir: Option<PathBuf>,

    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Clone, Copy)]
struct ResolveArgs {
    /// Fail when a package is requested at a different ref than the one vendored
    #[arg(long, env = "GOPKG_STRICT")]
    strict: bool,
    /// Use the system `git` executable instead of libgit2
    #[arg(long, env = "GOPKG_GIT_CLI")]
    git_cli: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project
    New {
        /// Project name (prompted when omitted)
        name: Option<String>,
        /// Create a library instead of a binary
        #[arg(long)]
        lib: bool,
    },
    /// Fetch and vendor every dependency in gopkg.toml
    Get {
        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Vendor dependencies, then compile the workspace
    Build {
        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Vendor dependencies, compile, then run the binary
    Run {
        #[command(flatten)]
        resolve: ResolveArgs,
        /// Arguments passed to the program
        #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
        args: Vec<String>,
    },
    /// Vendor dependencies, then run `go test`
    Test {
        #[command(flatten)]
        resolve: ResolveArgs,
        /// Package path under src/ (all packages when omitted)
        package: Option<String>,
    },
    /// Show the dependency tree
    Tree,
    /// List vendored packages and their locked commits
    List,
    /// Remove the vendor tree and lockfile
    Clean,
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = if cli.verbose {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    let root = match &cli.workspace {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Could not determine current directory")?,
    };
    let mut workspace = Workspace::new(root);
    if let Some(dir) = &cli.vendor_dir {
        workspace = workspace.with_vendor_dir(dir);
    }

    match cli.command {
        Some(Commands::New { name, lib }) => {
            let name = match name {
                Some(n) => n,
                None => Text::new("Project name:")
                    .with_default("hello")
                    .prompt()
                    .context("No project name given")?,
            };
            let root = templates::create_project(&workspace.root, &name, lib)?;
            println!("   cd {} && gopkg run", root.display());
            Ok(())
        }
        Some(Commands::Get { resolve }) => vendor(&workspace, resolve).map(|_| ()),
        Some(Commands::Build { resolve }) => {
            let resolution = vendor(&workspace, resolve)?;
            let binary = GoToolchain::default().build(&workspace, &resolution.workspace.name)?;
            println!("{} Built {}", "✓".green(), binary.display());
            Ok(())
        }
        Some(Commands::Run { resolve, args }) => {
            let resolution = vendor(&workspace, resolve)?;
            GoToolchain::default().run(&workspace, &resolution.workspace.name, &args)?;
            Ok(())
        }
        Some(Commands::Test { resolve, package }) => {
            vendor(&workspace, resolve)?;
            GoToolchain::default().test(&workspace, package.as_deref())?;
            Ok(())
        }
        Some(Commands::Tree) => Ok(tree::print_tree(&workspace)?),
        Some(Commands::List) => list(&workspace),
        Some(Commands::Clean) => Ok(deps::clean_vendor(&workspace)?),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            print_splash();
            Ok(())
        }
    }
}

fn vendor(workspace: &Workspace, args: ResolveArgs) -> Result<Resolution> {
    let vcs: Box<dyn Vcs> = if args.git_cli {
        Box::new(GitCli::default())
    } else {
        Box::new(Git2Vcs)
    };
    let options = ResolveOptions {
        strict: args.strict,
    };
    deps::vendor_dependencies(workspace, vcs.as_ref(), options).with_context(|| {
        format!(
            "Dependency resolution failed; {} may be incomplete",
            workspace.vendor_dir.display()
        )
    })
}

fn list(workspace: &Workspace) -> Result<()> {
    let names = deps::vendored_names(workspace)?;
    if names.is_empty() {
        println!("{} Nothing vendored yet. Run 'gopkg get'.", "ℹ".blue());
        return Ok(());
    }

    let lock = LockFile::load(&workspace.lock_path())?;
    let mut table = ui::Table::new(&["Package", "Git", "Ref", "Commit"]);
    for name in names {
        let row = match lock.get(&name) {
            Some(entry) => vec![
                name.bold().green().to_string(),
                entry.git.clone(),
                entry.selector().to_string(),
                entry
                    .commit
                    .as_deref()
                    .map(|c| c.chars().take(7).collect())
                    .unwrap_or_else(|| "-".to_string()),
            ],
            None => vec![name, "-".into(), "-".into(), "-".into()],
        };
        table.add_row(row);
    }
    table.print();
    Ok(())
}

fn print_splash() {
    println!();
    println!("   {}", "gopkg".cyan().bold());
    println!("   {}", "Vendoring package manager for Go".dimmed().italic());
    println!("   {}", format!("v{}", env!("CARGO_PKG_VERSION")).green());
    println!();

    let mut table = ui::Table::new(&["Category", "Commands"]);
    table.add_row(vec![
        "Start".bold().green().to_string(),
        "new".cyan().to_string(),
    ]);
    table.add_row(vec![
        "Deps".bold().blue().to_string(),
        format!("{}, {}, {}, {}", "get".cyan(), "tree".cyan(), "list".cyan(), "clean".cyan()),
    ]);
    table.add_row(vec![
        "Build".bold().yellow().to_string(),
        format!("{}, {}, {}", "build".cyan(), "run".cyan(), "test".cyan()),
    ]);
    table.print();
    println!();
    println!("   Run {} for detailed usage.", "gopkg --help".white().bold());
    println!();
}
