//! # gopkg - vendoring package manager for Go workspaces
//!
//! gopkg reads a workspace manifest (`gopkg.toml`), fetches every listed
//! git dependency at its pinned branch/tag/revision, normalizes its layout
//! and flattens the whole transitive closure into `vendor/<name>/`.
//!
//! ## Quick Start
//!
//! ```bash
//! gopkg new hello
//! cd hello
//! gopkg get      # vendor dependencies
//! gopkg run
//! ```
//!
//! ## Module Organization
//!
//! - [`deps`] - Resolution, layout normalization, git backends
//! - [`config`] - Manifest parsing and workspace paths
//! - [`lock`] - Lockfile (`gopkg.lock`) bookkeeping
//! - [`toolchain`] - Go toolchain invocation

/// Manifest parsing and workspace configuration (`gopkg.toml`).
pub mod config;

/// Dependency resolution and vendoring.
pub mod deps;

/// Library error type.
pub mod error;

/// Lockfile (`gopkg.lock`) management.
pub mod lock;

/// Project templates for `gopkg new`.
pub mod templates;

/// Go toolchain invocation.
pub mod toolchain;

/// Dependency tree visualization.
pub mod tree;

/// Terminal UI utilities (tables).
pub mod ui;
