//! Dependency resolution and vendoring.
//!
//! - [`resolve`]: the recursive resolver that fills the vendor tree
//! - [`layout`]: canonical-layout detection and normalization of raw packages
//! - [`checkout`]: pinning a clone to a branch, tag or revision
//! - [`mirror`]: recursive copying into the vendor tree
//! - [`vcs`]: git backends (libgit2 and the `git` executable)
//! - `vendor`: workspace-level vendoring with lockfile bookkeeping

pub mod checkout;
pub mod layout;
pub mod mirror;
pub mod resolve;
pub mod vcs;
mod vendor;

pub use resolve::{Resolution, Resolver, VendoredPackage, resolve};
pub use vcs::{Git2Vcs, GitCli, RefTarget, Vcs};
pub use vendor::{clean_vendor, vendor_dependencies, vendored_names};
