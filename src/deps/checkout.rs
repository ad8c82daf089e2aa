//! Pinning a fresh clone to the declared ref.

use super::vcs::{RefTarget, Vcs};
use crate::config::RefSelector;
use crate::error::Result;
use colored::*;
use std::path::Path;

/// Checkout requests in the order they are applied: branch, then tag, then
/// revision. Each one overwrites the previous, so a revision always wins.
pub fn checkout_plan(selector: &RefSelector) -> Vec<RefTarget> {
    let mut plan = Vec::with_capacity(selector.count());
    if let Some(branch) = &selector.branch {
        plan.push(RefTarget::Branch(branch.clone()));
    }
    if let Some(tag) = &selector.tag {
        plan.push(RefTarget::Tag(tag.clone()));
    }
    if let Some(rev) = &selector.rev {
        plan.push(RefTarget::Revision(rev.clone()));
    }
    plan
}

/// Pins `working_copy` according to `selector`. With no selector the clone
/// stays on the remote's default branch.
pub fn pin<V: Vcs + ?Sized>(
    vcs: &V,
    name: &str,
    working_copy: &Path,
    selector: &RefSelector,
) -> Result<()> {
    for target in checkout_plan(selector) {
        println!("   {} {}", "-".dimmed(), target);
        vcs.checkout(name, working_copy, &target)?;
    }
    Ok(())
}
