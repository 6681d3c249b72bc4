//! Full migration run: load users, clear caches, copy profiles, link
//!
//! Each step covers every user before the next step starts. A failure for one
//! user never stops the others.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

use crate::config::Config;
use crate::profile::load_user_list;
use crate::report::RunReport;
use crate::steps::{clean_cache, copy_profiles, link_profiles};

/// Run the migration for the users listed in `user_list`
///
/// Returns `None` when no users were loaded; nothing on disk is touched in
/// that case.
pub fn run(config: &Config, user_list: &Path) -> Result<Option<RunReport>> {
    let users = load_user_list(user_list)?;
    if users.is_empty() {
        println!("No users to process. Exiting.");
        return Ok(None);
    }

    tracing::info!(
        users = users.len(),
        base = %config.base_dir.display(),
        target = %config.target_root.display(),
        "starting migration"
    );

    let mut report = RunReport::new(&users);

    println!("{}", "Step 1: Clearing caches...".green());
    let outcomes = clean_cache::execute(config, &users);
    for (entry, outcome) in report.users.iter_mut().zip(outcomes) {
        entry.cache = outcome;
    }

    println!("{}", "Step 2: Copying profiles...".green());
    let outcomes = copy_profiles::execute(config, &users);
    for (entry, outcome) in report.users.iter_mut().zip(outcomes) {
        entry.copy = outcome;
    }

    println!("{}", "Step 3: Replacing profiles with links...".green());
    let outcomes = link_profiles::execute(config, &users);
    for (entry, outcome) in report.users.iter_mut().zip(outcomes) {
        entry.link = outcome;
    }

    Ok(Some(report))
}
