//! Link step - Replace each user's profile with a link to its relocated copy
//!
//! The original directory is deleted before the link is created. There is no
//! rollback: if link creation fails the profile path is left missing.

use owo_colors::OwoColorize;
use std::fs;

use super::utils;
use crate::config::Config;
use crate::error::{StepError, StepResult};
use crate::profile::UserPaths;
use crate::report::StepOutcome;

/// Replace the profile of every user with a link, in list order
pub fn execute(config: &Config, users: &[String]) -> Vec<StepOutcome> {
    users
        .iter()
        .map(|user| link_user_profile(config, user))
        .collect()
}

fn link_user_profile(config: &Config, user: &str) -> StepOutcome {
    let paths = config.user_paths(user);

    if !paths.profile.exists() {
        println!(
            "{} User Data directory does not exist for: {}",
            "Skipped:".yellow(),
            user
        );
        return StepOutcome::Skipped;
    }

    match replace_with_link(&paths, config.verify_copy) {
        Ok(()) => StepOutcome::Done,
        Err(err) => {
            println!(
                "{} to replace User Data with link for {}. Reason: {}",
                "Failed".red(),
                user,
                err
            );
            StepOutcome::Failed
        }
    }
}

/// Delete the profile directory and link its path to the target
///
/// When `verify` is set the target is checked against the profile first and
/// nothing is deleted on mismatch. A profile that is already a link has only
/// the link removed, so re-running on a linked user is safe.
pub fn replace_with_link(paths: &UserPaths, verify: bool) -> StepResult<()> {
    if verify {
        utils::verify_copy(&paths.profile, &paths.target)?;
    }

    if utils::is_link(&paths.profile) {
        utils::remove_entry(&paths.profile)?;
        tracing::debug!(path = %paths.profile.display(), "removed existing link");
    } else {
        fs::remove_dir_all(&paths.profile)
            .map_err(|e| StepError::io("remove", &paths.profile, e))?;
    }
    println!(
        "{} original User Data directory: {}",
        "Deleted:".green(),
        paths.profile.display()
    );

    utils::create_dir_link(&paths.target, &paths.profile)?;
    println!(
        "{} junction link from {} to {}",
        "Created:".green(),
        paths.profile.display(),
        paths.target.display()
    );
    Ok(())
}
