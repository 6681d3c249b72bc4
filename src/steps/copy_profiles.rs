//! Copy step - Duplicate each user's profile under the target root

use owo_colors::OwoColorize;
use std::fs;

use super::utils::{self, CopySummary};
use crate::config::Config;
use crate::error::{StepError, StepResult};
use crate::profile::UserPaths;
use crate::report::StepOutcome;

/// Copy the profile of every user, in list order
pub fn execute(config: &Config, users: &[String]) -> Vec<StepOutcome> {
    users
        .iter()
        .map(|user| copy_user_profile(config, user))
        .collect()
}

fn copy_user_profile(config: &Config, user: &str) -> StepOutcome {
    let paths = config.user_paths(user);

    if !paths.profile.exists() {
        println!(
            "{} User Data directory does not exist for: {}",
            "Skipped:".yellow(),
            user
        );
        return StepOutcome::Skipped;
    }

    match copy_profile(&paths) {
        Ok(Some(summary)) if summary.failures.is_empty() => {
            println!(
                "{} User Data for {} to {} ({})",
                "Copied:".green(),
                user,
                paths.target.display(),
                utils::format_size(summary.bytes)
            );
            StepOutcome::Done
        }
        Ok(Some(summary)) => {
            for err in &summary.failures {
                println!("{} {}", "Failed:".red(), err);
            }
            println!(
                "{} to copy User Data for {}. Reason: {} entr{} not copied ({} copied)",
                "Failed".red(),
                user,
                summary.failures.len(),
                if summary.failures.len() == 1 { "y" } else { "ies" },
                utils::format_size(summary.bytes)
            );
            StepOutcome::Failed
        }
        Ok(None) => {
            println!(
                "{} User Data for {} already resolves to {}",
                "Relocated:".green(),
                user,
                paths.target.display()
            );
            StepOutcome::Done
        }
        Err(err) => {
            println!(
                "{} to copy User Data for {}. Reason: {}",
                "Failed".red(),
                user,
                err
            );
            StepOutcome::Failed
        }
    }
}

/// Merge the profile directory into the target directory
///
/// Returns what was copied, or `None` when the profile already resolves to
/// the target (a link left by an earlier run) and nothing was copied. Only a
/// failure to create the target is an `Err`; entries that fail to copy are
/// listed in the summary.
pub fn copy_profile(paths: &UserPaths) -> StepResult<Option<CopySummary>> {
    if !paths.target.exists() {
        fs::create_dir_all(&paths.target)
            .map_err(|e| StepError::io("create", &paths.target, e))?;
        println!("Created directory for user: {}", paths.target.display());
    }

    // Copying a tree onto itself would truncate every file
    if utils::same_location(&paths.profile, &paths.target) {
        return Ok(None);
    }

    let summary = utils::copy_dir_contents(&paths.profile, &paths.target);
    tracing::debug!(
        src = %paths.profile.display(),
        dst = %paths.target.display(),
        bytes = summary.bytes,
        failures = summary.failures.len(),
        "copied profile"
    );
    Ok(Some(summary))
}
