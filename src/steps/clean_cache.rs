//! Cache step - Empty each user's browser cache directory

use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

use super::utils;
use crate::config::Config;
use crate::error::{StepError, StepResult};
use crate::report::StepOutcome;

/// Clear the cache directory of every user, in list order
pub fn execute(config: &Config, users: &[String]) -> Vec<StepOutcome> {
    users
        .iter()
        .map(|user| clear_user_cache(config, user))
        .collect()
}

fn clear_user_cache(config: &Config, user: &str) -> StepOutcome {
    let cache_dir = config.user_paths(user).cache;

    if !cache_dir.exists() {
        println!(
            "{} Cache directory does not exist for: {}",
            "Skipped:".yellow(),
            user
        );
        return StepOutcome::Skipped;
    }

    println!("Clearing cache for: {}", cache_dir.display());

    match clear_dir_contents(&cache_dir) {
        Ok(failures) if failures.is_empty() => StepOutcome::Done,
        Ok(failures) => {
            for err in &failures {
                println!("{} {}", "Failed:".red(), err);
            }
            StepOutcome::Failed
        }
        Err(err) => {
            println!("{} {}", "Failed:".red(), err);
            StepOutcome::Failed
        }
    }
}

/// Remove every direct child of `dir`, keeping `dir` itself
///
/// Directories are removed recursively; every other entry (files, links,
/// special files) is unlinked without being followed. Each child is attempted
/// independently and its error collected. Returns `Err` only when `dir` cannot be listed.
pub fn clear_dir_contents(dir: &Path) -> StepResult<Vec<StepError>> {
    let entries = fs::read_dir(dir).map_err(|e| StepError::io("read", dir, e))?;
    let mut failures = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                failures.push(StepError::io("read entry in", dir, e));
                continue;
            }
        };
        let path = entry.path();

        if let Err(err) = remove_child(&path) {
            failures.push(err);
        }
    }

    Ok(failures)
}

fn remove_child(path: &Path) -> StepResult<()> {
    let file_type = fs::symlink_metadata(path)
        .map_err(|e| StepError::io("inspect", path, e))?
        .file_type();

    if file_type.is_dir() && !utils::is_link(path) {
        fs::remove_dir_all(path).map_err(|e| StepError::io("remove", path, e))?;
        tracing::debug!(path = %path.display(), "removed cache directory");
    } else {
        // Files, links, sockets and FIFOs are all unlinked
        utils::remove_entry(path)?;
        tracing::debug!(path = %path.display(), "removed cache entry");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_for(base: &Path) -> Config {
        Config {
            base_dir: base.to_path_buf(),
            relative_cache_path: PathBuf::from("Cache"),
            relative_profile_path: PathBuf::from("Profile"),
            target_root: base.join("target"),
            verify_copy: false,
        }
    }

    #[test]
    fn test_cache_emptied_but_kept() {
        let base = tempfile::tempdir().unwrap();
        let cache = base.path().join("alice").join("Cache");
        fs::create_dir_all(cache.join("sub").join("deeper")).unwrap();
        fs::write(cache.join("f_000001"), "data").unwrap();
        fs::write(cache.join("sub").join("index"), "idx").unwrap();
        fs::write(cache.join("sub").join("deeper").join("blob"), "b").unwrap();

        let outcomes = execute(&config_for(base.path()), &["alice".to_string()]);

        assert_eq!(outcomes, vec![StepOutcome::Done]);
        assert!(cache.is_dir());
        assert_eq!(fs::read_dir(&cache).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_cache_is_skipped() {
        let base = tempfile::tempdir().unwrap();
        fs::create_dir_all(base.path().join("bob")).unwrap();
        fs::write(base.path().join("bob").join("keep.txt"), "k").unwrap();

        let outcomes = execute(&config_for(base.path()), &["bob".to_string()]);

        assert_eq!(outcomes, vec![StepOutcome::Skipped]);
        assert!(base.path().join("bob").join("keep.txt").exists());
    }

    #[test]
    fn test_outcomes_follow_user_order() {
        let base = tempfile::tempdir().unwrap();
        fs::create_dir_all(base.path().join("alice").join("Cache")).unwrap();
        fs::create_dir_all(base.path().join("carol").join("Cache")).unwrap();

        let users = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
        let outcomes = execute(&config_for(base.path()), &users);

        assert_eq!(
            outcomes,
            vec![StepOutcome::Done, StepOutcome::Skipped, StepOutcome::Done]
        );
    }

    #[test]
    fn test_unlistable_cache_fails() {
        let base = tempfile::tempdir().unwrap();
        fs::create_dir_all(base.path().join("alice")).unwrap();
        // A file where the cache directory should be
        fs::write(base.path().join("alice").join("Cache"), "not a dir").unwrap();

        let outcomes = execute(&config_for(base.path()), &["alice".to_string()]);

        assert_eq!(outcomes, vec![StepOutcome::Failed]);
    }

    #[cfg(unix)]
    #[test]
    fn test_special_files_removed() {
        let base = tempfile::tempdir().unwrap();
        let cache = base.path().join("alice").join("Cache");
        fs::create_dir_all(&cache).unwrap();
        let _listener = std::os::unix::net::UnixListener::bind(cache.join("socket")).unwrap();

        let outcomes = execute(&config_for(base.path()), &["alice".to_string()]);

        assert_eq!(outcomes, vec![StepOutcome::Done]);
        assert_eq!(fs::read_dir(&cache).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_stuck_child_does_not_stop_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let base = tempfile::tempdir().unwrap();
        let cache = base.path().join("alice").join("Cache");
        let locked = cache.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("entry"), "e").unwrap();
        fs::write(cache.join("data_0"), "d").unwrap();
        fs::create_dir(cache.join("index-dir")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits are not enforced for root
        if fs::write(locked.join("write-check"), "").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let outcomes = execute(&config_for(base.path()), &["alice".to_string()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(outcomes, vec![StepOutcome::Failed]);
        assert!(!cache.join("data_0").exists());
        assert!(!cache.join("index-dir").exists());
        assert!(locked.join("entry").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_links_removed_without_following() {
        let base = tempfile::tempdir().unwrap();
        let outside = base.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("precious"), "keep me").unwrap();

        let cache = base.path().join("alice").join("Cache");
        fs::create_dir_all(&cache).unwrap();
        std::os::unix::fs::symlink(&outside, cache.join("dir-link")).unwrap();
        std::os::unix::fs::symlink(outside.join("precious"), cache.join("file-link")).unwrap();

        let failures = clear_dir_contents(&cache).unwrap();

        assert!(failures.is_empty());
        assert_eq!(fs::read_dir(&cache).unwrap().count(), 0);
        assert_eq!(
            fs::read_to_string(outside.join("precious")).unwrap(),
            "keep me"
        );
    }
}
