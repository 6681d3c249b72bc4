//! User list loading
//!
//! The list is a plain text file with one identifier per line. Lines are
//! trimmed, blank lines are dropped, order and duplicates are kept.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

use super::paths::identifier_concern;

/// Load user identifiers from `path`
///
/// A missing file is reported and yields an empty list. A file that exists
/// but cannot be read is an error.
pub fn load_user_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        println!("File {} does not exist.", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read user list: {}", path.display()))?;
    let users = parse_user_list(&content);

    for user in &users {
        if let Some(concern) = identifier_concern(user) {
            println!(
                "{} user '{}' {}; its paths may resolve outside the user folder",
                "Warning:".yellow(),
                user,
                concern
            );
        }
    }

    tracing::debug!(count = users.len(), path = %path.display(), "loaded user list");
    Ok(users)
}

/// Split list content into trimmed, non-empty identifiers
pub fn parse_user_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_padded_lines() {
        assert_eq!(
            parse_user_list("alice\n\nbob \n  \ncarol"),
            vec!["alice", "bob", "carol"]
        );
    }

    #[test]
    fn test_duplicates_and_order_kept() {
        assert_eq!(
            parse_user_list("zed\r\nalice\r\nzed\r\n"),
            vec!["zed", "alice", "zed"]
        );
    }

    #[test]
    fn test_inner_whitespace_kept() {
        assert_eq!(parse_user_list("\tfirst last \n"), vec!["first last"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let users = load_user_list(&dir.path().join("users.txt")).unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, "alice\n\nbob \n  \ncarol").unwrap();

        assert_eq!(load_user_list(&path).unwrap(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_unreadable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, [0xff, 0xfe, 0x00, b'\n']).unwrap();

        assert!(load_user_list(&path).is_err());
    }
}
