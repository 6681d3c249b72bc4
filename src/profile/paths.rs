//! Paths derived from a user identifier
//!
//! Identifiers are joined verbatim onto the configured roots. An identifier
//! such as `../admin` or an absolute path therefore escapes the user tree;
//! [`identifier_concern`] lets the loader warn about those without rejecting
//! them.

use std::path::{Component, Path, PathBuf};

/// Cache, profile and target directories for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPaths {
    /// `base/user/relative_cache_path`
    pub cache: PathBuf,
    /// `base/user/relative_profile_path`
    pub profile: PathBuf,
    /// `target_root/user`
    pub target: PathBuf,
}

/// Describe why an identifier may resolve outside its user folder
///
/// Returns `None` for a plain single path segment.
pub fn identifier_concern(user: &str) -> Option<&'static str> {
    let path = Path::new(user);

    if path.has_root() || path.is_absolute() {
        return Some("is an absolute path");
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return Some("contains a parent directory component");
    }
    if user.contains(['/', '\\']) {
        return Some("contains a path separator");
    }
    if matches!(path.components().next(), Some(Component::Prefix(_))) {
        return Some("starts with a drive prefix");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifier() {
        assert_eq!(identifier_concern("alice"), None);
        assert_eq!(identifier_concern("j.doe"), None);
        assert_eq!(identifier_concern("first last"), None);
    }

    #[test]
    fn test_parent_component() {
        assert!(identifier_concern("..").is_some());
        assert!(identifier_concern("../admin").is_some());
    }

    #[test]
    fn test_separator() {
        assert!(identifier_concern("team/alice").is_some());
        assert!(identifier_concern(r"team\alice").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute() {
        assert_eq!(identifier_concern("/etc"), Some("is an absolute path"));
    }
}
