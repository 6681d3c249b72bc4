//! Errors raised by a single pipeline step for a single user
//!
//! Step functions return [`StepError`] instead of aborting; the caller prints
//! it and moves on to the next entry or user. A missing directory is not an
//! error, the step reports it as skipped.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of one filesystem operation within a step
#[derive(Error, Debug)]
pub enum StepError {
    /// A delete, mkdir, listing or link operation failed
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A source entry could not be listed during a tree walk
    #[error("failed to read {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A single file could not be copied
    #[error("failed to copy {} to {}: {source}", src.display(), dst.display())]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: fs_extra::error::Error,
    },

    /// The copy at the target does not match the original profile
    #[error("copy at {} is incomplete: {reason}", dst.display())]
    Unverified { dst: PathBuf, reason: String },
}

impl StepError {
    /// Wrap a walk error, naming the entry it was raised for
    pub fn walk(root: &Path, source: walkdir::Error) -> Self {
        Self::Walk {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        }
    }

    /// Wrap an I/O error with the attempted action and path
    pub fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenience alias for step results
pub type StepResult<T> = std::result::Result<T, StepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_message_names_action_and_path() {
        let err = StepError::io(
            "remove",
            Path::new("/tmp/cache/x"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("remove"));
        assert!(msg.contains("/tmp/cache/x"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_unverified_message() {
        let err = StepError::Unverified {
            dst: PathBuf::from("/profiles/alice"),
            reason: "Default/History is missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "copy at /profiles/alice is incomplete: Default/History is missing"
        );
    }
}
