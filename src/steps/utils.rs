//! Filesystem helpers shared by the steps

use fs_extra::file;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{StepError, StepResult};

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Result of a merge copy
#[derive(Debug, Default)]
pub struct CopySummary {
    /// Bytes of regular file data copied
    pub bytes: u64,
    /// Entries that could not be copied
    pub failures: Vec<StepError>,
}

/// Copy directory contents into an existing directory (merge)
///
/// Same-named files are overwritten, everything else already at `dst` is
/// kept. Each entry is copied on its own: a failing entry is recorded and the
/// walk carries on with the rest of the tree. Symlinks are recreated as links,
/// not followed, so dangling ones copy as well.
pub fn copy_dir_contents(src: &Path, dst: &Path) -> CopySummary {
    let options = file::CopyOptions::new().overwrite(true);
    let mut summary = CopySummary::default();
    let mut walker = WalkDir::new(src).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                summary.failures.push(StepError::walk(src, e));
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if let Err(e) = fs::create_dir_all(&target) {
                summary.failures.push(StepError::io("create", &target, e));
                // Nothing below this directory can land
                walker.skip_current_dir();
            }
        } else if file_type.is_symlink() {
            if let Err(err) = copy_link(entry.path(), &target) {
                summary.failures.push(err);
            }
        } else {
            match file::copy(entry.path(), &target, &options) {
                Ok(bytes) => summary.bytes += bytes,
                Err(source) => summary.failures.push(StepError::Copy {
                    src: entry.path().to_path_buf(),
                    dst: target,
                    source,
                }),
            }
        }
    }

    summary
}

/// Recreate the link at `src` as `dst`, replacing whatever `dst` holds
fn copy_link(src: &Path, dst: &Path) -> StepResult<()> {
    let link_target = fs::read_link(src).map_err(|e| StepError::io("read link", src, e))?;
    if fs::symlink_metadata(dst).is_ok() {
        remove_entry(dst)?;
    }

    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(&link_target, dst);

    #[cfg(windows)]
    let result = if src.is_dir() {
        std::os::windows::fs::symlink_dir(&link_target, dst)
    } else {
        std::os::windows::fs::symlink_file(&link_target, dst)
    };

    result.map_err(|e| StepError::io("create link at", dst, e))
}

/// Whether `path` itself is a symbolic link or junction
pub fn is_link(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink() || is_junction(&m))
        .unwrap_or(false)
}

#[cfg(windows)]
fn is_junction(meta: &fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
    meta.file_attributes() & FILE_ATTRIBUTE_REPARSE_POINT != 0
}

#[cfg(not(windows))]
fn is_junction(_meta: &fs::Metadata) -> bool {
    false
}

/// Check if metadata represents a directory-like entry
///
/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory
/// symlinks, so the raw `FILE_ATTRIBUTE_DIRECTORY` bit is checked instead.
fn is_dir_like(meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

/// Remove a file or a link without following it
///
/// Directory links on Windows are removed with `remove_dir`.
pub fn remove_entry(path: &Path) -> StepResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| StepError::io("inspect", path, e))?;
    let result = if (meta.file_type().is_symlink() || is_junction(&meta)) && is_dir_like(&meta) {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| StepError::io("remove", path, e))
}

/// Create a directory link at `link` resolving to `target`
pub fn create_dir_link(target: &Path, link: &Path) -> StepResult<()> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = std::os::windows::fs::symlink_dir(target, link);

    result.map_err(|e| StepError::io("create link at", link, e))
}

/// Whether `a` and `b` resolve to the same existing directory
pub fn same_location(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Check that every file under `src` exists under `dst` with the same length
///
/// Symlinks inside `src` only need a counterpart entry at `dst`.
pub fn verify_copy(src: &Path, dst: &Path) -> StepResult<()> {
    let unverified = |reason: String| StepError::Unverified {
        dst: dst.to_path_buf(),
        reason,
    };

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| unverified(format!("cannot walk source: {}", e)))?;
        let relative: PathBuf = entry
            .path()
            .strip_prefix(src)
            .map(Path::to_path_buf)
            .map_err(|e| unverified(e.to_string()))?;

        if entry.file_type().is_symlink() {
            if fs::symlink_metadata(dst.join(&relative)).is_err() {
                return Err(unverified(format!("link {} is missing", relative.display())));
            }
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let expected = entry
            .metadata()
            .map_err(|e| unverified(format!("cannot stat {}: {}", entry.path().display(), e)))?
            .len();

        match fs::metadata(dst.join(&relative)) {
            Ok(meta) if meta.is_file() && meta.len() == expected => {}
            Ok(meta) if meta.is_file() => {
                return Err(unverified(format!(
                    "{} is {} bytes, expected {}",
                    relative.display(),
                    meta.len(),
                    expected
                )));
            }
            _ => {
                return Err(unverified(format!("{} is missing", relative.display())));
            }
        }
    }

    Ok(())
}
