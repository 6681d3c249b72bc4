//! Run configuration: where user folders live and where profiles go
//!
//! Resolved once at startup from, in increasing priority:
//! - built-in platform defaults
//! - a JSON file (`$PROFILE_MOVER_CONFIG`, else `<config dir>/profile-mover/config.json`)
//! - `PROFILE_MOVER_*` environment variables

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::profile::paths::UserPaths;

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "PROFILE_MOVER_CONFIG";
pub const BASE_DIR_ENV: &str = "PROFILE_MOVER_BASE_DIR";
pub const CACHE_PATH_ENV: &str = "PROFILE_MOVER_CACHE_PATH";
pub const PROFILE_PATH_ENV: &str = "PROFILE_MOVER_PROFILE_PATH";
pub const TARGET_DIR_ENV: &str = "PROFILE_MOVER_TARGET_DIR";
pub const VERIFY_COPY_ENV: &str = "PROFILE_MOVER_VERIFY_COPY";

/// Paths and switches shared by every step of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one folder per user
    pub base_dir: PathBuf,
    /// Cache directory, relative to a user folder
    pub relative_cache_path: PathBuf,
    /// Profile data directory, relative to a user folder
    pub relative_profile_path: PathBuf,
    /// Directory receiving the relocated profiles, one folder per user
    pub target_root: PathBuf,
    /// Check the copy before deleting the original profile
    pub verify_copy: bool,
}

/// On-disk form of [`Config`]; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub base_dir: Option<PathBuf>,
    pub relative_cache_path: Option<PathBuf>,
    pub relative_profile_path: Option<PathBuf>,
    pub target_root: Option<PathBuf>,
    pub verify_copy: Option<bool>,
}

impl Default for Config {
    /// Platform defaults
    /// - Windows: C:\Users\<user>\AppData\Local\Google\Chrome\User Data -> E:\ChromeProfiles\<user>
    /// - macOS: /Users/<user>/Library/Application Support/Google/Chrome -> /Users/Shared/ChromeProfiles/<user>
    /// - Linux: /home/<user>/.config/google-chrome -> /srv/chrome-profiles/<user>
    fn default() -> Self {
        #[cfg(target_os = "windows")]
        {
            Self {
                base_dir: PathBuf::from(r"C:\Users"),
                relative_cache_path: PathBuf::from(
                    r"AppData\Local\Google\Chrome\User Data\Default\Cache",
                ),
                relative_profile_path: PathBuf::from(r"AppData\Local\Google\Chrome\User Data"),
                target_root: PathBuf::from(r"E:\ChromeProfiles"),
                verify_copy: false,
            }
        }

        #[cfg(target_os = "macos")]
        {
            Self {
                base_dir: PathBuf::from("/Users"),
                relative_cache_path: Path::new("Library")
                    .join("Caches")
                    .join("Google")
                    .join("Chrome")
                    .join("Default")
                    .join("Cache"),
                relative_profile_path: Path::new("Library")
                    .join("Application Support")
                    .join("Google")
                    .join("Chrome"),
                target_root: PathBuf::from("/Users/Shared/ChromeProfiles"),
                verify_copy: false,
            }
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            Self {
                base_dir: PathBuf::from("/home"),
                relative_cache_path: Path::new(".cache")
                    .join("google-chrome")
                    .join("Default")
                    .join("Cache"),
                relative_profile_path: Path::new(".config").join("google-chrome"),
                target_root: PathBuf::from("/srv/chrome-profiles"),
                verify_copy: false,
            }
        }
    }
}

impl Config {
    /// Resolve the configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration using `lookup` for environment variables
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let file = match lookup(CONFIG_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            Some(path) => Some(PathBuf::from(path)),
            None => default_config_file().filter(|p| p.exists()),
        };
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "loading config file");
            config.apply_file(ConfigFile::read(&path)?);
        }

        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Overlay the fields present in a config file
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(base_dir) = file.base_dir {
            self.base_dir = base_dir;
        }
        if let Some(cache) = file.relative_cache_path {
            self.relative_cache_path = cache;
        }
        if let Some(profile) = file.relative_profile_path {
            self.relative_profile_path = profile;
        }
        if let Some(target) = file.target_root {
            self.target_root = target;
        }
        if let Some(verify) = file.verify_copy {
            self.verify_copy = verify;
        }
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(BASE_DIR_ENV) {
            self.base_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty(CACHE_PATH_ENV) {
            self.relative_cache_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty(PROFILE_PATH_ENV) {
            self.relative_profile_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty(TARGET_DIR_ENV) {
            self.target_root = PathBuf::from(v);
        }
        if let Some(v) = non_empty(VERIFY_COPY_ENV) {
            self.verify_copy = parse_bool(&v)
                .with_context(|| format!("Invalid value for {}", VERIFY_COPY_ENV))?;
        }
        Ok(())
    }

    /// Derive the cache, profile and target paths for one user
    pub fn user_paths(&self, user: &str) -> UserPaths {
        let user_dir = self.base_dir.join(user);
        UserPaths {
            cache: user_dir.join(&self.relative_cache_path),
            profile: user_dir.join(&self.relative_profile_path),
            target: self.target_root.join(user),
        }
    }
}

impl ConfigFile {
    /// Read and parse a JSON config file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

/// Get the default config file location
/// - macOS: ~/Library/Application Support/profile-mover/config.json
/// - Linux: ~/.config/profile-mover/config.json
/// - Windows: %APPDATA%/profile-mover/config.json
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("profile-mover").join("config.json"))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}
