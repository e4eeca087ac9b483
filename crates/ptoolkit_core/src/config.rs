//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_HOME_DIR_NAME, DEFAULT_LANG, SETTINGS_FILE_NAME};
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the cataloger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding per-installation state.
    pub home_dir: PathBuf,
    /// Language used when the settings document has none.
    pub default_lang: String,
    /// Ignore remembered source/target paths for this run.
    pub forget_paths: bool,
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn resolve_home_dir<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(home) = non_blank(lookup, "HOME") {
        return Some(PathBuf::from(home));
    }
    if let Some(profile) = non_blank(lookup, "USERPROFILE") {
        return Some(PathBuf::from(profile));
    }
    if let (Some(drive), Some(path)) = (
        non_blank(lookup, "HOMEDRIVE"),
        non_blank(lookup, "HOMEPATH"),
    ) {
        return Some(PathBuf::from(format!("{}{}", drive, path)));
    }
    env::current_dir().ok()
}

fn expand_tilde<F>(path: String, lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if path == "~" {
        if let Some(home) = resolve_home_dir(lookup) {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir(lookup) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Arguments
    /// - `lookup`: Returns the value of a variable, or `None` when unset.
    ///
    /// # Returns
    /// A populated [`Config`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let home_dir = match non_blank(&lookup, "PTOOLKIT_HOME") {
            Some(dir) => expand_tilde(dir, &lookup),
            None => resolve_home_dir(&lookup)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_HOME_DIR_NAME),
        };
        let default_lang = non_blank(&lookup, "PTOOLKIT_LANG")
            .map(|lang| lang.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_LANG.to_string());
        let forget_paths = lookup("PTOOLKIT_FORGET_PATHS")
            .and_then(|value| parse_env_flag(&value))
            .unwrap_or(false);

        Self {
            home_dir,
            default_lang,
            forget_paths,
        }
    }

    /// Location of the settings document.
    pub fn settings_path(&self) -> PathBuf {
        self.home_dir.join(SETTINGS_FILE_NAME)
    }
}
