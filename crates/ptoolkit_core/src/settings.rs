//! Remembered file locations and language, one document per installation.

use crate::codec::replace_file;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// Values remembered between runs so the reviewer is not re-prompted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_lang: Option<String>,
}

impl Settings {
    /// Read settings from `path`.
    ///
    /// A missing file means no prior settings. An unreadable or malformed
    /// document is logged and also treated as empty.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), "failed to read settings: {}", err);
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring malformed settings: {}", err);
                Self::default()
            }
        }
    }

    /// Write settings to `path`, creating its directory when needed.
    ///
    /// # Errors
    /// Returns [`AppError::Settings`] if the directory or file cannot be
    /// written.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                AppError::Settings(format!("{}: {}", parent.display(), err))
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Settings(format!("encode: {}", err)))?;
        replace_file(path, |out| {
            out.write_all(json.as_bytes())?;
            out.write_all(b"\n")
        })
        .map_err(|err| AppError::Settings(err.to_string()))?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        assert_eq!(
            Settings::load(&dir.path().join("cataloger.json")),
            Settings::default()
        );
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cataloger.json");
        std::fs::write(&path, "{ not json").expect("seed");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(".ptoolkit").join("cataloger.json");
        let settings = Settings {
            last_source: Some("/data/source.csv".to_string()),
            last_target: Some("/data/target.csv".to_string()),
            last_lang: Some("es".to_string()),
        };
        settings.save(&path).expect("save");
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn unknown_keys_are_ignored_and_partial_documents_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cataloger.json");
        std::fs::write(&path, r#"{"last_lang": "en", "window": [800, 600]}"#).expect("seed");
        let settings = Settings::load(&path);
        assert_eq!(settings.last_lang.as_deref(), Some("en"));
        assert!(settings.last_source.is_none());
    }
}
