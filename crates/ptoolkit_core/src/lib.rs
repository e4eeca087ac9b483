//! Core domain library for the prompt cataloger (codec, session, settings).

/// Tabular codec for the source and target tables.
pub mod codec;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Application error types.
pub mod error;
/// Source-table extraction from raw log exports.
pub mod extract;
/// Source rows and label models.
pub mod models;
/// Annotation session state and navigation.
pub mod session;
/// Persisted per-installation settings.
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{LABEL_HEADER, SOURCE_HEADER, UNSET_SENTINEL};
pub use error::AppError;
pub use models::{LabelField, LabelPair, LabelRow, SourceRow};
pub use session::{Advance, Session};
pub use settings::Settings;
