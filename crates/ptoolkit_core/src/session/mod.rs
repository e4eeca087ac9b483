//! Annotation session: reconciles the read-only source dataset with the
//! growing target dataset and persists on every navigation step.
//!
//! Invariants held between calls:
//! - `cursor < sources.len()` (the source is never empty).
//! - `labels.len() >= cursor + 1`; labels are extended, never truncated.
//! - `labels[i]` belongs to `sources[i]`; position is the only linkage.

use crate::codec;
use crate::error::AppError;
use crate::models::{parse_target_row, LabelField, LabelPair, LabelRow, SourceRow};
use std::path::{Path, PathBuf};


/// Outcome of [`Session::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved one row.
    Moved,
    /// The cursor was already at the first/last row; only the save happened.
    AtBoundary,
}

/// Review state for one source/target pair.
#[derive(Debug)]
pub struct Session {
    source_path: PathBuf,
    target_path: PathBuf,
    sources: Vec<SourceRow>,
    labels: Vec<LabelPair>,
    cursor: usize,
}

fn load_sources(path: &Path) -> Result<Vec<SourceRow>, AppError> {
    let records = codec::decode(path).map_err(|err| match err {
        AppError::NotFound(path) => {
            AppError::SourceLoad(format!("{} does not exist", path.display()))
        }
        AppError::Format(message) => AppError::SourceLoad(message),
        other => other,
    })?;
    if records.is_empty() {
        return Err(AppError::SourceLoad(format!(
            "{} contains no prompts",
            path.display()
        )));
    }

    records
        .into_iter()
        .enumerate()
        .map(|(idx, fields)| SourceRow::from_fields(idx + 1, fields))
        .collect()
}

fn load_labels(path: &Path, sources: &[SourceRow]) -> Result<Vec<LabelPair>, AppError> {
    let records = match codec::decode(path) {
        Ok(records) => records,
        Err(AppError::NotFound(_)) => {
            tracing::info!(path = %path.display(), "no target dataset yet, starting fresh");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err),
    };

    if records.len() > sources.len() {
        return Err(AppError::CorruptTarget {
            line: sources.len() as u64 + 2,
            column: "ID",
            value: records[sources.len()].first().cloned().unwrap_or_default(),
        });
    }

    // Parse into a scratch vector so a corrupt row leaves nothing behind.
    let mut labels = Vec::with_capacity(records.len());
    for (idx, fields) in records.iter().enumerate() {
        let line = idx as u64 + 2;
        labels.push(parse_target_row(line, fields)?);

        let source_id = &sources[idx].id;
        if fields.first() != Some(source_id) {
            tracing::warn!(
                line,
                target_id = fields.first().map(String::as_str).unwrap_or_default(),
                source_id = source_id.as_str(),
                "target row id differs from source row at the same position"
            );
        }
    }
    Ok(labels)
}

impl Session {
    /// Open a session over `source` and resume from `target`.
    ///
    /// The cursor lands on the first unlabeled row, or on the last row when
    /// the target already covers the whole source.
    ///
    /// # Returns
    /// A positioned [`Session`].
    ///
    /// # Errors
    /// - [`AppError::SourceLoad`] if the source is missing, malformed, or empty.
    /// - [`AppError::CorruptTarget`] if a persisted label does not parse or the
    ///   target holds more rows than the source.
    /// - [`AppError::Format`] if the target exists but is not a readable table.
    pub fn open(source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<Self, AppError> {
        let source_path = source.as_ref().to_path_buf();
        let target_path = target.as_ref().to_path_buf();

        let sources = load_sources(&source_path)?;
        let mut labels = load_labels(&target_path, &sources)?;
        let persisted = labels.len();

        let cursor = persisted.min(sources.len() - 1);
        if labels.len() < cursor + 1 {
            labels.resize(cursor + 1, LabelPair::UNSET);
        }

        tracing::info!(
            source = %source_path.display(),
            target = %target_path.display(),
            total = sources.len(),
            persisted,
            cursor,
            "opened annotation session"
        );

        Ok(Self {
            source_path,
            target_path,
            sources,
            labels,
            cursor,
        })
    }

    /// The prompt under the cursor.
    pub fn current_prompt(&self) -> &SourceRow {
        &self.sources[self.cursor]
    }

    /// The labels under the cursor.
    pub fn current_labels(&self) -> LabelPair {
        self.labels[self.cursor]
    }

    /// Validate and store one label field of the current row.
    ///
    /// # Arguments
    /// - `field`: Which label to edit.
    /// - `value`: New value, or `None` to mark it unset.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidLabel`] for out-of-domain values; the stored
    /// pair is left unchanged in that case.
    pub fn set_label(&mut self, field: LabelField, value: Option<f64>) -> Result<(), AppError> {
        self.labels[self.cursor].set(field, value)?;
        tracing::debug!(cursor = self.cursor, %field, ?value, "label updated");
        Ok(())
    }

    /// Save the visited prefix, then move one row.
    ///
    /// At either boundary the save still happens and the cursor stays put.
    ///
    /// # Returns
    /// Whether the cursor moved.
    ///
    /// # Errors
    /// Returns [`AppError::Persistence`] if the save fails; the cursor does
    /// not move in that case.
    pub fn advance(&mut self, forward: bool) -> Result<Advance, AppError> {
        self.persist(self.cursor + 1)?;

        if forward && self.cursor + 1 < self.sources.len() {
            self.cursor += 1;
            if self.labels.len() <= self.cursor {
                self.labels.push(LabelPair::UNSET);
            }
            Ok(Advance::Moved)
        } else if !forward && self.cursor > 0 {
            self.cursor -= 1;
            Ok(Advance::Moved)
        } else {
            Ok(Advance::AtBoundary)
        }
    }

    /// Flush every known label to the target without moving.
    ///
    /// Unlike [`Session::advance`], which writes only rows `0..=cursor`, this
    /// also keeps rows labeled past the cursor before a retreat. Used on exit.
    ///
    /// # Errors
    /// Returns [`AppError::Persistence`] if the target cannot be written.
    pub fn save(&self) -> Result<(), AppError> {
        self.persist(self.labels.len())
    }

    fn persist(&self, count: usize) -> Result<(), AppError> {
        let rows = self.label_rows(count);
        codec::encode_labels(&self.target_path, &rows)?;
        tracing::debug!(
            rows = rows.len(),
            target = %self.target_path.display(),
            "saved target dataset"
        );
        Ok(())
    }

    /// The first `count` label pairs joined with their source identity.
    pub fn label_rows(&self, count: usize) -> Vec<LabelRow> {
        self.sources
            .iter()
            .zip(&self.labels)
            .take(count)
            .map(|(source, labels)| LabelRow::new(&source.id, &source.prompt, *labels))
            .collect()
    }

    /// `(cursor + 1, total rows)` for display.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor + 1, self.sources.len())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of source rows.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Always false: opening rejects an empty source.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Target labels known so far, including the unset pair under the cursor.
    pub fn labels(&self) -> &[LabelPair] {
        &self.labels
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}
