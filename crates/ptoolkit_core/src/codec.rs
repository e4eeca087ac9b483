//! Header-first delimited tables on disk.
//!
//! The codec is stateless and string-typed: decoding yields every data row as
//! a vector of fields in column order and encoding writes literal strings.
//! Numeric interpretation belongs to the session.

use crate::constants::LABEL_HEADER;
use crate::error::AppError;
use crate::models::LabelRow;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// One decoded data row, fields in header order.
pub type Record = Vec<String>;

fn format_error(path: &Path, err: csv::Error) -> AppError {
    match err.position() {
        Some(pos) => AppError::Format(format!(
            "{} (line {}): {}",
            path.display(),
            pos.line(),
            err
        )),
        None => AppError::Format(format!("{}: {}", path.display(), err)),
    }
}

/// Decode a header-first table.
///
/// The header only establishes the column count; its names are discarded.
///
/// # Returns
/// Data rows in file order. A header-only file yields an empty vector.
///
/// # Errors
/// - [`AppError::NotFound`] when `path` does not exist.
/// - [`AppError::Format`] when the file is unreadable, has no header row, or a
///   row's field count differs from the header's.
pub fn decode(path: &Path) -> Result<Vec<Record>, AppError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(path.to_path_buf()));
        }
        Err(err) => {
            return Err(AppError::Format(format!(
                "{}: unreadable: {}",
                path.display(),
                err
            )));
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);
    let header_len = reader
        .headers()
        .map_err(|err| format_error(path, err))?
        .len();
    if header_len == 0 {
        return Err(AppError::Format(format!(
            "{}: missing header row",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| format_error(path, err))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    tracing::trace!(path = %path.display(), rows = rows.len(), "decoded table");
    Ok(rows)
}

/// Replace `path` with freshly written content.
///
/// Content goes to a temporary sibling which is renamed over the target once
/// fully flushed, so readers never observe a half-written file.
///
/// # Errors
/// Returns [`AppError::Persistence`] if the temporary file cannot be created,
/// written, synced, or renamed.
pub fn replace_file<F>(path: &Path, write: F) -> Result<(), AppError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let persistence = |err: io::Error| {
        AppError::Persistence(format!("{}: {}", path.display(), err))
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(persistence)?;
    write(&mut tmp).map_err(persistence)?;
    tmp.flush().map_err(persistence)?;
    match std::fs::metadata(path) {
        Ok(existing) => tmp
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(persistence)?,
        Err(_) => set_new_file_permissions(tmp.as_file()).map_err(persistence)?,
    }
    tmp.as_file().sync_all().map_err(persistence)?;
    tmp.persist(path).map_err(|err| persistence(err.error))?;
    Ok(())
}

/// Temp files start owner-only; a new table gets the usual `rw-r--r--`.
#[cfg(unix)]
fn set_new_file_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_new_file_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Encode a table with an explicit header row.
///
/// # Arguments
/// - `path`: Destination; overwritten if present.
/// - `header`: Column names.
/// - `rows`: Data rows, each a sequence of string-like fields.
///
/// # Errors
/// Returns [`AppError::Persistence`] if writing fails.
pub fn encode_table<I, R, S>(path: &Path, header: &[&str], rows: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    replace_file(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()
    })
}

/// Encode label rows under the canonical `ID,Prompt,NSFW,MI` header.
///
/// # Errors
/// Returns [`AppError::Persistence`] if writing fails.
pub fn encode_labels(path: &Path, rows: &[LabelRow]) -> Result<(), AppError> {
    encode_table(path, &LABEL_HEADER, rows.iter().map(LabelRow::to_fields))
}
