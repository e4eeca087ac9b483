//! Build a source table from a raw log export.
//!
//! The export is a JSON array of log documents. Each carries the request body
//! of an inference call as a JSON-encoded string; the prompt lives at
//! `params.prompt` inside it. Documents that do not follow that shape are
//! skipped, as are repeats of an already-seen prompt.

use crate::codec;
use crate::constants::{SOURCE_HEADER, SOURCE_ID_WIDTH};
use crate::error::AppError;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Counts reported after an extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub written: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
}

/// Render a scalar JSON value the way it appears in the table.
fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn prompt_of(doc: &Value) -> Option<String> {
    let body = doc.pointer("/act/data/request_body")?.as_str()?;
    let body: Value = serde_json::from_str(body).ok()?;
    body.pointer("/params/prompt").map(literal)
}

fn metadata_of(doc: &Value) -> Option<[String; 4]> {
    Some([
        literal(doc.get("@timestamp")?),
        literal(doc.get("block_num")?),
        literal(doc.get("block_id")?),
        literal(doc.get("trx_id")?),
    ])
}

/// Convert parsed export documents into source-table rows.
///
/// # Returns
/// The rows (with 1-based zero-padded ids) and the run summary.
pub fn extract_rows(docs: &[Value]) -> (Vec<Vec<String>>, ExtractSummary) {
    let mut summary = ExtractSummary::default();
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for (idx, doc) in docs.iter().enumerate() {
        let Some(prompt) = prompt_of(doc) else {
            summary.skipped_invalid += 1;
            continue;
        };
        if seen.contains(&prompt) {
            summary.skipped_duplicate += 1;
            continue;
        }
        let Some([timestamp, block_num, block_id, trx_id]) = metadata_of(doc) else {
            tracing::warn!(document = idx, "export document lacks block metadata, skipping");
            summary.skipped_invalid += 1;
            continue;
        };
        seen.insert(prompt.clone());

        let id = format!("{:0width$}", rows.len() + 1, width = SOURCE_ID_WIDTH);
        rows.push(vec![id, timestamp, prompt, block_num, block_id, trx_id]);
    }

    summary.written = rows.len();
    (rows, summary)
}

/// Read an export from `input` and write the source table to `output`.
///
/// # Errors
/// - [`AppError::NotFound`] if `input` does not exist.
/// - [`AppError::Extract`] if `input` is unreadable or not a JSON array.
/// - [`AppError::Persistence`] if `output` cannot be written.
pub fn json_to_csv(input: &Path, output: &Path) -> Result<ExtractSummary, AppError> {
    let text = std::fs::read_to_string(input).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(input.to_path_buf())
        } else {
            AppError::Extract(format!("{}: {}", input.display(), err))
        }
    })?;
    let docs: Vec<Value> = serde_json::from_str(&text)
        .map_err(|err| AppError::Extract(format!("{}: {}", input.display(), err)))?;

    let (rows, summary) = extract_rows(&docs);
    codec::encode_table(output, &SOURCE_HEADER, rows)?;
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        written = summary.written,
        skipped_invalid = summary.skipped_invalid,
        skipped_duplicate = summary.skipped_duplicate,
        "extracted source table"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::{extract_rows, json_to_csv, ExtractSummary};
    use crate::codec;
    use crate::error::AppError;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn doc(prompt: &str, block: u64) -> Value {
        json!({
            "@timestamp": "2024-05-01T12:00:00.000Z",
            "act": { "data": { "request_body": json!({ "params": { "prompt": prompt } }).to_string() } },
            "block_num": block,
            "block_id": format!("blk{}", block),
            "trx_id": format!("trx{}", block),
        })
    }

    #[test]
    fn duplicates_and_malformed_bodies_are_skipped() {
        let docs = vec![
            doc("a cat", 10),
            json!({ "act": { "data": { "request_body": "not json" } } }),
            doc("a cat", 11),
            json!({ "act": { "data": { "request_body": "{\"params\": {}}" } } }),
            doc("a dog", 12),
        ];
        let (rows, summary) = extract_rows(&docs);

        assert_eq!(
            summary,
            ExtractSummary {
                written: 2,
                skipped_invalid: 2,
                skipped_duplicate: 1,
            }
        );
        assert_eq!(
            rows[0],
            vec![
                "0000000001",
                "2024-05-01T12:00:00.000Z",
                "a cat",
                "10",
                "blk10",
                "trx10"
            ]
        );
        assert_eq!(rows[1][0], "0000000002");
        assert_eq!(rows[1][2], "a dog");
    }

    #[test]
    fn missing_metadata_is_skipped() {
        let mut incomplete = doc("lonely", 1);
        incomplete
            .as_object_mut()
            .expect("object")
            .remove("trx_id");
        let (rows, summary) = extract_rows(&[incomplete, doc("fine", 2)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "0000000001");
        assert_eq!(summary.skipped_invalid, 1);
    }

    #[test]
    fn json_to_csv_writes_source_table() {
        let dir = TempDir::new().expect("temp dir");
        let input = dir.path().join("export.json");
        let output = dir.path().join("source.csv");
        let docs = Value::Array(vec![doc("line one\nline, two", 7)]);
        std::fs::write(&input, docs.to_string()).expect("seed");

        let summary = json_to_csv(&input, &output).expect("extract");
        assert_eq!(summary.written, 1);

        let text = std::fs::read_to_string(&output).expect("read output");
        assert!(text.starts_with("ID,Timestamp,Prompt,Block Number,Block ID,Transaction ID\n"));
        let rows = codec::decode(&output).expect("decode");
        assert_eq!(rows[0][2], "line one\nline, two");
    }

    #[test]
    fn json_to_csv_rejects_non_array_input() {
        let dir = TempDir::new().expect("temp dir");
        let input = dir.path().join("export.json");
        std::fs::write(&input, "{\"hits\": []}").expect("seed");
        assert!(matches!(
            json_to_csv(&input, &dir.path().join("out.csv")),
            Err(AppError::Extract(_))
        ));
        assert!(matches!(
            json_to_csv(&dir.path().join("absent.json"), &dir.path().join("out.csv")),
            Err(AppError::NotFound(_))
        ));
    }
}
