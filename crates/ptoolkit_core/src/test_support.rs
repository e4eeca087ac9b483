//! Shared test-only helpers for ptoolkit_core.

use crate::codec;
use crate::constants::SOURCE_HEADER;
use std::path::PathBuf;
use tempfile::TempDir;

/// Source and target paths inside an isolated temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the files.
pub(crate) struct Fixture {
    pub dir: TempDir,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Write a source table with one row per `(id, prompt)` pair.
///
/// # Panics
/// Panics if the temp dir or the source file cannot be created.
pub(crate) fn source_fixture(prompts: &[(&str, &str)]) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let source = dir.path().join("source.csv");
    let target = dir.path().join("target.csv");
    let rows = prompts.iter().enumerate().map(|(idx, (id, prompt))| {
        vec![
            id.to_string(),
            format!("2024-05-0{}T12:00:00.000Z", idx % 9 + 1),
            prompt.to_string(),
            (1000 + idx).to_string(),
            format!("block-{}", idx),
            format!("trx-{}", idx),
        ]
    });
    codec::encode_table(&source, &SOURCE_HEADER, rows).expect("write source fixture");
    Fixture {
        dir,
        source,
        target,
    }
}

/// The three-prompt dataset `[(0001,"a"),(0002,"b"),(0003,"c")]`.
pub(crate) fn abc_fixture() -> Fixture {
    source_fixture(&[("0001", "a"), ("0002", "b"), ("0003", "c")])
}

/// Raw target file text, for byte-level assertions.
pub(crate) fn read_target(fixture: &Fixture) -> String {
    std::fs::read_to_string(&fixture.target).expect("read target")
}

/// Decoded target rows.
pub(crate) fn target_rows(fixture: &Fixture) -> Vec<Vec<String>> {
    codec::decode(&fixture.target).expect("decode target")
}
