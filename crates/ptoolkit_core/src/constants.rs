//! Shared constants used across ptoolkit crates.

/// Header row of the source table produced by the extraction filter.
pub const SOURCE_HEADER: [&str; 6] = [
    "ID",
    "Timestamp",
    "Prompt",
    "Block Number",
    "Block ID",
    "Transaction ID",
];

/// Header row of the target (label) table.
pub const LABEL_HEADER: [&str; 4] = ["ID", "Prompt", "NSFW", "MI"];

/// Storage encoding of an unset label field.
pub const UNSET_SENTINEL: &str = "-1";

/// Width of the zero-padded prompt ordinal written to the `ID` column.
pub const SOURCE_ID_WIDTH: usize = 10;

/// File name of the settings document inside the ptoolkit home directory.
pub const SETTINGS_FILE_NAME: &str = "cataloger.json";

/// Directory name under the user's home used when `PTOOLKIT_HOME` is unset.
pub const DEFAULT_HOME_DIR_NAME: &str = ".ptoolkit";

/// UI language used when neither settings nor environment choose one.
pub const DEFAULT_LANG: &str = "en";
