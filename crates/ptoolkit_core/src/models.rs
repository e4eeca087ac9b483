//! Source rows and label models.
//!
//! Unset label fields are `None` in memory; the `-1` sentinel only exists at
//! the serialization boundary (`to_fields` / `parse_target_row`).

use crate::constants::{LABEL_HEADER, UNSET_SENTINEL};
use crate::error::AppError;
use std::fmt;
use std::str::FromStr;

/// One prompt of the source dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub id: String,
    pub timestamp: String,
    pub prompt: String,
    pub block_number: String,
    pub block_id: String,
    pub transaction_id: String,
}

impl SourceRow {
    /// Map a decoded tuple positionally onto a source row.
    ///
    /// # Arguments
    /// - `line`: 1-based data row number, used for error reporting.
    /// - `fields`: Decoded fields in source column order.
    ///
    /// # Errors
    /// Returns [`AppError::SourceLoad`] if fewer than six fields are present.
    pub fn from_fields(line: usize, fields: Vec<String>) -> Result<Self, AppError> {
        let found = fields.len();
        let mut fields = fields.into_iter();
        let mut next = || {
            fields.next().ok_or_else(|| {
                AppError::SourceLoad(format!(
                    "row {} has {} fields, expected at least 6",
                    line, found
                ))
            })
        };
        Ok(Self {
            id: next()?,
            timestamp: next()?,
            prompt: next()?,
            block_number: next()?,
            block_id: next()?,
            transaction_id: next()?,
        })
    }
}

/// Which half of a [`LabelPair`] an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelField {
    /// Continuous `[0, 1]` score, the `NSFW` column.
    Sensitivity,
    /// Binary flag, the `MI` column.
    MinorInvolved,
}

impl LabelField {
    /// Column name in the target table.
    pub fn column(self) -> &'static str {
        match self {
            LabelField::Sensitivity => LABEL_HEADER[2],
            LabelField::MinorInvolved => LABEL_HEADER[3],
        }
    }
}

impl fmt::Display for LabelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for LabelField {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nsfw" | "sensitivity" | "s" => Ok(LabelField::Sensitivity),
            "mi" | "minor" | "minor_involved" | "m" => Ok(LabelField::MinorInvolved),
            other => Err(AppError::InvalidLabel(format!("unknown label field {:?}", other))),
        }
    }
}

/// Labels attached to one source row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LabelPair {
    pub sensitivity: Option<f64>,
    pub minor_involved: Option<bool>,
}

impl LabelPair {
    /// Both fields unset.
    pub const UNSET: LabelPair = LabelPair {
        sensitivity: None,
        minor_involved: None,
    };

    pub fn new(sensitivity: Option<f64>, minor_involved: Option<bool>) -> Self {
        Self {
            sensitivity,
            minor_involved,
        }
    }

    /// True when neither field has been labeled.
    pub fn is_unset(&self) -> bool {
        self.sensitivity.is_none() && self.minor_involved.is_none()
    }

    /// Validate `value` for `field` and store it.
    ///
    /// `None` clears the field. Sensitivity must lie in `[0, 1]`;
    /// minor-involvement must be exactly `0` or `1`.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidLabel`] and leaves `self` untouched when the
    /// value is outside the field's domain.
    pub fn set(&mut self, field: LabelField, value: Option<f64>) -> Result<(), AppError> {
        match field {
            LabelField::Sensitivity => {
                self.sensitivity = value.map(validate_sensitivity).transpose()?;
            }
            LabelField::MinorInvolved => {
                self.minor_involved = value.map(validate_minor_involved).transpose()?;
            }
        }
        Ok(())
    }

    /// Storage encoding of the pair: `(NSFW, MI)` with `-1` for unset.
    pub fn to_fields(&self) -> (String, String) {
        let sensitivity = match self.sensitivity {
            Some(value) => value.to_string(),
            None => UNSET_SENTINEL.to_string(),
        };
        let minor = match self.minor_involved {
            Some(true) => "1".to_string(),
            Some(false) => "0".to_string(),
            None => UNSET_SENTINEL.to_string(),
        };
        (sensitivity, minor)
    }
}

fn validate_sensitivity(value: f64) -> Result<f64, AppError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        // Folds -0.0 so it is stored as `0`, never `-0`.
        Ok(value.abs())
    } else {
        Err(AppError::InvalidLabel(format!(
            "sensitivity must be within [0, 1], got {}",
            value
        )))
    }
}

fn validate_minor_involved(value: f64) -> Result<bool, AppError> {
    if value == 0.0 {
        Ok(false)
    } else if value == 1.0 {
        Ok(true)
    } else {
        Err(AppError::InvalidLabel(format!(
            "minor-involvement must be 0 or 1, got {}",
            value
        )))
    }
}

/// Parse the trailing `(NSFW, MI)` fields of a persisted target row.
///
/// # Arguments
/// - `line`: 1-based file line of the row (header is line 1).
/// - `fields`: All decoded fields of the row.
///
/// # Errors
/// Returns [`AppError::CorruptTarget`] when the row is too short or either
/// field is non-numeric or outside its domain (other than `-1`).
pub fn parse_target_row(line: u64, fields: &[String]) -> Result<LabelPair, AppError> {
    let corrupt = |column: &'static str, value: &str| AppError::CorruptTarget {
        line,
        column,
        value: value.to_string(),
    };
    let [.., raw_sensitivity, raw_minor] = fields else {
        return Err(corrupt(LABEL_HEADER[2], &fields.join(",")));
    };

    let sensitivity: f64 = raw_sensitivity
        .trim()
        .parse()
        .map_err(|_| corrupt(LABEL_HEADER[2], raw_sensitivity))?;
    let sensitivity = if sensitivity == -1.0 {
        None
    } else if (0.0..=1.0).contains(&sensitivity) {
        Some(sensitivity)
    } else {
        return Err(corrupt(LABEL_HEADER[2], raw_sensitivity));
    };

    let minor: i64 = raw_minor
        .trim()
        .parse()
        .map_err(|_| corrupt(LABEL_HEADER[3], raw_minor))?;
    let minor_involved = match minor {
        -1 => None,
        0 => Some(false),
        1 => Some(true),
        _ => return Err(corrupt(LABEL_HEADER[3], raw_minor)),
    };

    Ok(LabelPair::new(sensitivity, minor_involved))
}

/// A persisted target row: source identity plus its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRow {
    pub id: String,
    pub prompt: String,
    pub labels: LabelPair,
}

impl LabelRow {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, labels: LabelPair) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            labels,
        }
    }

    /// Fields in `ID,Prompt,NSFW,MI` order.
    pub fn to_fields(&self) -> Vec<String> {
        let (sensitivity, minor) = self.labels.to_fields();
        vec![self.id.clone(), self.prompt.clone(), sensitivity, minor]
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_target_row, LabelField, LabelPair, SourceRow};
    use crate::error::AppError;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn source_row_maps_fields_positionally() {
        let row = SourceRow::from_fields(
            1,
            strings(&["0000000001", "2024-01-01T00:00:00Z", "hello", "42", "blk", "trx"]),
        )
        .expect("row");
        assert_eq!(row.id, "0000000001");
        assert_eq!(row.prompt, "hello");
        assert_eq!(row.transaction_id, "trx");
    }

    #[test]
    fn short_source_row_is_source_load_error() {
        let result = SourceRow::from_fields(3, strings(&["1", "ts", "prompt"]));
        match result {
            Err(AppError::SourceLoad(message)) => assert!(message.contains("row 3")),
            other => panic!("expected source load error, got {:?}", other),
        }
    }

    #[test]
    fn set_rejects_out_of_range_without_mutation() {
        let mut pair = LabelPair::new(Some(0.25), Some(false));
        for bad in [1.5, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                pair.set(LabelField::Sensitivity, Some(bad)),
                Err(AppError::InvalidLabel(_))
            ));
        }
        assert!(matches!(
            pair.set(LabelField::MinorInvolved, Some(0.5)),
            Err(AppError::InvalidLabel(_))
        ));
        assert_eq!(pair, LabelPair::new(Some(0.25), Some(false)));
    }

    #[test]
    fn set_accepts_bounds_and_clears_with_none() {
        let mut pair = LabelPair::UNSET;
        pair.set(LabelField::Sensitivity, Some(1.0)).expect("upper bound");
        pair.set(LabelField::MinorInvolved, Some(1.0)).expect("flag");
        assert_eq!(pair, LabelPair::new(Some(1.0), Some(true)));

        pair.set(LabelField::Sensitivity, None).expect("clear");
        assert_eq!(pair.sensitivity, None);
        assert!(!pair.is_unset());
    }

    #[test]
    fn negative_zero_sensitivity_is_stored_as_zero() {
        let mut pair = LabelPair::UNSET;
        pair.set(LabelField::Sensitivity, Some(-0.0)).expect("zero");
        assert_eq!(pair.to_fields().0, "0");
    }

    #[test]
    fn unset_fields_serialize_as_sentinel() {
        assert_eq!(
            LabelPair::UNSET.to_fields(),
            ("-1".to_string(), "-1".to_string())
        );
        assert_eq!(
            LabelPair::new(Some(0.5), Some(false)).to_fields(),
            ("0.5".to_string(), "0".to_string())
        );
    }

    #[test]
    fn parse_target_row_reads_sentinels_and_values() {
        let pair = parse_target_row(2, &strings(&["0001", "a", "0.75", "-1"])).expect("parse");
        assert_eq!(pair, LabelPair::new(Some(0.75), None));

        let pair = parse_target_row(3, &strings(&["0002", "b", "-1", "1"])).expect("parse");
        assert_eq!(pair, LabelPair::new(None, Some(true)));
    }

    #[test]
    fn parse_target_row_refuses_non_numeric_labels() {
        match parse_target_row(4, &strings(&["0003", "c", "spicy", "0"])) {
            Err(AppError::CorruptTarget {
                line,
                column,
                value,
            }) => {
                assert_eq!(line, 4);
                assert_eq!(column, "NSFW");
                assert_eq!(value, "spicy");
            }
            other => panic!("expected corrupt target, got {:?}", other),
        }
        assert!(matches!(
            parse_target_row(5, &strings(&["0004", "d", "0.1", "yes"])),
            Err(AppError::CorruptTarget { column: "MI", .. })
        ));
        assert!(matches!(
            parse_target_row(6, &strings(&["0005", "e", "0.1", "2"])),
            Err(AppError::CorruptTarget { column: "MI", .. })
        ));
    }

    #[test]
    fn label_field_parses_aliases() {
        assert_eq!("NSFW".parse::<LabelField>().expect("nsfw"), LabelField::Sensitivity);
        assert_eq!("mi".parse::<LabelField>().expect("mi"), LabelField::MinorInvolved);
        assert!("colour".parse::<LabelField>().is_err());
    }
}
