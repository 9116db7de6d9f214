use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// All failure modes of the loading / aggregation / colorizing pipeline.
///
/// `Schema` and `Column` carry the list of columns that *are* present so the
/// presentation layer can show a useful diagnostic without re-reading the
/// file.
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be opened or read at all.
    #[error("could not read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every (encoding, delimiter) hypothesis failed to produce a table.
    #[error(
        "no encoding/delimiter combination parsed '{}' ({attempts} attempts); last failure: {last}",
        .path.display()
    )]
    Encoding {
        path: PathBuf,
        attempts: usize,
        /// The last underlying decode or parse failure, rendered as text.
        last: String,
    },

    /// A column the caller declared as required is missing after header
    /// trimming.
    #[error("required column '{column}' not found; file has: {}", .available.join(", "))]
    Schema {
        column: String,
        available: Vec<String>,
    },

    /// A cell in a declared numeric column could not be coerced.
    #[error("column '{column}', row {row}: cannot parse '{value}' as a number")]
    DataFormat {
        column: String,
        row: usize,
        value: String,
    },

    /// An aggregation referenced a column the table does not have.
    #[error("unknown column '{column}'; table has: {}", .available.join(", "))]
    Column {
        column: String,
        available: Vec<String>,
    },

    /// An argument was out of range (bad encoding label, opacity floor
    /// outside [0, 1], ...).
    #[error("invalid argument: {0}")]
    Value(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_available_columns() {
        let err = Error::Schema {
            column: "사용일자".to_string(),
            available: vec!["region".to_string(), "pop".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("사용일자"));
        assert!(msg.contains("region, pop"));
    }

    #[test]
    fn encoding_error_carries_the_last_failure() {
        let err = Error::Encoding {
            path: PathBuf::from("data.csv"),
            attempts: 6,
            last: "EUC-KR: undecodable byte sequence".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("6 attempts"));
        assert!(msg.contains("undecodable"));
    }
}
