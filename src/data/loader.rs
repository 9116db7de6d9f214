use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::Encoding;
use log::{debug, info};

use super::model::{ColumnSpec, NumericColumns, Table, Value};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// Configuration for one loading call site.
///
/// `encodings` and `delimiters` are *priority-ordered* hypothesis lists: the
/// loader tries every delimiter for the first encoding, then moves to the
/// next encoding, and accepts the first combination that decodes cleanly and
/// parses into at least one column.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Encoding labels, tried in order. WHATWG labels plus the `cp949` alias.
    pub encodings: Vec<String>,
    /// Delimiter bytes, tried in order for each encoding.
    pub delimiters: Vec<u8>,
    /// Columns to normalize/coerce after parsing.
    pub columns: ColumnSpec,
}

impl Default for LoadOptions {
    fn default() -> Self {
        // The order the source files are most commonly found in: Korean
        // government exports first, then UTF-8. A UTF-8 BOM is stripped by
        // the decoder, so no separate "utf-8-sig" entry is needed.
        Self {
            encodings: vec!["cp949".to_string(), "utf-8".to_string()],
            delimiters: vec![b',', b';', b'\t'],
            columns: ColumnSpec::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a delimited text file of unknown encoding/delimiter into a [`Table`].
///
/// The whole file is read once; each (encoding, delimiter) hypothesis decodes
/// and parses it in memory. On success the column spec is applied: the
/// date-like column is normalized and declared numeric columns are coerced.
/// Failure returns an error, never a partial table.
pub fn load(path: &Path, options: &LoadOptions) -> Result<Table> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_bytes(&bytes, options, path)
}

/// Shared by `load` and the unit tests, which feed bytes directly.
fn load_bytes(bytes: &[u8], options: &LoadOptions, path: &Path) -> Result<Table> {
    let table = parse_with_fallback(bytes, options, path)?;
    apply_column_spec(table, &options.columns)
}

// ---------------------------------------------------------------------------
// Hypothesis search over (encoding, delimiter)
// ---------------------------------------------------------------------------

fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    // "cp949" is not a WHATWG label; encoding_rs serves it as EUC-KR
    // (windows-949 mapping).
    if label.eq_ignore_ascii_case("cp949") {
        return Ok(encoding_rs::EUC_KR);
    }
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| Error::Value(format!("unknown encoding label '{label}'")))
}

fn parse_with_fallback(bytes: &[u8], options: &LoadOptions, path: &Path) -> Result<Table> {
    if options.encodings.is_empty() {
        return Err(Error::Value("candidate encoding list is empty".to_string()));
    }
    if options.delimiters.is_empty() {
        return Err(Error::Value("candidate delimiter list is empty".to_string()));
    }

    let encodings: Vec<&'static Encoding> = options
        .encodings
        .iter()
        .map(|label| resolve_encoding(label))
        .collect::<Result<_>>()?;

    let mut attempts = 0;
    let mut last = String::new();

    for &encoding in &encodings {
        for &delimiter in &options.delimiters {
            attempts += 1;
            match try_parse(bytes, encoding, delimiter) {
                Ok(table) => {
                    info!(
                        "parsed '{}' with encoding {} and delimiter {:?} ({} rows)",
                        path.display(),
                        encoding.name(),
                        delimiter as char,
                        table.len()
                    );
                    return Ok(table);
                }
                Err(reason) => {
                    debug!(
                        "hypothesis failed for '{}' (encoding {}, delimiter {:?}): {reason}",
                        path.display(),
                        encoding.name(),
                        delimiter as char
                    );
                    last = reason;
                }
            }
        }
    }

    Err(Error::Encoding {
        path: path.to_path_buf(),
        attempts,
        last,
    })
}

/// One hypothesis: decode the whole byte buffer with `encoding`, parse with
/// `delimiter`. Any decode error or CSV error (including ragged rows) rejects
/// the hypothesis.
fn try_parse(
    bytes: &[u8],
    encoding: &'static Encoding,
    delimiter: u8,
) -> std::result::Result<Table, String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(format!("{}: undecodable byte sequence", encoding.name()));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err("header row has no columns".to_string());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(
            record
                .iter()
                .map(|cell| Value::Str(cell.to_string()))
                .collect(),
        );
    }

    Ok(Table { columns, rows })
}

// ---------------------------------------------------------------------------
// Column normalization / coercion
// ---------------------------------------------------------------------------

fn apply_column_spec(mut table: Table, spec: &ColumnSpec) -> Result<Table> {
    if let Some(date_column) = &spec.date_column {
        let idx = table
            .column_index(date_column)
            .ok_or_else(|| Error::Schema {
                column: date_column.clone(),
                available: table.columns.clone(),
            })?;
        for row in &mut table.rows {
            row[idx] = Value::Str(normalize_date(&row[idx]));
        }
    }

    // A numeric column named outright must exist; marker rules may match
    // nothing (a file simply has no such brackets).
    for rule in &spec.numeric {
        if let NumericColumns::Named(name) = rule {
            if table.column_index(name).is_none() {
                return Err(Error::Schema {
                    column: name.clone(),
                    available: table.columns.clone(),
                });
            }
        }
    }

    let numeric_idx: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, col)| spec.numeric.iter().any(|rule| rule.matches(col)))
        .map(|(i, _)| i)
        .collect();

    for idx in numeric_idx {
        let column = table.columns[idx].clone();
        for (row_no, row) in table.rows.iter_mut().enumerate() {
            let raw = match &row[idx] {
                Value::Str(s) => s.clone(),
                _ => continue,
            };
            row[idx] = coerce_numeric(&raw).ok_or_else(|| Error::DataFormat {
                column: column.clone(),
                row: row_no,
                value: raw.clone(),
            })?;
        }
    }

    Ok(table)
}

/// Canonicalize a date-like key: stringify, trim, and zero-pad all-digit
/// values shorter than 8 characters (a numeric parse upstream may have
/// dropped a leading zero from a YYYYMMDD key).
fn normalize_date(value: &Value) -> String {
    let s = match value {
        Value::Float(f) => (*f as i64).to_string(),
        other => other.to_string(),
    };
    let s = s.trim();
    if !s.is_empty() && s.len() < 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        format!("{s:0>8}")
    } else {
        s.to_string()
    }
}

/// Coerce one numeric cell: strip thousands separators, map the bare-dash
/// and empty placeholders to zero, then parse as integer or float.
fn coerce_numeric(raw: &str) -> Option<Value> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return Some(Value::Int(0));
    }
    if let Ok(i) = cleaned.parse::<i64>() {
        return Some(Value::Int(i));
    }
    if let Ok(f) = cleaned.parse::<f64>() {
        return Some(Value::Float(f));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fake_path() -> PathBuf {
        PathBuf::from("test.csv")
    }

    fn options(encodings: &[&str], delimiters: &[u8]) -> LoadOptions {
        LoadOptions {
            encodings: encodings.iter().map(|s| s.to_string()).collect(),
            delimiters: delimiters.to_vec(),
            columns: ColumnSpec::default(),
        }
    }

    #[test]
    fn first_successful_hypothesis_wins() {
        // Comma tried first parses the whole header as one column, which is
        // a valid (single-column) table, so it is accepted.
        let bytes = b"a;b\n1;2\n";
        let table = load_bytes(bytes, &options(&["utf-8"], &[b',', b';']), &fake_path()).unwrap();
        assert_eq!(table.columns, vec!["a;b"]);

        // Reversed priority picks the semicolon split.
        let table = load_bytes(bytes, &options(&["utf-8"], &[b';', b',']), &fake_path()).unwrap();
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn euc_kr_bytes_fall_through_utf8() {
        let (bytes, _, _) = encoding_rs::EUC_KR.encode("지역,승차\n강남,1000\n");
        let table = load_bytes(
            &bytes,
            &options(&["utf-8", "cp949"], &[b',']),
            &fake_path(),
        )
        .unwrap();
        assert_eq!(table.columns, vec!["지역", "승차"]);
        assert_eq!(table.value(0, "지역"), Some(&Value::Str("강남".to_string())));
    }

    #[test]
    fn all_hypotheses_failing_is_an_encoding_error() {
        // 0xFF is invalid in UTF-8 and the leading pair is not a BOM, so the
        // decoder cannot sniff its way out.
        let bytes = b"\xff\xff\xfd broken";
        let err = load_bytes(bytes, &options(&["utf-8"], &[b',']), &fake_path()).unwrap_err();
        match err {
            Error::Encoding { attempts, last, .. } => {
                assert_eq!(attempts, 1);
                assert!(last.contains("undecodable"));
            }
            other => panic!("expected Encoding error, got {other:?}"),
        }
    }

    #[test]
    fn empty_candidate_lists_are_rejected() {
        let err = load_bytes(b"a\n1\n", &options(&[], &[b',']), &fake_path()).unwrap_err();
        assert!(matches!(err, Error::Value(_)));
        let err = load_bytes(b"a\n1\n", &options(&["utf-8"], &[]), &fake_path()).unwrap_err();
        assert!(matches!(err, Error::Value(_)));
    }

    #[test]
    fn unknown_encoding_label_is_rejected() {
        let err =
            load_bytes(b"a\n1\n", &options(&["klingon-8"], &[b',']), &fake_path()).unwrap_err();
        assert!(matches!(err, Error::Value(_)));
    }

    #[test]
    fn headers_are_trimmed() {
        let table = load_bytes(
            b" region , pop \nA,1\n",
            &options(&["utf-8"], &[b',']),
            &fake_path(),
        )
        .unwrap();
        assert_eq!(table.columns, vec!["region", "pop"]);
    }

    #[test]
    fn date_column_is_zero_padded_to_eight_digits() {
        let mut opts = options(&["utf-8"], &[b',']);
        opts.columns.date_column = Some("사용일자".to_string());
        let table = load_bytes(
            "사용일자,역명\n2025101,서울역\n20251002,시청\n".as_bytes(),
            &opts,
            &fake_path(),
        )
        .unwrap();
        // 7-digit key gets left-padded; 8-digit key passes through.
        assert_eq!(
            table.value(0, "사용일자"),
            Some(&Value::Str("02025101".to_string()))
        );
        assert_eq!(
            table.value(1, "사용일자"),
            Some(&Value::Str("20251002".to_string()))
        );
    }

    #[test]
    fn non_numeric_date_values_pass_through() {
        let mut opts = options(&["utf-8"], &[b',']);
        opts.columns.date_column = Some("day".to_string());
        let table = load_bytes(b"day\n2025-10\n", &opts, &fake_path()).unwrap();
        assert_eq!(table.value(0, "day"), Some(&Value::Str("2025-10".to_string())));
    }

    #[test]
    fn missing_date_column_is_a_schema_error() {
        let mut opts = options(&["utf-8"], &[b',']);
        opts.columns.date_column = Some("사용일자".to_string());
        let err = load_bytes(b"region,pop\nA,1\n", &opts, &fake_path()).unwrap_err();
        match err {
            Error::Schema { column, available } => {
                assert_eq!(column, "사용일자");
                assert_eq!(available, vec!["region", "pop"]);
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn numeric_coercion_handles_separators_and_placeholders() {
        let mut opts = options(&["utf-8"], &[b',']);
        opts.columns.numeric = vec![NumericColumns::Named("pop".to_string())];
        let table = load_bytes(
            b"region,pop\nA,\"1,234\"\nB,-\nC,2.5\n",
            &opts,
            &fake_path(),
        )
        .unwrap();
        assert_eq!(table.value(0, "pop"), Some(&Value::Int(1234)));
        assert_eq!(table.value(1, "pop"), Some(&Value::Int(0)));
        assert_eq!(table.value(2, "pop"), Some(&Value::Float(2.5)));
    }

    #[test]
    fn unparseable_numeric_cell_is_a_data_format_error() {
        let mut opts = options(&["utf-8"], &[b',']);
        opts.columns.numeric = vec![NumericColumns::Named("pop".to_string())];
        let err = load_bytes(b"region,pop\nA,abc\n", &opts, &fake_path()).unwrap_err();
        match err {
            Error::DataFormat { column, row, value } => {
                assert_eq!(column, "pop");
                assert_eq!(row, 0);
                assert_eq!(value, "abc");
            }
            other => panic!("expected DataFormat error, got {other:?}"),
        }
    }

    #[test]
    fn marker_rule_coerces_every_matching_column() {
        let mut opts = options(&["utf-8"], &[b',']);
        opts.columns.numeric = vec![NumericColumns::Containing("계_".to_string())];
        let table = load_bytes(
            "행정구역,계_0~9세,계_10~19세\n종로구,\"1,000\",900\n".as_bytes(),
            &opts,
            &fake_path(),
        )
        .unwrap();
        assert_eq!(table.value(0, "계_0~9세"), Some(&Value::Int(1000)));
        assert_eq!(table.value(0, "계_10~19세"), Some(&Value::Int(900)));
    }
}
