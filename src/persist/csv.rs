//! History file in comma-separated rows, one record per line.
//!
//! ```text
//! timestamp,operation,operand1,operand2,result,instance_id
//! 2025-01-05 14:03:11,Addition,2.0000,3.0000,5.0000,6f1c…
//! ```
//!
//! Fields are quoted only when they contain a comma, a quote or a line
//! break. Every file written here ends with a newline; a file that does not
//! was cut short mid-write and is rejected on load.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use super::{HistorySink, PersistError, PersistResult, SaveOutcome, ensure_parent_dir};
use crate::{
    decimal::Decimal,
    record::{CalculationRecord, TIMESTAMP_FORMAT, Value},
    types::Operator,
};

/// Column names, in file order.
pub const COLUMNS: [&str; 6] = [
    "timestamp",
    "operation",
    "operand1",
    "operand2",
    "result",
    "instance_id",
];

/// Gateway owning the history file path and its in-memory row table.
///
/// The table is seeded from the file at open, bounded to `max_rows`, and
/// written back wholesale on every save (and on every appended row when
/// autosave is on).
#[derive(Debug)]
pub struct CsvHistoryFile {
    path: PathBuf,
    table: Vec<CalculationRecord>,
    max_rows: usize,
    auto_save: bool,
}

impl CsvHistoryFile {
    /// Opens the gateway at `path`. A missing file starts an empty table.
    pub fn open(path: impl Into<PathBuf>, max_rows: usize, auto_save: bool) -> PersistResult<Self> {
        let mut file = Self {
            path: path.into(),
            table: Vec::new(),
            max_rows: max_rows.max(1),
            auto_save,
        };
        if file.path.exists() {
            let mut rows = file.load()?;
            trim_front(&mut rows, file.max_rows);
            debug!(path = %file.path.display(), rows = rows.len(), "seeded history table");
            file.table = rows;
        }
        Ok(file)
    }

    /// File location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows currently mirrored to disk.
    pub fn table(&self) -> &[CalculationRecord] {
        &self.table
    }

    /// Whether appended rows are written through immediately.
    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    /// Turns write-through on or off.
    pub fn set_auto_save(&mut self, on: bool) {
        self.auto_save = on;
    }

    /// Overwrites the file with `records`. Empty input writes nothing.
    pub fn save(&mut self, records: &[CalculationRecord]) -> PersistResult<SaveOutcome> {
        if records.is_empty() {
            warn!(path = %self.path.display(), "no history to save");
            return Ok(SaveOutcome::NothingToSave);
        }
        let mut rows = records.to_vec();
        trim_front(&mut rows, self.max_rows);
        self.table = rows;
        self.write_table()?;
        Ok(SaveOutcome::Saved(self.table.len()))
    }

    /// Reads every well-formed row in file order.
    ///
    /// Rows of the wrong width are skipped with a warning; anything else
    /// malformed rejects the whole file.
    pub fn load(&self) -> PersistResult<Vec<CalculationRecord>> {
        let text = fs::read_to_string(&self.path).map_err(|e| PersistError::access(&self.path, e))?;
        parse_file(&self.path, &text)
    }

    /// Adds one row to the table, rewriting the file when autosave is on.
    pub fn append_row(&mut self, record: &CalculationRecord) -> PersistResult<()> {
        self.table.push(record.clone());
        trim_front(&mut self.table, self.max_rows);
        if self.auto_save {
            self.write_table()?;
        }
        Ok(())
    }

    fn write_table(&self) -> PersistResult<()> {
        ensure_parent_dir(&self.path)?;
        let mut out = String::new();
        out.push_str(&COLUMNS.join(","));
        out.push('\n');
        for record in &self.table {
            out.push_str(&encode_row(record));
            out.push('\n');
        }
        fs::write(&self.path, out).map_err(|e| PersistError::access(&self.path, e))
    }
}

impl HistorySink for CsvHistoryFile {
    fn append_row(&mut self, record: &CalculationRecord) -> PersistResult<()> {
        CsvHistoryFile::append_row(self, record)
    }

    fn save(&mut self, records: &[CalculationRecord]) -> PersistResult<SaveOutcome> {
        CsvHistoryFile::save(self, records)
    }

    fn load(&self) -> PersistResult<Vec<CalculationRecord>> {
        CsvHistoryFile::load(self)
    }

    fn path(&self) -> &Path {
        CsvHistoryFile::path(self)
    }
}

fn trim_front(rows: &mut Vec<CalculationRecord>, max: usize) {
    let overflow = rows.len().saturating_sub(max);
    rows.drain(..overflow);
}

/// Encodes one record as a row, without the line terminator.
pub fn encode_row(record: &CalculationRecord) -> String {
    let fields = [
        record.timestamp_text(),
        record.operation.display_name().to_string(),
        record.operand1.to_string(),
        record.operand2.to_string(),
        record.result.to_string(),
        record.instance_id.clone(),
    ];
    fields.iter().map(|f| escape_field(f)).collect::<Vec<_>>().join(",")
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parses a whole history file.
///
/// Empty or whitespace-only text is zero records, not a missing header.
pub fn parse_file(path: &Path, text: &str) -> PersistResult<Vec<CalculationRecord>> {
    let format_error = |line: usize, reason: String| PersistError::DataFormat {
        path: path.to_path_buf(),
        line,
        reason,
    };

    if text.trim().is_empty() {
        warn!(path = %path.display(), "history file is empty; treating it as no records");
        return Ok(Vec::new());
    }

    let rows = read_rows(text).map_err(|(line, reason)| format_error(line, reason.to_string()))?;
    let mut rows = rows.into_iter();

    let (_, header) = rows
        .next()
        .ok_or_else(|| format_error(1, "missing header row".to_string()))?;
    if header != COLUMNS {
        return Err(format_error(1, format!("unexpected header `{}`", header.join(","))));
    }

    let mut records = Vec::new();
    for (line, fields) in rows {
        if fields.len() != COLUMNS.len() {
            warn!(
                path = %path.display(),
                line,
                fields = fields.len(),
                expected = COLUMNS.len(),
                "skipping history row with wrong field count"
            );
            continue;
        }
        records.push(decode_row(&fields).map_err(|reason| format_error(line, reason))?);
    }
    Ok(records)
}

fn decode_row(fields: &[String]) -> Result<CalculationRecord, String> {
    let timestamp = NaiveDateTime::parse_from_str(&fields[0], TIMESTAMP_FORMAT)
        .map_err(|e| format!("bad timestamp `{}`: {e}", fields[0]))?;
    let operation = Operator::from_display_name(&fields[1])
        .ok_or_else(|| format!("unknown operation `{}`", fields[1]))?;
    let operand1: Decimal = fields[2]
        .parse()
        .map_err(|e| format!("operand1: {e}"))?;
    let operand2: Decimal = fields[3]
        .parse()
        .map_err(|e| format!("operand2: {e}"))?;
    let result = Value::parse_for(operation, &fields[4]).map_err(|e| format!("result: {e}"))?;

    Ok(CalculationRecord {
        timestamp,
        operation,
        operand1,
        operand2,
        result,
        instance_id: fields[5].clone(),
    })
}

type Row = (usize, Vec<String>);

/// Splits text into rows of fields, tracking the line each row starts on.
///
/// Blank lines are dropped. Text not ending in a line break is reported
/// as truncated.
fn read_rows(text: &str) -> Result<Vec<Row>, (usize, &'static str)> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                let row = std::mem::take(&mut fields);
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push((row_start, row));
                }
                line += 1;
                row_start = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err((row_start, "unterminated quoted field"));
    }
    if !field.is_empty() || !fields.is_empty() {
        return Err((row_start, "truncated final row"));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_handles_quotes_and_crlf() {
        let rows = read_rows("a,\"b,c\",\"say \"\"hi\"\"\"\r\nd,e,f\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1, vec!["a", "b,c", "say \"hi\""]);
        assert_eq!(rows[1], (2, vec!["d".to_string(), "e".to_string(), "f".to_string()]));
    }

    #[test]
    fn reader_tracks_lines_across_quoted_breaks_and_blank_lines() {
        let rows = read_rows("x\n\n\"multi\nline\",y\nz\n").unwrap();
        assert_eq!(rows[0].0, 1);
        assert_eq!(rows[1], (3, vec!["multi\nline".to_string(), "y".to_string()]));
        assert_eq!(rows[2].0, 5);
    }

    #[test]
    fn reader_rejects_cut_short_text() {
        assert_eq!(read_rows("a,b\nc,d"), Err((2, "truncated final row")));
        assert_eq!(read_rows("a,\"b\n"), Err((1, "unterminated quoted field")));
    }

    #[test]
    fn blank_files_parse_to_no_records() {
        assert_eq!(parse_file(Path::new("h.csv"), "").unwrap(), Vec::new());
        assert_eq!(parse_file(Path::new("h.csv"), "\n\r\n").unwrap(), Vec::new());
    }

    #[test]
    fn escaping_only_quotes_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("q\"q"), "\"q\"\"q\"");
    }
}
