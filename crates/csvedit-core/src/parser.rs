//! Delimited text to [`Table`].
//!
//! Records come from the `csv` reader in flexible mode. The first record is
//! the header. Irregular data records are repaired rather than rejected:
//! short records are padded with empty values, long records lose their
//! extra fields. When the header repeats a key the column keeps its first
//! position and takes its values from the last occurrence. The only hard
//! failure is a quoted field that is still open at end of input.

use std::mem;

use crate::dialect::Dialect;
use crate::error::{CsvError, CsvResult};
use crate::table::{Row, Table};

/// What the parser had to repair while reading the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Data records whose field count differed from the header's
    pub ragged_rows: usize,
    /// Header keys that appeared more than once, one entry per extra occurrence
    pub duplicate_columns: Vec<String>,
}

impl ParseReport {
    /// True when the input needed no repair
    pub fn is_clean(&self) -> bool {
        self.ragged_rows == 0 && self.duplicate_columns.is_empty()
    }
}

/// A parsed table together with its repair report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub table: Table,
    pub report: ParseReport,
}

/// Parse comma-separated text
pub fn parse(text: &str) -> CsvResult<Table> {
    parse_with(text, &Dialect::default())
}

/// Parse text in the given dialect
pub fn parse_with(text: &str, dialect: &Dialect) -> CsvResult<Table> {
    parse_report(text, dialect).map(|parsed| parsed.table)
}

/// Parse text and report every repair that was applied
pub fn parse_report(text: &str, dialect: &Dialect) -> CsvResult<Parsed> {
    // Stripped here so record byte offsets index into `text`
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut report = ParseReport::default();
    let mut records = read_records(text, dialect)?.into_iter();

    let Some(header) = records.next() else {
        return Ok(Parsed {
            table: Table::new(),
            report,
        });
    };

    let width = header.fields.len();
    let mut columns: Vec<String> = Vec::with_capacity(width);
    // source[c] = field position feeding column c
    let mut source: Vec<usize> = Vec::with_capacity(width);

    for (pos, key) in header.fields.into_iter().enumerate() {
        match columns.iter().position(|c| *c == key) {
            Some(col) => {
                tracing::warn!(
                    key = %key,
                    position = pos,
                    "duplicate header key, last occurrence wins"
                );
                source[col] = pos;
                report.duplicate_columns.push(key);
            }
            None => {
                columns.push(key);
                source.push(pos);
            }
        }
    }

    let mut rows = Vec::new();
    for mut record in records {
        if record.fields.len() != width {
            tracing::debug!(
                line = record.line,
                expected = width,
                found = record.fields.len(),
                "repairing ragged record"
            );
            report.ragged_rows += 1;
        }

        let values = source
            .iter()
            .map(|&pos| record.fields.get_mut(pos).map(mem::take).unwrap_or_default())
            .collect();
        rows.push(Row::from_values(values));
    }

    tracing::debug!(
        columns = columns.len(),
        rows = rows.len(),
        ragged = report.ragged_rows,
        "parsed table"
    );

    Ok(Parsed {
        table: Table::from_parts(columns, rows),
        report,
    })
}

/// One logical record and the physical line it starts on
#[derive(Debug)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

fn read_records(text: &str, dialect: &Dialect) -> CsvResult<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter_byte())
        .quote(dialect.quote_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut last_start = None;

    for result in reader.records() {
        let record = result.map_err(|err| CsvError::Format {
            line: err.position().map_or(0, |pos| pos.line() as usize),
            reason: err.to_string(),
        })?;

        let (line, byte) = record
            .position()
            .map_or((0, 0), |pos| (pos.line() as usize, pos.byte() as usize));
        last_start = Some((line, byte));

        records.push(Record {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    // The reader silently closes a quote left open at EOF
    if let Some((line, byte)) = last_start {
        let tail = text.get(byte..).unwrap_or_default();
        if let Some(offset) = unclosed_quote(tail, dialect) {
            return Err(CsvError::Format {
                line: line + offset,
                reason: "unterminated quoted field".to_string(),
            });
        }
    }

    Ok(records)
}

/// Scan the text of the final record. Returns the number of line breaks
/// before the opening quote of a field that never closes.
fn unclosed_quote(tail: &str, dialect: &Dialect) -> Option<usize> {
    let quote = dialect.quote();
    let mut line_breaks = 0;
    let mut opened_at = 0;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut just_closed = false;
    let mut prev_cr = false;

    for c in tail.chars() {
        if in_quotes {
            if c == quote {
                in_quotes = false;
                just_closed = true;
            }
        } else if c == quote && just_closed {
            // doubled quote inside a quoted field
            in_quotes = true;
            just_closed = false;
        } else if c == quote && field_start {
            in_quotes = true;
            opened_at = line_breaks;
            field_start = false;
        } else {
            just_closed = false;
            field_start = c == dialect.delimiter() || c == '\n' || c == '\r';
        }

        if c == '\r' || (c == '\n' && !prev_cr) {
            line_breaks += 1;
        }
        prev_cr = c == '\r';
    }

    in_quotes.then_some(opened_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn cells(table: &Table) -> Vec<Vec<&str>> {
        table.rows().map(|r| r.values().collect()).collect()
    }

    #[test]
    fn test_parse_basic() {
        let table = parse("name,age\nAlice,30\nBob,25\n").unwrap();
        assert_eq!(table.columns(), ["name", "age"]);
        assert_eq!(cells(&table), vec![vec!["Alice", "30"], vec!["Bob", "25"]]);
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let table = parse("a,b\n1,2").unwrap();
        assert_eq!(cells(&table), vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_empty_and_header_only() {
        let table = parse("").unwrap();
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());

        let table = parse("\n\n\r\n").unwrap();
        assert_eq!(table, Table::new());

        let table = parse("name,age\n").unwrap();
        assert_eq!(table.columns(), ["name", "age"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_short_record_padded() {
        let parsed = parse_report("name,age\nAlice\n", &Dialect::default()).unwrap();
        let row = parsed.table.row(0).unwrap();
        assert_eq!(row.iter().collect::<Vec<_>>(), [("name", "Alice"), ("age", "")]);
        assert_eq!(parsed.table.row_count(), 1);
        assert_eq!(parsed.report.ragged_rows, 1);
        assert!(!parsed.report.is_clean());
    }

    #[test]
    fn test_long_record_truncated() {
        let table = parse("a,b\n1,2,3,4\n").unwrap();
        assert_eq!(cells(&table), vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let parsed = parse_report("\n\na,b\n\n1,2\n\n3,4\n", &Dialect::default()).unwrap();
        assert_eq!(parsed.table.columns(), ["a", "b"]);
        assert_eq!(cells(&parsed.table), vec![vec!["1", "2"], vec!["3", "4"]]);
        assert!(parsed.report.is_clean());
    }

    #[test]
    fn test_quoted_empty_is_not_blank() {
        let table = parse("only\n\"\"\n").unwrap();
        assert_eq!(cells(&table), vec![vec![""]]);
    }

    #[test]
    fn test_quoted_fields() {
        let text = "name,quote\n\"Smith, Jr.\",\"He said \"\"hi\"\"\"\n";
        let table = parse(text).unwrap();
        assert_eq!(table.cell(0, "name").unwrap(), "Smith, Jr.");
        assert_eq!(table.cell(0, "quote").unwrap(), "He said \"hi\"");
    }

    #[test]
    fn test_line_breaks_inside_quotes() {
        let table = parse("note,n\n\"line one\nline two\",1\n\"a\r\nb\",2\n").unwrap();
        assert_eq!(table.cell(0, "note").unwrap(), "line one\nline two");
        assert_eq!(table.cell(1, "note").unwrap(), "a\r\nb");
        assert_eq!(table.cell(1, "n").unwrap(), "2");
    }

    #[test]
    fn test_crlf_and_lone_cr() {
        let table = parse("a,b\r\n1,2\r\n3,4\r5,6").unwrap();
        assert_eq!(
            cells(&table),
            vec![vec!["1", "2"], vec!["3", "4"], vec!["5", "6"]]
        );
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let table = parse("\u{feff}id,name\n1,x\n").unwrap();
        assert_eq!(table.columns(), ["id", "name"]);
    }

    #[test]
    fn test_lenient_quotes() {
        let table = parse("a,b\nsay \"hi\",\"x\"y\n").unwrap();
        assert_eq!(table.cell(0, "a").unwrap(), "say \"hi\"");
        assert_eq!(table.cell(0, "b").unwrap(), "xy");
    }

    #[test]
    fn test_unterminated_quote_is_fatal() {
        let err = parse("a,b\n1,2\n3,\"open\nstill open\n").unwrap_err();
        assert_eq!(
            err,
            CsvError::Format {
                line: 3,
                reason: "unterminated quoted field".to_string(),
            }
        );
        assert!(err.is_format());

        let err = parse("a\n\"open").unwrap_err();
        assert!(matches!(err, CsvError::Format { line: 2, .. }));

        // Second field opens on line 3 of a record that starts on line 2
        let err = parse("a,b\n\"x\ny\",\"z").unwrap_err();
        assert!(matches!(err, CsvError::Format { line: 3, .. }));
    }

    #[test]
    fn test_closed_quotes_at_end_of_input() {
        let table = parse("a,b\n\"x \"\"y\"\"\",\"\"\"\"").unwrap();
        assert_eq!(cells(&table), vec![vec!["x \"y\"", "\""]]);

        let table = parse("a,b\nsay,hi\"").unwrap();
        assert_eq!(cells(&table), vec![vec!["say", "hi\""]]);
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let parsed = parse_report("a,b,a\n1,2,3\n4,5\n", &Dialect::default()).unwrap();
        assert_eq!(parsed.table.columns(), ["a", "b"]);
        assert_eq!(cells(&parsed.table), vec![vec!["3", "2"], vec!["", "5"]]);
        assert_eq!(parsed.report.duplicate_columns, ["a"]);
        assert_eq!(parsed.report.ragged_rows, 1);
    }

    #[test]
    fn test_custom_delimiter() {
        let dialect = Dialect::default().with_delimiter(';').unwrap();
        let table = parse_with("a;b\n1,5;2\n", &dialect).unwrap();
        assert_eq!(table.cell(0, "a").unwrap(), "1,5");
        assert_eq!(table.cell(0, "b").unwrap(), "2");
    }

    #[test]
    fn test_whitespace_is_data() {
        let table = parse("a,b\n  , x \n").unwrap();
        assert_eq!(cells(&table), vec![vec!["  ", " x "]]);
    }
}
