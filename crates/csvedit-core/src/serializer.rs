//! [`Table`] to delimited text.

use crate::dialect::Dialect;
use crate::error::{CsvError, CsvResult};
use crate::table::Table;

/// Serialize as comma-separated text
pub fn serialize(table: &Table) -> CsvResult<String> {
    serialize_with(table, &Dialect::default())
}

/// Serialize in the given dialect.
///
/// Writes the header record followed by one record per row, each ended by
/// `\n`. Fields are quoted only when they contain the delimiter, the quote
/// or a line break, and a record made of one empty field is written as a
/// pair of quotes. A table without columns produces an empty string.
pub fn serialize_with(table: &Table, dialect: &Dialect) -> CsvResult<String> {
    if table.column_count() == 0 {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(dialect.delimiter_byte())
        .quote(dialect.quote_byte())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.columns()).map_err(write_error)?;
    for row in table.rows() {
        writer.write_record(row.values()).map_err(write_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| CsvError::Write(err.error().to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|err| CsvError::Write(err.to_string()))?;

    // A leading U+FEFF would be read back as a byte order mark
    if let Some(first) = table.columns().first() {
        if first.starts_with('\u{feff}') && text.starts_with(first.as_str()) {
            let quoted = format!("{q}{first}{q}", q = dialect.quote());
            text.replace_range(..first.len(), &quoted);
        }
    }

    tracing::debug!(
        columns = table.column_count(),
        rows = table.row_count(),
        bytes = text.len(),
        "serialized table"
    );

    Ok(text)
}

fn write_error(err: csv::Error) -> CsvError {
    CsvError::Write(err.to_string())
}
