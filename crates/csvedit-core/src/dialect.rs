use serde::{Deserialize, Serialize};

use crate::error::{CsvError, CsvResult};

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';
/// Default quote character
pub const DEFAULT_QUOTE: char = '"';

/// Characters that shape a delimited text file.
///
/// Both characters must be ASCII, distinct, and not a line break. The
/// parser accepts `\n`, `\r\n` and a lone `\r` as record terminators; the
/// serializer always writes `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DialectSpec")]
pub struct Dialect {
    delimiter: char,
    quote: char,
}

/// Unchecked form accepted from configuration
#[derive(Deserialize)]
#[serde(default)]
struct DialectSpec {
    delimiter: char,
    quote: char,
}

impl Default for DialectSpec {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
        }
    }
}

impl TryFrom<DialectSpec> for Dialect {
    type Error = CsvError;

    fn try_from(spec: DialectSpec) -> CsvResult<Self> {
        Dialect::new(spec.delimiter, spec.quote)
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
        }
    }
}

impl Dialect {
    pub fn new(delimiter: char, quote: char) -> CsvResult<Self> {
        for (role, c) in [("delimiter", delimiter), ("quote", quote)] {
            if !c.is_ascii() || c == '\n' || c == '\r' {
                return Err(CsvError::InvalidDialect(format!(
                    "{role} must be an ASCII character other than a line break, got {c:?}"
                )));
            }
        }
        if delimiter == quote {
            return Err(CsvError::InvalidDialect(format!(
                "delimiter and quote are both {delimiter:?}"
            )));
        }

        Ok(Self { delimiter, quote })
    }

    /// Comma-separated, double-quoted
    pub fn csv() -> Self {
        Self::default()
    }

    pub fn with_delimiter(self, delimiter: char) -> CsvResult<Self> {
        Self::new(delimiter, self.quote)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn quote(&self) -> char {
        self.quote
    }

    // Validated ASCII in `new`, so the casts are lossless
    pub(crate) fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub(crate) fn quote_byte(&self) -> u8 {
        self.quote as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dialects() {
        let tsv = Dialect::csv().with_delimiter('\t').unwrap();
        assert_eq!(tsv.delimiter(), '\t');
        assert_eq!(tsv.quote(), '"');
        assert_eq!(tsv.delimiter_byte(), b'\t');

        let single = Dialect::new(';', '\'').unwrap();
        assert_eq!(single.quote_byte(), b'\'');
    }

    #[test]
    fn test_rejected_dialects() {
        for delimiter in ['"', '\n', '\r', '→'] {
            let err = Dialect::csv().with_delimiter(delimiter).unwrap_err();
            assert_eq!(err.code(), "INVALID_DIALECT", "{delimiter:?}");
        }
        assert!(Dialect::new(',', ',').is_err());
        assert!(Dialect::new(',', '\n').is_err());
    }

    #[test]
    fn test_deserialize_checks_dialect() {
        let dialect: Dialect = serde_json::from_str(r#"{"delimiter":";"}"#).unwrap();
        assert_eq!(dialect, Dialect::new(';', '"').unwrap());

        assert!(serde_json::from_str::<Dialect>(r#"{"delimiter":"\""}"#).is_err());
    }
}
