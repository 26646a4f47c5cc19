use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors shared by the line-oriented tessellator formats.
#[derive(Debug, Error)]
pub enum TextFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("Grain {grain_id} has no {what} yet")]
    Incomplete { grain_id: usize, what: &'static str },
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseErrorKind {
    #[error("expected at least {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid number '{value}' in field {field}")]
    InvalidFloat { field: usize, value: String },
    #[error("invalid grain id '{0}'")]
    InvalidId(String),
    #[error("{field} must be positive and finite, found {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("odd number of lamella fields ({0}); expected gap:width pairs")]
    UnpairedLamella(usize),
    #[error("malformed orientation file reference '{0}'")]
    MalformedReference(String),
}

/// Defines the interface for the line-oriented files exchanged with the tessellator.
///
/// Each implementor describes one file grammar: what a record is, how a whole file is
/// parsed into records and how records are written back. Path-based helpers are provided.
pub trait TessellatorFile {
    /// The unit of data a file is made of.
    type Record;

    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads every record from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if a line does not follow the grammar or reading fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Self::Record>, Self::Error>;

    /// Writes the records to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be represented or writing fails.
    fn write_to(records: &[Self::Record], writer: &mut impl Write) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Self::Record>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(records: &[Self::Record], path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(records, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

pub(crate) fn parse_float(token: &str, line: usize, field: usize) -> Result<f64, TextFileError> {
    token.parse().map_err(|_| TextFileError::Parse {
        line,
        kind: ParseErrorKind::InvalidFloat {
            field,
            value: token.to_string(),
        },
    })
}

pub(crate) fn parse_id(token: &str, line: usize) -> Result<usize, TextFileError> {
    token.parse().map_err(|_| TextFileError::Parse {
        line,
        kind: ParseErrorKind::InvalidId(token.to_string()),
    })
}
