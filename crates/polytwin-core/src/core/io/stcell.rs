use super::traits::{ParseErrorKind, TessellatorFile, TextFileError, parse_float};
use crate::core::io::format_real;
use crate::core::models::GrainRecord;
use std::io::{BufRead, Write};
use tracing::debug;

/// First-pass grain statistics: one `diameter sphericity` line per grain.
///
/// Grain ids follow line order starting at 1; blank lines are ignored and do not
/// consume an id. Extra trailing columns are tolerated.
pub struct StatCellFile;

impl StatCellFile {
    fn parse_line(line: &str, line_num: usize, id: usize) -> Result<GrainRecord, TextFileError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(TextFileError::Parse {
                line: line_num,
                kind: ParseErrorKind::FieldCount {
                    expected: 2,
                    found: fields.len(),
                },
            });
        }

        let diameter = parse_float(fields[0], line_num, 1)?;
        let sphericity = parse_float(fields[1], line_num, 2)?;
        for (field, value) in [("diameter", diameter), ("sphericity", sphericity)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TextFileError::Parse {
                    line: line_num,
                    kind: ParseErrorKind::NonPositive { field, value },
                });
            }
        }

        Ok(GrainRecord::new(id, diameter, sphericity))
    }
}

impl TessellatorFile for StatCellFile {
    type Record = GrainRecord;
    type Error = TextFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<GrainRecord>, TextFileError> {
        let mut grains = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let id = grains.len() + 1;
            grains.push(Self::parse_line(&line, index + 1, id)?);
        }
        debug!(count = grains.len(), "Read grain statistics.");
        Ok(grains)
    }

    fn write_to(grains: &[GrainRecord], writer: &mut impl Write) -> Result<(), TextFileError> {
        for grain in grains {
            writeln!(
                writer,
                "{} {}",
                format_real(grain.diameter),
                format_real(grain.sphericity)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn read(content: &str) -> Result<Vec<GrainRecord>, TextFileError> {
        StatCellFile::read_from(&mut Cursor::new(content))
    }

    #[test]
    fn reads_grains_in_line_order() {
        let grains = read("50.0 0.8\n100 0.91\n75.5 0.85 extra\n").unwrap();

        assert_eq!(grains.len(), 3);
        assert_eq!(grains[0].id, 1);
        assert_eq!(grains[0].diameter, 50.0);
        assert_eq!(grains[1].id, 2);
        assert_eq!(grains[1].sphericity, 0.91);
        assert_eq!(grains[2].id, 3);
        assert_eq!(grains[2].diameter, 75.5);
    }

    #[test]
    fn blank_lines_do_not_consume_ids() {
        let grains = read("\n50 0.8\n\n   \n60 0.9\n").unwrap();

        assert_eq!(grains.len(), 2);
        assert_eq!(grains[1].id, 2);
        assert_eq!(grains[1].diameter, 60.0);
    }

    #[test]
    fn reports_line_number_for_invalid_float() {
        let err = read("50 0.8\n50 abc\n").unwrap_err();

        match err {
            TextFileError::Parse { line, kind } => {
                assert_eq!(line, 2);
                assert_eq!(
                    kind,
                    ParseErrorKind::InvalidFloat {
                        field: 2,
                        value: "abc".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_lines_with_a_single_column() {
        let err = read("50\n").unwrap_err();
        assert!(matches!(
            err,
            TextFileError::Parse {
                line: 1,
                kind: ParseErrorKind::FieldCount { expected: 2, found: 1 }
            }
        ));
    }

    #[test]
    fn rejects_non_positive_diameter() {
        let err = read("0 0.8\n").unwrap_err();
        assert!(matches!(
            err,
            TextFileError::Parse {
                line: 1,
                kind: ParseErrorKind::NonPositive { field: "diameter", .. }
            }
        ));
    }

    #[test]
    fn empty_input_yields_no_grains() {
        assert!(read("").unwrap().is_empty());
    }

    #[test]
    fn writes_and_reads_back_through_a_path() {
        let grains = vec![GrainRecord::new(1, 42.123456, 0.8), GrainRecord::new(2, 10.0, 1.0)];
        let file = NamedTempFile::new().unwrap();

        StatCellFile::write_to_path(&grains, file.path()).unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "42.12346 0.8\n10 1\n");

        let reread = StatCellFile::read_from_path(file.path()).unwrap();
        assert_eq!(reread.len(), 2);
        assert_eq!(reread[0].diameter, 42.12346);
    }
}
