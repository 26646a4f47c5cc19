use super::traits::{ParseErrorKind, TessellatorFile, TextFileError, parse_float, parse_id};
use crate::core::models::{GrainRecord, TwinLamellaSequence};
use std::io::{BufRead, Write};

/// One line of the twin-lamella file: a grain id and its lamella sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct LamellaEntry {
    pub id: usize,
    pub lamellae: TwinLamellaSequence,
}

impl LamellaEntry {
    pub fn from_grain(grain: &GrainRecord) -> Result<Self, TextFileError> {
        let lamellae = grain.lamellae.clone().ok_or(TextFileError::Incomplete {
            grain_id: grain.id,
            what: "twin lamellae",
        })?;
        Ok(Self {
            id: grain.id,
            lamellae,
        })
    }
}

/// The lamellar morphology file read by the second tessellation pass.
///
/// Each line is `<id> <domainLength>` for an untwinned grain or
/// `<id> <g1>:<w1>:...:<gN>:<wN>` for a twinned one.
pub struct TwinWidthFile;

impl TwinWidthFile {
    /// Collects the entries for every grain, failing on the first grain without lamellae.
    pub fn entries(grains: &[GrainRecord]) -> Result<Vec<LamellaEntry>, TextFileError> {
        grains.iter().map(LamellaEntry::from_grain).collect()
    }

    fn parse_line(line: &str, line_num: usize) -> Result<LamellaEntry, TextFileError> {
        let mut tokens = line.split_whitespace();
        let (Some(id_token), Some(sequence)) = (tokens.next(), tokens.next()) else {
            return Err(TextFileError::Parse {
                line: line_num,
                kind: ParseErrorKind::FieldCount {
                    expected: 2,
                    found: line.split_whitespace().count(),
                },
            });
        };

        let id = parse_id(id_token, line_num)?;
        let values = sequence
            .split(':')
            .enumerate()
            .map(|(i, token)| parse_float(token, line_num, i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let lamellae = match values.len() {
            1 => TwinLamellaSequence::untwinned(values[0]),
            n if n % 2 == 0 => {
                let (gaps, widths) = values.chunks_exact(2).map(|pair| (pair[0], pair[1])).unzip();
                TwinLamellaSequence::twinned(gaps, widths)
            }
            n => {
                return Err(TextFileError::Parse {
                    line: line_num,
                    kind: ParseErrorKind::UnpairedLamella(n),
                });
            }
        };

        Ok(LamellaEntry { id, lamellae })
    }
}

impl TessellatorFile for TwinWidthFile {
    type Record = LamellaEntry;
    type Error = TextFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<LamellaEntry>, TextFileError> {
        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(Self::parse_line(&line, index + 1)?);
        }
        Ok(entries)
    }

    fn write_to(entries: &[LamellaEntry], writer: &mut impl Write) -> Result<(), TextFileError> {
        for entry in entries {
            writeln!(writer, "{} {}", entry.id, entry.lamellae)?;
        }
        Ok(())
    }
}
