use super::traits::{ParseErrorKind, TessellatorFile, TextFileError, parse_float, parse_id};
use crate::core::models::GrainRecord;
use crate::core::orientation::Orientation;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const REFERENCE_PREFIX: &str = "file(";
const REFERENCE_SUFFIX: &str = ",des=euler-bunge)";

/// A per-grain orientation file: one `phi1 Phi phi2` line (degrees) per lamella.
pub struct OrientationListFile;

impl OrientationListFile {
    /// Alternates parent and twin orientations, `repeats` pairs in total.
    pub fn alternating(parent: Orientation, twin: Orientation, repeats: usize) -> Vec<Orientation> {
        std::iter::repeat_n([parent, twin], repeats).flatten().collect()
    }
}

impl TessellatorFile for OrientationListFile {
    type Record = Orientation;
    type Error = TextFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Orientation>, TextFileError> {
        let mut orientations = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = index + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => continue,
                [a, b, c, ..] => orientations.push(Orientation::from_degrees(
                    parse_float(a, line_num, 1)?,
                    parse_float(b, line_num, 2)?,
                    parse_float(c, line_num, 3)?,
                )),
                short => {
                    return Err(TextFileError::Parse {
                        line: line_num,
                        kind: ParseErrorKind::FieldCount {
                            expected: 3,
                            found: short.len(),
                        },
                    });
                }
            }
        }
        Ok(orientations)
    }

    fn write_to(orientations: &[Orientation], writer: &mut impl Write) -> Result<(), TextFileError> {
        for orientation in orientations {
            writeln!(writer, "{orientation}")?;
        }
        Ok(())
    }
}

/// One line of the orientation index: a grain id and the path of its orientation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientationIndexEntry {
    pub id: usize,
    pub path: PathBuf,
}

/// The orientation index read by the second tessellation pass.
///
/// Lines follow `<id> file(<path>,des=euler-bunge)`.
pub struct OrientationIndexFile;

impl TessellatorFile for OrientationIndexFile {
    type Record = OrientationIndexEntry;
    type Error = TextFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<OrientationIndexEntry>, TextFileError> {
        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some((id_token, reference)) = trimmed.split_once(char::is_whitespace) else {
                return Err(TextFileError::Parse {
                    line: line_num,
                    kind: ParseErrorKind::FieldCount {
                        expected: 2,
                        found: 1,
                    },
                });
            };
            let id = parse_id(id_token, line_num)?;
            let reference = reference.trim();
            let path = reference
                .strip_prefix(REFERENCE_PREFIX)
                .and_then(|rest| rest.strip_suffix(REFERENCE_SUFFIX))
                .ok_or_else(|| TextFileError::Parse {
                    line: line_num,
                    kind: ParseErrorKind::MalformedReference(reference.to_string()),
                })?;
            entries.push(OrientationIndexEntry {
                id,
                path: PathBuf::from(path),
            });
        }
        Ok(entries)
    }

    fn write_to(entries: &[OrientationIndexEntry], writer: &mut impl Write) -> Result<(), TextFileError> {
        for entry in entries {
            writeln!(
                writer,
                "{} {}{}{}",
                entry.id,
                REFERENCE_PREFIX,
                entry.path.display(),
                REFERENCE_SUFFIX
            )?;
        }
        Ok(())
    }
}

/// Writes `<base>_<id>` orientation files for every grain plus the `<base>` index.
pub struct CrystalOrientationWriter {
    base_path: PathBuf,
    repeats: usize,
}

impl CrystalOrientationWriter {
    pub fn new(base_path: impl Into<PathBuf>, repeats: usize) -> Self {
        Self {
            base_path: base_path.into(),
            repeats,
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.base_path
    }

    pub fn grain_path(&self, grain_id: usize) -> PathBuf {
        let mut name = self
            .base_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!("_{grain_id}"));
        self.base_path.with_file_name(name)
    }

    /// Writes every per-grain file, then the index referencing them.
    ///
    /// # Errors
    ///
    /// Returns [`TextFileError::Incomplete`] if a grain has no orientation pair yet,
    /// before any file is written.
    #[instrument(skip_all, name = "crystal_ori_writer", fields(base = %self.base_path.display()))]
    pub fn write_all(&self, grains: &[GrainRecord]) -> Result<Vec<OrientationIndexEntry>, TextFileError> {
        let pairs = grains
            .iter()
            .map(|grain| {
                grain
                    .orientation_pair()
                    .map(|pair| (grain.id, pair))
                    .ok_or(TextFileError::Incomplete {
                        grain_id: grain.id,
                        what: "orientation pair",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(parent) = self.base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut entries = Vec::with_capacity(pairs.len());
        for (id, (parent, twin)) in pairs {
            let path = self.grain_path(id);
            let block = OrientationListFile::alternating(parent, twin, self.repeats);
            OrientationListFile::write_to_path(&block, &path)?;
            entries.push(OrientationIndexEntry { id, path });
        }

        OrientationIndexFile::write_to_path(&entries, &self.base_path)?;
        debug!(grains = entries.len(), "Wrote crystal orientation files.");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn alternating_block_repeats_parent_then_twin() {
        let p = Orientation::from_degrees(10.0, 20.0, 30.0);
        let t = Orientation::from_degrees(40.0, 50.0, 60.0);
        let block = OrientationListFile::alternating(p, t, 3);

        assert_eq!(block, vec![p, t, p, t, p, t]);

        let mut buffer = Vec::new();
        OrientationListFile::write_to(&block[..2], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "10 20 30\n40 50 60\n");
    }

    #[test]
    fn orientation_list_reads_angles_back() {
        let content = "10 20 30\n\n359.5 0 1.25\n";
        let read = OrientationListFile::read_from(&mut Cursor::new(content)).unwrap();

        assert_eq!(read.len(), 2);
        assert_eq!(read[1].degrees(), [359.5, 0.0, 1.25]);
    }

    #[test]
    fn orientation_list_rejects_short_lines() {
        let err = OrientationListFile::read_from(&mut Cursor::new("10 20\n")).unwrap_err();
        assert!(matches!(
            err,
            TextFileError::Parse {
                line: 1,
                kind: ParseErrorKind::FieldCount { expected: 3, found: 2 }
            }
        ));
    }

    #[test]
    fn index_lines_follow_the_reference_grammar() {
        let entries = vec![OrientationIndexEntry {
            id: 7,
            path: PathBuf::from("out/crystal_ori_7"),
        }];
        let mut buffer = Vec::new();
        OrientationIndexFile::write_to(&entries, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(text, "7 file(out/crystal_ori_7,des=euler-bunge)\n");

        let parsed = OrientationIndexFile::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn index_reader_rejects_malformed_references() {
        let err = OrientationIndexFile::read_from(&mut Cursor::new("1 crystal_ori_1\n")).unwrap_err();
        assert!(matches!(
            err,
            TextFileError::Parse {
                kind: ParseErrorKind::MalformedReference(_),
                ..
            }
        ));
    }

    #[test]
    fn writer_emits_per_grain_files_and_index() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("crystal_ori");
        let mut grain = GrainRecord::new(1, 50.0, 0.9);
        grain.parent_orientation = Some(Orientation::from_degrees(1.0, 2.0, 3.0));
        grain.twin_orientation = Some(Orientation::from_degrees(4.0, 5.0, 6.0));

        let writer = CrystalOrientationWriter::new(&base, 2);
        let entries = writer.write_all(&[grain]).unwrap();

        let grain_file = dir.path().join("crystal_ori_1");
        assert_eq!(entries[0].path, grain_file);
        assert_eq!(
            fs::read_to_string(&grain_file).unwrap(),
            "1 2 3\n4 5 6\n1 2 3\n4 5 6\n"
        );
        assert_eq!(
            fs::read_to_string(&base).unwrap(),
            format!("1 file({},des=euler-bunge)\n", grain_file.display())
        );
    }

    #[test]
    fn writer_fails_before_writing_when_a_pair_is_missing() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("crystal_ori");
        let grain = GrainRecord::new(4, 50.0, 0.9);

        let err = CrystalOrientationWriter::new(&base, 1).write_all(&[grain]).unwrap_err();

        assert!(matches!(err, TextFileError::Incomplete { grain_id: 4, .. }));
        assert!(!base.exists());
    }
}
