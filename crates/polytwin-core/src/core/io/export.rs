use crate::core::models::GrainRecord;
use crate::core::orientation::Orientation;
use crate::core::statistics::{OUTPUT_DECIMALS, round_to_decimals};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Grain {grain_id} is missing {what}")]
    Incomplete { grain_id: usize, what: &'static str },
}

/// One row of `stats_parent.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRow {
    pub id: usize,
    pub eq_radius: f64,
    pub sphericity: f64,
    pub num_twins: usize,
    pub phi_1: f64,
    #[serde(rename = "Phi")]
    pub big_phi: f64,
    pub phi_2: f64,
}

/// One row of `stats_twin.csv`; twin ids run over the whole microstructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinRow {
    pub twin_id: usize,
    pub parent_id: usize,
    pub width: f64,
    pub gap: f64,
    pub phi_1: f64,
    #[serde(rename = "Phi")]
    pub big_phi: f64,
    pub phi_2: f64,
}

fn rounded(value: f64) -> f64 {
    round_to_decimals(value, OUTPUT_DECIMALS)
}

fn rounded_angles(orientation: &Orientation) -> [f64; 3] {
    orientation.degrees().map(rounded)
}

fn require<T: Copy>(value: Option<T>, grain_id: usize, what: &'static str) -> Result<T, ExportError> {
    value.ok_or(ExportError::Incomplete { grain_id, what })
}

pub fn parent_rows(grains: &[GrainRecord]) -> Result<Vec<ParentRow>, ExportError> {
    grains
        .iter()
        .map(|grain| {
            let orientation = require(grain.parent_orientation, grain.id, "a parent orientation")?;
            let [phi_1, big_phi, phi_2] = rounded_angles(&orientation);
            Ok(ParentRow {
                id: grain.id,
                eq_radius: rounded(grain.eq_radius()),
                sphericity: rounded(grain.sphericity),
                num_twins: grain.twin_count(),
                phi_1,
                big_phi,
                phi_2,
            })
        })
        .collect()
}

pub fn twin_rows(grains: &[GrainRecord]) -> Result<Vec<TwinRow>, ExportError> {
    let mut rows = Vec::new();
    for grain in grains {
        let Some(lamellae) = grain.lamellae.as_ref().filter(|l| l.is_twinned()) else {
            continue;
        };
        let orientation = require(grain.twin_orientation, grain.id, "a twin orientation")?;
        let [phi_1, big_phi, phi_2] = rounded_angles(&orientation);
        for (&gap, &width) in lamellae.gaps().iter().zip(lamellae.widths()) {
            rows.push(TwinRow {
                twin_id: rows.len() + 1,
                parent_id: grain.id,
                width: rounded(width),
                gap: rounded(gap),
                phi_1,
                big_phi,
                phi_2,
            });
        }
    }
    Ok(rows)
}

fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<(), ExportError> {
    let csv_error = |source| ExportError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

/// Writes `stats_parent.csv`, one row per grain.
pub fn write_parent_stats(grains: &[GrainRecord], path: &Path) -> Result<usize, ExportError> {
    let rows = parent_rows(grains)?;
    write_rows(&rows, path)?;
    Ok(rows.len())
}

/// Writes `stats_twin.csv`, one row per twin lamella.
pub fn write_twin_stats(grains: &[GrainRecord], path: &Path) -> Result<usize, ExportError> {
    let rows = twin_rows(grains)?;
    write_rows(&rows, path)?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::TwinLamellaSequence;
    use tempfile::tempdir;

    fn sample_grains() -> Vec<GrainRecord> {
        let mut first = GrainRecord::new(1, 50.0, 0.9);
        first.lamellae = Some(TwinLamellaSequence::untwinned(500.0));
        first.parent_orientation = Some(Orientation::from_degrees(10.0, 20.0, 30.0));
        first.twin_orientation = Some(Orientation::from_degrees(40.0, 50.0, 60.0));

        let mut second = GrainRecord::new(2, 100.0, 0.8);
        second.lamellae = Some(TwinLamellaSequence::twinned(vec![30.0, 70.0], vec![1.5, 2.5]));
        second.parent_orientation = Some(Orientation::from_degrees(1.0, 2.0, 3.0));
        second.twin_orientation = Some(Orientation::from_degrees(4.0, 5.0, 6.123456));

        vec![first, second]
    }

    #[test]
    fn parent_rows_report_radius_and_twin_count() {
        let rows = parent_rows(&sample_grains()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].eq_radius, 25.0);
        assert_eq!(rows[0].num_twins, 0);
        assert_eq!(rows[1].num_twins, 2);
        assert_eq!(rows[1].phi_1, 1.0);
    }

    #[test]
    fn twin_rows_number_lamellae_globally() {
        let rows = twin_rows(&sample_grains()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].twin_id, 1);
        assert_eq!(rows[1].twin_id, 2);
        assert!(rows.iter().all(|r| r.parent_id == 2));
        assert_eq!(rows[1].gap, 70.0);
        assert_eq!(rows[1].width, 2.5);
        assert_eq!(rows[0].phi_2, 6.12346);
    }

    #[test]
    fn missing_orientation_is_reported_with_grain_id() {
        let mut grains = sample_grains();
        grains[1].parent_orientation = None;

        let err = parent_rows(&grains).unwrap_err();
        assert!(matches!(err, ExportError::Incomplete { grain_id: 2, .. }));
    }

    #[test]
    fn csv_files_have_the_documented_headers() {
        let dir = tempdir().unwrap();
        let parent_path = dir.path().join("stats_parent.csv");
        let twin_path = dir.path().join("stats_twin.csv");
        let grains = sample_grains();

        assert_eq!(write_parent_stats(&grains, &parent_path).unwrap(), 2);
        assert_eq!(write_twin_stats(&grains, &twin_path).unwrap(), 2);

        let parent_csv = std::fs::read_to_string(&parent_path).unwrap();
        let twin_csv = std::fs::read_to_string(&twin_path).unwrap();
        assert!(parent_csv.starts_with("id,eq_radius,sphericity,num_twins,phi_1,Phi,phi_2\n"));
        assert!(twin_csv.starts_with("twin_id,parent_id,width,gap,phi_1,Phi,phi_2\n"));

        let mut reader = csv::Reader::from_path(&twin_path).unwrap();
        let reread: Vec<TwinRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(reread, twin_rows(&grains).unwrap());
    }
}
