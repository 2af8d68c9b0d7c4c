//! Semicolon-separated export of per-size summaries.
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use grid_astar_layouts::RunSummary;
use log::info;
use serde::{Deserialize, Serialize};

use crate::HarnessError;

const DELIMITER: u8 = b';';

/// One layout's aggregate over all levels of one size in one scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub layout: String,
    pub scenario: usize,
    pub description: String,
    pub dimension: usize,
    pub runs: usize,
    pub mean_time_ms: f64,
    pub success_rate: f64,
    pub mean_open_size: f64,
    pub mean_closed_size: f64,
    pub mean_path_length: Option<f64>,
}

impl SummaryRow {
    pub fn new(
        layout: &str,
        scenario: usize,
        description: &str,
        dimension: usize,
        summary: &RunSummary,
    ) -> SummaryRow {
        SummaryRow {
            layout: layout.to_owned(),
            scenario,
            description: description.to_owned(),
            dimension,
            runs: summary.runs,
            mean_time_ms: summary.mean_time_ms,
            success_rate: summary.success_rate,
            mean_open_size: summary.mean_open_size,
            mean_closed_size: summary.mean_closed_size,
            mean_path_length: summary.mean_path_length,
        }
    }
}

pub fn write_rows<W: io::Write>(writer: W, rows: &[SummaryRow]) -> Result<(), HarnessError> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<SummaryRow>, HarnessError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_reader(reader);
    let rows = csv_reader
        .deserialize()
        .collect::<Result<Vec<SummaryRow>, csv::Error>>()?;
    Ok(rows)
}

/// Writes the rows of one scenario to `<dir>/<description>_<layout>.csv`, one file per
/// layout present. Returns the written paths.
pub fn save_scenario(
    dir: &Path,
    description: &str,
    rows: &[SummaryRow],
) -> Result<Vec<PathBuf>, HarnessError> {
    fs::create_dir_all(dir)?;
    let mut layouts: Vec<&str> = rows.iter().map(|r| r.layout.as_str()).collect();
    layouts.sort_unstable();
    layouts.dedup();

    let mut written = Vec::new();
    for layout in layouts {
        let path = dir.join(format!("{description}_{layout}.csv"));
        let layout_rows: Vec<SummaryRow> = rows
            .iter()
            .filter(|r| r.layout == layout)
            .cloned()
            .collect();
        write_rows(File::create(&path)?, &layout_rows)?;
        info!("Wrote {} rows to {}", layout_rows.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(layout: &str, dimension: usize, mean_path_length: Option<f64>) -> SummaryRow {
        SummaryRow {
            layout: layout.to_owned(),
            scenario: 1,
            description: "MediumDensity".to_owned(),
            dimension,
            runs: 50,
            mean_time_ms: 0.25,
            success_rate: 0.5,
            mean_open_size: 3.0,
            mean_closed_size: 40.0,
            mean_path_length,
        }
    }

    #[test]
    fn rows_are_semicolon_separated() {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[row("DOD", 10, Some(18.0))]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("layout;scenario;description;dimension;runs;mean_time_ms;success_rate;mean_open_size;mean_closed_size;mean_path_length")
        );
        assert_eq!(
            lines.next(),
            Some("DOD;1;MediumDensity;10;50;0.25;0.5;3.0;40.0;18.0")
        );
    }

    #[test]
    fn rows_read_back() {
        let rows = vec![row("DOD", 10, Some(18.0)), row("OOP", 10, None)];
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &rows).unwrap();
        assert_eq!(read_rows(buffer.as_slice()).unwrap(), rows);
    }

    #[test]
    fn scenario_files_split_by_layout() {
        let dir = std::env::temp_dir().join(format!("layout_harness_export_{}", std::process::id()));
        let rows = vec![
            row("DOD", 10, Some(18.0)),
            row("OOP", 10, Some(18.0)),
            row("DOD", 20, Some(38.0)),
        ];
        let written = save_scenario(&dir, "MediumDensity", &rows).unwrap();
        assert_eq!(written.len(), 2);
        let dod = read_rows(File::open(dir.join("MediumDensity_DOD.csv")).unwrap()).unwrap();
        assert_eq!(dod.len(), 2);
        fs::remove_dir_all(&dir).unwrap();
    }
}
