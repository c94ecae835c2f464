//! @ai:module:intent Typed rows for the raw per-race tables
//! @ai:module:layer infrastructure
//! @ai:module:public_api RaceRow, ResultRow, ConstructorRow, RaceData, load_raw_dir
//! @ai:module:stateless true

use crate::error::PipelineError;
use anyhow::{Context, Result};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tdi_engine::normalize_header;

pub const RACES_FILE: &str = "races.csv";
pub const RESULTS_FILE: &str = "results.csv";
pub const CONSTRUCTORS_FILE: &str = "constructors.csv";

/// @ai:intent One race and the season it belongs to
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RaceRow {
    #[serde(rename = "raceid")]
    pub race_id: u32,
    pub year: i32,
}

/// @ai:intent One car's classified result in one race
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "raceid")]
    pub race_id: u32,
    #[serde(rename = "constructorid")]
    pub constructor_id: u32,
    #[serde(rename = "positionorder", default, deserialize_with = "csv::invalid_option")]
    pub position_order: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub points: Option<f64>,
}

/// @ai:intent A constructor id and its display name
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConstructorRow {
    #[serde(rename = "constructorid")]
    pub constructor_id: u32,
    pub name: String,
}

/// @ai:intent The three raw tables needed to build a season table
#[derive(Debug, Clone, Default)]
pub struct RaceData {
    pub races: Vec<RaceRow>,
    pub results: Vec<ResultRow>,
    pub constructors: Vec<ConstructorRow>,
}

/// @ai:intent Read a CSV file into typed rows, matching headers case-insensitively
/// @ai:effects fs:read
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: StringRecord = reader
        .headers()
        .with_context(|| format!("Failed to read headers of {}", path.display()))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = record.with_context(|| format!("{}: bad row {}", path.display(), line))?;
        let row: T = record
            .deserialize(Some(&headers))
            .with_context(|| format!("{}: cannot parse row {}", path.display(), line))?;
        rows.push(row);
    }

    Ok(rows)
}

/// @ai:intent Load races, results and constructors from a raw directory
/// @ai:pre dir contains races.csv, results.csv and constructors.csv
/// @ai:effects fs:read
pub fn load_raw_dir(dir: &Path) -> Result<RaceData> {
    for file in [RACES_FILE, RESULTS_FILE, CONSTRUCTORS_FILE] {
        if !dir.join(file).is_file() {
            return Err(PipelineError::MissingInput(format!(
                "raw table {} in {}",
                file,
                dir.display()
            ))
            .into());
        }
    }

    let data = RaceData {
        races: read_rows(&dir.join(RACES_FILE))?,
        results: read_rows(&dir.join(RESULTS_FILE))?,
        constructors: read_rows(&dir.join(CONSTRUCTORS_FILE))?,
    };

    tracing::info!(
        "Loaded {} races, {} results, {} constructors",
        data.races.len(),
        data.results.len(),
        data.constructors.len()
    );

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_raw_dir_reads_ergast_headers() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(RACES_FILE),
            "raceId,year,round,circuitId,name\n1,2009,1,1,Australian Grand Prix\n",
        )
        .unwrap();
        std::fs::write(
            temp.path().join(RESULTS_FILE),
            "resultId,raceId,driverId,constructorId,position,positionOrder,points\n\
             1,1,18,23,1,1,10\n\
             2,1,22,23,\\N,19,\\N\n",
        )
        .unwrap();
        std::fs::write(
            temp.path().join(CONSTRUCTORS_FILE),
            "constructorId,constructorRef,name\n23,brawn,Brawn\n",
        )
        .unwrap();

        let data = load_raw_dir(temp.path()).unwrap();

        assert_eq!(data.races, vec![RaceRow { race_id: 1, year: 2009 }]);
        assert_eq!(data.results.len(), 2);
        assert_eq!(data.results[0].points, Some(10.0));
        assert_eq!(data.results[1].points, None);
        assert_eq!(data.results[1].position_order, Some(19));
        assert_eq!(data.constructors[0].name, "Brawn");
    }

    #[test]
    fn test_load_raw_dir_missing_table() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(RACES_FILE), "raceId,year\n").unwrap();

        let err = load_raw_dir(temp.path()).unwrap_err();

        assert!(err.to_string().contains(RESULTS_FILE));
    }
}
