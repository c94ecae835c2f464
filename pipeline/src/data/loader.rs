//! @ai:module:intent Discover, read and clean processed CSV tables
//! @ai:module:layer infrastructure
//! @ai:module:public_api RawTable, CleanReport, PreparedData, load_processed_dir, clean_table, prepare_datasets
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::PipelineError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tdi_engine::{normalize_header, read_season_csv, SeasonTable, NULL_MARKERS};
use walkdir::WalkDir;

/// Stem of the processed season-team table
pub const SEASON_TABLE: &str = "team_year_summary";

/// @ai:intent An untyped table: headers plus string rows, as read from disk
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// @ai:intent Read a CSV file into a raw table named after its file stem
    /// @ai:effects fs:read
    pub fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open table: {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read headers: {}", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row.with_context(|| format!("Failed to read row in {}", path.display()))?;
            rows.push(row.iter().map(str::to_string).collect());
        }

        Ok(Self { name, headers, rows })
    }

    /// @ai:intent Serialize the table back to CSV bytes
    /// @ai:effects pure
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush table {}: {}", self.name, e))
    }

    /// @ai:intent Parse the table as a season-team table
    /// @ai:effects pure
    pub fn to_season_table(&self) -> Result<SeasonTable> {
        let bytes = self.to_csv_bytes()?;
        read_season_csv(bytes.as_slice())
            .with_context(|| format!("Table `{}` is not a season-team table", self.name))
    }
}

/// @ai:intent Summary of what cleaning changed in one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    pub name: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    /// Only columns with at least one missing cell
    pub null_counts: BTreeMap<String, usize>,
}

impl CleanReport {
    pub fn has_nulls(&self) -> bool {
        !self.null_counts.is_empty()
    }
}

/// @ai:intent Cleaned processed tables plus the season table parsed from them
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub season: SeasonTable,
    pub tables: BTreeMap<String, RawTable>,
    pub reports: Vec<CleanReport>,
}

/// @ai:intent Find CSV files directly inside a directory
/// @ai:effects fs:read
fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// @ai:intent Load every CSV table in a directory, keyed by file stem
/// @ai:post result is non-empty
/// @ai:effects fs:read
pub fn load_processed_dir(dir: &Path) -> Result<BTreeMap<String, RawTable>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput(format!(
            "processed directory {} does not exist",
            dir.display()
        ))
        .into());
    }

    let files = find_csv_files(dir);
    if files.is_empty() {
        return Err(PipelineError::MissingInput(format!(
            "no CSV files found in {}",
            dir.display()
        ))
        .into());
    }

    let mut tables = BTreeMap::new();
    for path in files {
        let table = RawTable::read(&path)?;
        tracing::info!("Loaded {} ({} rows)", table.name, table.rows.len());
        tables.insert(table.name.clone(), table);
    }

    Ok(tables)
}

/// @ai:intent Normalize headers, drop exact duplicate rows and count missing cells
/// @ai:post rows keep their first-seen order
/// @ai:effects pure
pub fn clean_table(table: RawTable) -> (RawTable, CleanReport) {
    let headers: Vec<String> = table.headers.iter().map(|h| normalize_header(h)).collect();
    let rows_before = table.rows.len();

    let mut seen = HashSet::new();
    let rows: Vec<Vec<String>> = table
        .rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect();

    let mut null_counts = BTreeMap::new();
    for row in &rows {
        for (idx, header) in headers.iter().enumerate() {
            let is_null = row
                .get(idx)
                .map(|cell| NULL_MARKERS.contains(&cell.trim()))
                .unwrap_or(true);

            if is_null {
                *null_counts.entry(header.clone()).or_insert(0) += 1;
            }
        }
    }

    let report = CleanReport {
        name: table.name.clone(),
        rows_before,
        rows_after: rows.len(),
        duplicates_removed: rows_before - rows.len(),
        null_counts,
    };

    (
        RawTable {
            name: table.name,
            headers,
            rows,
        },
        report,
    )
}

/// @ai:intent Load and clean all processed tables and parse the season table
/// @ai:pre dir contains team_year_summary.csv
/// @ai:effects fs:read
pub fn prepare_datasets(dir: &Path) -> Result<PreparedData> {
    let loaded = load_processed_dir(dir)?;

    let mut tables = BTreeMap::new();
    let mut reports = Vec::with_capacity(loaded.len());

    for (name, table) in loaded {
        let (cleaned, report) = clean_table(table);

        if report.duplicates_removed > 0 {
            tracing::warn!("{}: removed {} duplicate rows", name, report.duplicates_removed);
        }
        for (column, count) in &report.null_counts {
            tracing::warn!("{}: {} missing values in `{}`", name, count, column);
        }

        tables.insert(name, cleaned);
        reports.push(report);
    }

    let season = tables
        .get(SEASON_TABLE)
        .ok_or_else(|| PipelineError::from(tdi_engine::Error::MissingTable(SEASON_TABLE.to_string())))?
        .to_season_table()?;

    Ok(PreparedData {
        season,
        tables,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            name: "t".to_string(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_clean_drops_duplicates_and_normalizes_headers() {
        let table = raw(
            &[" Year", "Team Name"],
            &[&["2020", "Mercedes"], &["2020", "Mercedes"], &["2020", "Ferrari"]],
        );

        let (cleaned, report) = clean_table(table);

        assert_eq!(cleaned.headers, vec!["year", "team_name"]);
        assert_eq!(cleaned.rows.len(), 2);
        assert_eq!(cleaned.rows[1][1], "Ferrari");
        assert_eq!(report.rows_before, 3);
        assert_eq!(report.duplicates_removed, 1);
        assert!(!report.has_nulls());
    }

    #[test]
    fn test_clean_counts_nulls() {
        let table = raw(&["year", "points"], &[&["2020", "\\N"], &["2021", ""], &["2022", "NA"]]);

        let (_, report) = clean_table(table);

        assert_eq!(report.null_counts.get("points"), Some(&3));
        assert_eq!(report.null_counts.get("year"), None);
    }

    #[test]
    fn test_load_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = load_processed_dir(&temp.path().join("nope")).unwrap_err();

        let typed = err.downcast_ref::<PipelineError>().unwrap();
        assert!(typed.is_missing_input());
    }

    #[test]
    fn test_load_ignores_non_csv_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "notes.txt", "hello");
        write(temp.path(), "a.csv", "x\n1\n");

        let tables = load_processed_dir(temp.path()).unwrap();

        assert_eq!(tables.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_prepare_requires_season_table() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "other.csv", "x\n1\n");

        let err = prepare_datasets(temp.path()).unwrap_err();

        assert!(err.to_string().contains(SEASON_TABLE));
        assert!(err.downcast_ref::<PipelineError>().unwrap().is_missing_input());
    }

    #[test]
    fn test_prepare_parses_season_table() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "team_year_summary.csv",
            "Year,Team,Races,Wins,Podiums,Points\n\
             2020,Mercedes,17,13,17,573\n\
             2020,Mercedes,17,13,17,573\n\
             2020,Red Bull,17,2,13,319\n",
        );

        let prepared = prepare_datasets(temp.path()).unwrap();

        assert_eq!(prepared.season.records.len(), 2);
        assert_eq!(prepared.reports[0].duplicates_removed, 1);
        assert!(prepared.tables.contains_key(SEASON_TABLE));
    }

    #[test]
    fn test_prepare_reads_null_cells_as_zero() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "team_year_summary.csv",
            "year,team,races,wins,podiums,points,one_two_finishes\n\
             2021,Mercedes,22.0,9.0,22.0,613.5,5.0\n\
             2021,Haas,22,0,0,NA,\\N\n",
        );

        let prepared = prepare_datasets(temp.path()).unwrap();

        let report = &prepared.reports[0];
        assert_eq!(report.null_counts.get("points"), Some(&1));
        assert_eq!(report.null_counts.get("one_two_finishes"), Some(&1));

        let records = &prepared.season.records;
        assert_eq!(records[0].races, 22);
        assert_eq!(records[0].one_two_finishes, Some(5));
        assert_eq!(records[1].points, 0.0);
        assert_eq!(records[1].one_two_finishes, None);
    }
}
