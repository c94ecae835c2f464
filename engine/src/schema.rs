//! @ai:module:intent Check season tables for required and optional columns
//! @ai:module:layer application
//! @ai:module:public_api check_columns, normalize_header, SchemaReport, MissingColumn, REQUIRED_COLUMNS
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Columns every season table must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = ["year", "team", "races", "wins", "podiums", "points"];

/// Optional column; absent means a one-two rate of 0.
pub const ONE_TWO_COLUMN: &str = "one_two_finishes";

/// Column names used by older exports, mapped to the canonical column they stand in for.
/// They are reported, never merged.
const DEPRECATED_COLUMNS: [(&str, &str); 5] = [
    ("total_races", "races"),
    ("total_points", "points"),
    ("name", "team"),
    ("constructor", "team"),
    ("one_two_finish_rate", ONE_TWO_COLUMN),
];

/// @ai:intent A required column that is absent from a table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissingColumn {
    pub column: String,
    pub deprecated_variant: Option<String>,
}

impl MissingColumn {
    /// @ai:effects pure
    pub fn hint(&self) -> Option<String> {
        self.deprecated_variant
            .as_ref()
            .map(|v| format!("found deprecated column `{}`; rename it to `{}`", v, self.column))
    }
}

/// @ai:intent Result of checking a table header
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub missing: Vec<MissingColumn>,
    pub has_one_two: bool,
    pub deprecated: Vec<String>,
}

impl SchemaReport {
    /// @ai:intent Check if every required column is present
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }

    /// @ai:intent Turn the first missing column into an error
    /// @ai:effects pure
    pub fn into_result(self) -> Result<Self> {
        match self.missing.first() {
            Some(missing) => Err(Error::MissingColumn {
                column: missing.column.clone(),
                hint: missing.hint(),
            }),
            None => Ok(self),
        }
    }
}

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"))
}

/// @ai:intent Clean a column name: trim, lowercase, whitespace runs to underscores
/// @ai:effects pure
/// @ai:example "  Total Races " -> "total_races"
pub fn normalize_header(name: &str) -> String {
    let trimmed = name.trim().trim_start_matches('\u{feff}').trim();
    whitespace()
        .replace_all(&trimmed.to_lowercase(), "_")
        .into_owned()
}

/// @ai:intent Check a header row against the season-table schema
/// @ai:pre headers may be raw; they are normalized before matching
/// @ai:effects pure
pub fn check_columns<S: AsRef<str>>(headers: &[S]) -> SchemaReport {
    let columns: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
    let has = |name: &str| columns.iter().any(|c| c == name);

    let missing = REQUIRED_COLUMNS
        .into_iter()
        .filter(|&required| !has(required))
        .map(|required| MissingColumn {
            column: required.to_string(),
            deprecated_variant: DEPRECATED_COLUMNS
                .into_iter()
                .find(|&(old, canonical)| canonical == required && has(old))
                .map(|(old, _)| old.to_string()),
        })
        .collect();

    let deprecated = DEPRECATED_COLUMNS
        .into_iter()
        .filter(|&(old, _)| has(old))
        .map(|(old, _)| old.to_string())
        .collect();

    SchemaReport {
        has_one_two: has(ONE_TWO_COLUMN),
        columns,
        missing,
        deprecated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Total Races "), "total_races");
        assert_eq!(normalize_header("One Two\tFinishes"), "one_two_finishes");
        assert_eq!(normalize_header("\u{feff}year"), "year");
        assert_eq!(normalize_header("TDI"), "tdi");
    }

    #[test]
    fn test_complete_schema_passes() {
        let report = check_columns(&["Year", "Team", "Races", "Wins", "Podiums", "Points"]);
        assert!(report.passed());
        assert!(!report.has_one_two);
        assert!(report.deprecated.is_empty());
    }

    #[test]
    fn test_optional_column_detected() {
        let report = check_columns(&[
            "year", "team", "races", "wins", "podiums", "points", "one_two_finishes",
        ]);
        assert!(report.passed());
        assert!(report.has_one_two);
    }

    #[test]
    fn test_missing_column_reports_deprecated_variant() {
        let report = check_columns(&["year", "name", "total_races", "wins", "podiums", "points"]);

        assert!(!report.passed());
        assert_eq!(report.missing.len(), 2);
        assert_eq!(report.missing[0].column, "team");
        assert_eq!(report.missing[0].deprecated_variant.as_deref(), Some("name"));
        assert_eq!(report.missing[1].column, "races");

        let err = report.into_result().unwrap_err();
        assert!(err.to_string().contains("`team`"));
        assert!(err.to_string().contains("`name`"));
    }

    #[test]
    fn test_missing_column_without_variant() {
        let report = check_columns(&["year", "team", "races", "wins", "points"]);
        assert_eq!(
            report.missing,
            vec![MissingColumn {
                column: "podiums".to_string(),
                deprecated_variant: None
            }]
        );
    }
}
