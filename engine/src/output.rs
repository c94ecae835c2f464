//! @ai:module:intent Format engine results for different formats (text, JSON, CSV)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_scored, scored_csv, format_sensitivity, format_schema, to_json
//! @ai:module:depends_on record, sensitivity, schema, table
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::record::ScoredRecord;
use crate::schema::SchemaReport;
use crate::sensitivity::{ChangeType, SensitivityReport};
use crate::table::write_scored_csv;
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
    Csv,
}

/// @ai:intent Format a scored table as a string
/// @ai:effects pure
pub fn format_scored(records: &[ScoredRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&records, false),
        OutputFormat::JsonPretty => to_json(&records, true),
        OutputFormat::Csv => scored_csv(records).unwrap_or_else(|e| format!("error: {}", e)),
        OutputFormat::Text => format_scored_text(records),
    }
}

/// @ai:intent Render a scored table as CSV text
/// @ai:effects pure
pub fn scored_csv(records: &[ScoredRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_scored_csv(&mut buffer, records)?;
    String::from_utf8(buffer).map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// @ai:intent Format a scored table as a human-readable ranking per season
/// @ai:effects pure
fn format_scored_text(records: &[ScoredRecord]) -> String {
    let mut output = String::new();
    let mut years: Vec<i32> = records.iter().map(|r| r.year()).collect();
    years.sort_unstable();
    years.dedup();

    for year in years {
        output.push_str(&format!("{}\n", year.to_string().bold()));
        output.push_str(&format!(
            "  {:<28} {:>6} {:>6} {:>8} {:>7} {:>7}\n",
            "Team", "Win%", "Pod%", "Share", "TDI", "TDI_alt"
        ));

        let mut season: Vec<&ScoredRecord> = records.iter().filter(|r| r.year() == year).collect();
        season.sort_by(|a, b| b.tdi.partial_cmp(&a.tdi).unwrap_or(std::cmp::Ordering::Equal));

        for (i, r) in season.iter().enumerate() {
            let team = if i == 0 {
                r.team().green().bold().to_string()
            } else {
                r.team().to_string()
            };
            output.push_str(&format!(
                "  {:<28} {:>6.1} {:>6.1} {:>8.3} {:>7.3} {:>7.3}\n",
                team,
                r.rates.win_rate * 100.0,
                r.rates.podium_rate * 100.0,
                r.rates.points_share,
                r.tdi,
                r.tdi_alt
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!("Scored {} season-team records\n", records.len()));
    output
}

/// @ai:intent Format a sensitivity report as a string
/// @ai:effects pure
pub fn format_sensitivity(report: &SensitivityReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Csv => to_json(report, false),
        OutputFormat::JsonPretty => to_json(report, true),
        OutputFormat::Text => format_sensitivity_text(report),
    }
}

/// @ai:intent Format a sensitivity report as human-readable text
/// @ai:effects pure
fn format_sensitivity_text(report: &SensitivityReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", "TDI vs TDI_alt ranking sensitivity".bold()));

    let leaders: Vec<_> = report
        .changes
        .iter()
        .filter(|c| c.change_type == ChangeType::LeaderChange)
        .collect();

    let shifts: Vec<_> = report
        .changes
        .iter()
        .filter(|c| c.change_type == ChangeType::Shift)
        .collect();

    if !leaders.is_empty() {
        output.push_str(&format!("{}\n", "LEADER CHANGES".red().bold()));
        for change in leaders {
            output.push_str(&format!(
                "  {} {}: #{} -> #{} (TDI {:.3}, TDI_alt {:.3})\n",
                change.year,
                change.team.cyan(),
                change.tdi_rank,
                change.alt_rank,
                change.tdi,
                change.tdi_alt
            ));
        }
        output.push('\n');
    }

    if !shifts.is_empty() {
        output.push_str(&format!("{}\n", "RANK SHIFTS".yellow().bold()));
        for change in shifts {
            output.push_str(&format!(
                "  {} {}: #{} -> #{}\n",
                change.year,
                change.team.cyan(),
                change.tdi_rank,
                change.alt_rank
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Summary: {} seasons, {} leader changes, {} shifted, {} stable\n",
        report.seasons,
        if report.leader_changes.is_empty() {
            "0".to_string()
        } else {
            report.leader_changes.len().to_string().red().bold().to_string()
        },
        report.shift_count,
        report.stable_count
    ));

    output
}

/// @ai:intent Format a schema check as a string
/// @ai:effects pure
pub fn format_schema(report: &SchemaReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Csv => to_json(report, false),
        OutputFormat::JsonPretty => to_json(report, true),
        OutputFormat::Text => {
            let mut output = String::new();

            for missing in &report.missing {
                output.push_str(&format!(
                    "{} missing required column `{}`\n",
                    "ERROR".red().bold(),
                    missing.column
                ));
                if let Some(hint) = missing.hint() {
                    output.push_str(&format!("  {} {}\n", "hint:".cyan(), hint));
                }
            }

            if !report.has_one_two {
                output.push_str(&format!(
                    "{} no one_two_finishes column; one-two rate defaults to 0\n",
                    "INFO".blue()
                ));
            }

            if report.passed() {
                output.push_str(&format!("{} {} columns checked\n", "OK".green().bold(), report.columns.len()));
            }

            output
        }
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}
