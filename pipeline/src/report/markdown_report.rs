//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::config::ChartConfig;
use crate::results::PipelineResults;
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;
use tdi_engine::{ChangeType, ScoreField};

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from results
    fn generate(&self, results: &PipelineResults, options: &ChartConfig, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from pipeline results
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// @ai:intent Create a new Markdown reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Format a weight as a percentage
    /// @ai:effects pure
    fn format_weight(value: f64) -> String {
        format!("{:.0}%", value * 100.0)
    }

    /// @ai:intent Generate header and weight table
    /// @ai:effects pure
    fn generate_summary(results: &PipelineResults) -> String {
        let mut output = String::new();
        let tdi = &results.engine.weights;
        let alt = &results.engine.alt_weights;

        writeln!(output, "# Team Dominance Index Results").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Date:** {}", results.timestamp).unwrap();
        writeln!(output, "**Seasons:** {}", results.seasons.len()).unwrap();
        writeln!(output, "**Season-team records:** {}", results.records.len()).unwrap();
        writeln!(output, "**Normalized within:** {}", results.engine.group_by.as_str()).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "| Weight | TDI | TDI_alt |").unwrap();
        writeln!(output, "|--------|-----|---------|").unwrap();
        for (name, a, b) in [
            ("Win rate", tdi.win_rate, alt.win_rate),
            ("Podium rate", tdi.podium_rate, alt.podium_rate),
            ("Points share", tdi.points_share, alt.points_share),
            ("One-two rate", tdi.one_two_rate, alt.one_two_rate),
        ] {
            writeln!(
                output,
                "| {} | {} | {} |",
                name,
                Self::format_weight(a),
                Self::format_weight(b)
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Generate season leaders table
    /// @ai:effects pure
    fn generate_leaders_section(results: &PipelineResults) -> String {
        let mut output = String::new();

        writeln!(output, "## Season Leaders").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Year | Teams | Leader | TDI | Runner-up | Margin |").unwrap();
        writeln!(output, "|------|-------|--------|-----|-----------|--------|").unwrap();

        for season in &results.seasons {
            writeln!(
                output,
                "| {} | {} | {} | {:.3} | {} | {:.3} |",
                season.year,
                season.team_count,
                season.leader,
                season.leader_tdi,
                season.runner_up.as_deref().unwrap_or("-"),
                season.margin
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Generate top-N table for the focus season
    /// @ai:effects pure
    fn generate_focus_section(results: &PipelineResults, options: &ChartConfig) -> String {
        let mut output = String::new();

        let Some(year) = results.focus_year(options.focus_year) else {
            return output;
        };

        writeln!(output, "## Top {} Teams in {}", options.top_n, year).unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "| Rank | Team | Win rate | Podium rate | Points share | TDI | TDI_alt |"
        )
        .unwrap();
        writeln!(output, "|------|------|----------|-------------|--------------|-----|---------|").unwrap();

        for (i, record) in results
            .top_teams(year, options.top_n, ScoreField::Tdi)
            .into_iter()
            .enumerate()
        {
            writeln!(
                output,
                "| {} | {} | {:.1}% | {:.1}% | {:.1}% | {:.3} | {:.3} |",
                i + 1,
                record.team(),
                record.rates.win_rate * 100.0,
                record.rates.podium_rate * 100.0,
                record.rates.points_share * 100.0,
                record.tdi,
                record.tdi_alt
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Generate TDI vs TDI_alt sensitivity section
    /// @ai:effects pure
    fn generate_sensitivity_section(results: &PipelineResults) -> String {
        let mut output = String::new();
        let report = &results.sensitivity;

        writeln!(output, "## Weighting Sensitivity").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "{} of {} seasons change leader under TDI_alt; {} ranks shifted, {} stable.",
            report.leader_changes.len(),
            report.seasons,
            report.shift_count,
            report.stable_count
        )
        .unwrap();
        writeln!(output).unwrap();

        let leader_changes: Vec<_> = report
            .changes
            .iter()
            .filter(|c| c.change_type == ChangeType::LeaderChange)
            .collect();

        if !leader_changes.is_empty() {
            writeln!(output, "| Year | Team | TDI rank | TDI_alt rank |").unwrap();
            writeln!(output, "|------|------|----------|--------------|").unwrap();
            for change in leader_changes {
                writeln!(
                    output,
                    "| {} | {} | {} | {} |",
                    change.year, change.team, change.tdi_rank, change.alt_rank
                )
                .unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }

    /// @ai:intent Generate data cleaning section
    /// @ai:effects pure
    fn generate_cleaning_section(results: &PipelineResults) -> String {
        let mut output = String::new();

        if results.cleaning.is_empty() && results.skipped_results == 0 {
            return output;
        }

        writeln!(output, "## Data Quality").unwrap();
        writeln!(output).unwrap();

        if !results.cleaning.is_empty() {
            writeln!(output, "| Table | Rows | Duplicates removed | Columns with nulls |").unwrap();
            writeln!(output, "|-------|------|--------------------|--------------------|").unwrap();
            for report in &results.cleaning {
                writeln!(
                    output,
                    "| {} | {} | {} | {} |",
                    report.name,
                    report.rows_after,
                    report.duplicates_removed,
                    report.null_counts.len()
                )
                .unwrap();
            }
            writeln!(output).unwrap();
        }

        if results.skipped_results > 0 {
            writeln!(
                output,
                "{} race results referenced unknown races or constructors and were skipped.",
                results.skipped_results
            )
            .unwrap();
            writeln!(output).unwrap();
        }

        output
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Generate Markdown report to file
    /// @ai:effects fs:write
    fn generate(&self, results: &PipelineResults, options: &ChartConfig, output_path: &Path) -> Result<()> {
        let mut content = String::new();

        content.push_str(&Self::generate_summary(results));
        content.push_str(&Self::generate_leaders_section(results));
        content.push_str(&Self::generate_focus_section(results, options));
        content.push_str(&Self::generate_sensitivity_section(results));
        content.push_str(&Self::generate_cleaning_section(results));

        std::fs::write(output_path, content)?;
        Ok(())
    }
}
