//! @ai:module:intent Report generation for pipeline results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, MarkdownReporter, ChartGenerator

pub mod charts;
pub mod json_report;
pub mod markdown_report;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use json_report::{JsonReporter, JsonReporterTrait};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};

use crate::config::ChartConfig;
use crate::results::PipelineResults;
use anyhow::Result;
use std::path::Path;

pub const JSON_REPORT: &str = "results.json";
pub const MARKDOWN_REPORT: &str = "results.md";

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    /// @ai:intent Write the JSON and Markdown reports
    /// @ai:effects fs:write
    pub fn generate_reports(
        &self,
        results: &PipelineResults,
        options: &ChartConfig,
        output_dir: &Path,
    ) -> Result<Vec<String>> {
        std::fs::create_dir_all(output_dir)?;

        self.json.generate(results, &output_dir.join(JSON_REPORT))?;
        self.markdown
            .generate(results, options, &output_dir.join(MARKDOWN_REPORT))?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(vec![JSON_REPORT.to_string(), MARKDOWN_REPORT.to_string()])
    }

    /// @ai:intent Write the PNG charts
    /// @ai:effects fs:write
    pub fn generate_charts(
        &self,
        results: &PipelineResults,
        options: &ChartConfig,
        visuals_dir: &Path,
    ) -> Result<Vec<String>> {
        self.charts.generate_all(results, options, visuals_dir)
    }

    /// @ai:intent Generate all reports, with charts under `visuals/`
    /// @ai:effects fs:write
    pub fn generate_all(
        &self,
        results: &PipelineResults,
        options: &ChartConfig,
        output_dir: &Path,
    ) -> Result<Vec<String>> {
        let mut files = self.generate_reports(results, options, output_dir)?;
        let charts = self.generate_charts(results, options, &output_dir.join("visuals"))?;
        files.extend(charts.into_iter().map(|c| format!("visuals/{}", c)));
        Ok(files)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
