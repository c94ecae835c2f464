//! @ai:module:intent Chart generation for pipeline results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator, ChartGeneratorTrait
//! @ai:module:depends_on results, config
//! @ai:module:stateless true

use crate::config::ChartConfig;
use crate::results::PipelineResults;
use anyhow::Result;
use plotters::element::Pie;
use plotters::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tdi_engine::{ScoreField, ScoredRecord};

/// One line per team: (team, points ordered by year)
type TeamSeries = Vec<(String, Vec<(i32, f64)>)>;

/// @ai:intent Trait for chart generation
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Generate all charts from results, returning the file names written
    fn generate_all(&self, results: &PipelineResults, options: &ChartConfig, output_dir: &Path) -> Result<Vec<String>>;
}

/// @ai:intent Generates PNG charts from pipeline results
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Generate top-N teams bar chart for one season
    /// @ai:effects fs:write
    fn generate_top_teams_chart(
        &self,
        data: &[(String, f64)],
        year: i32,
        options: &ChartConfig,
        output_path: &Path,
    ) -> Result<()> {
        let root = BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let n = data.len() as i32;
        let y_max = upper_bound(data.iter().map(|(_, v)| *v));

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Top {} Teams by TDI in {}", data.len(), year), ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(data.len())
            .y_desc("TDI")
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => data
                    .get(*i as usize)
                    .map(|(team, _)| team.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(data.iter().enumerate().map(|(i, (_, tdi))| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *tdi)],
                BLUE.mix(0.7).filled(),
            );
            bar.set_margin(0, 0, 6, 6);
            bar
        }))?;

        root.present()?;
        Ok(())
    }

    /// @ai:intent Generate a multi-team line chart over seasons
    /// @ai:effects fs:write
    fn generate_line_chart(
        &self,
        series: &TeamSeries,
        caption: &str,
        y_desc: &str,
        options: &ChartConfig,
        output_path: &Path,
    ) -> Result<()> {
        let root = BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let years = series.iter().flat_map(|(_, points)| points.iter().map(|(y, _)| *y));
        let min_year = years.clone().min().unwrap_or(0);
        let max_year = years.max().unwrap_or(0).max(min_year + 1);
        let y_max = upper_bound(series.iter().flat_map(|(_, points)| points.iter().map(|(_, v)| *v)));

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(min_year..max_year, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Season")
            .y_desc(y_desc)
            .x_label_formatter(&|y| y.to_string())
            .draw()?;

        for (i, (team, points)) in series.iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(team.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// @ai:intent Generate TDI vs TDI_normalized scatter plot
    /// @ai:effects fs:write
    fn generate_scatter_chart(
        &self,
        records: &[ScoredRecord],
        options: &ChartConfig,
        output_path: &Path,
    ) -> Result<()> {
        let root = BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let x_max = upper_bound(records.iter().map(|r| r.tdi));

        let mut chart = ChartBuilder::on(&root)
            .caption("TDI vs TDI_normalized", ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, 0f64..1.05f64)?;

        chart
            .configure_mesh()
            .x_desc("TDI")
            .y_desc("TDI_normalized")
            .draw()?;

        chart.draw_series(
            records
                .iter()
                .map(|r| Circle::new((r.tdi, r.tdi_normalized), 4, BLUE.mix(0.6).filled())),
        )?;

        root.present()?;
        Ok(())
    }

    /// @ai:intent Generate team-by-season TDI heatmap
    /// @ai:effects fs:write
    fn generate_heatmap(
        &self,
        records: &[ScoredRecord],
        teams: &[String],
        options: &ChartConfig,
        output_path: &Path,
    ) -> Result<()> {
        let team_index: HashMap<&str, i32> = teams
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i as i32))
            .collect();

        let cells: Vec<&ScoredRecord> = records
            .iter()
            .filter(|r| team_index.contains_key(r.team()))
            .collect();

        let mut years: Vec<i32> = cells.iter().map(|r| r.year()).collect();
        years.sort_unstable();
        years.dedup();
        let year_index: HashMap<i32, i32> = years.iter().enumerate().map(|(i, y)| (*y, i as i32)).collect();

        let max_tdi = cells.iter().map(|r| r.tdi).fold(0.0, f64::max);

        let root = BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("TDI by Team and Season", ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(140)
            .build_cartesian_2d(
                (0..years.len() as i32).into_segmented(),
                (0..teams.len() as i32).into_segmented(),
            )?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(years.len().min(20))
            .y_labels(teams.len())
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => years.get(*i as usize).map(|y| y.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|y| match y {
                SegmentValue::CenterOf(i) => teams.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(cells.iter().filter_map(|r| {
            let x = *year_index.get(&r.year())?;
            let y = *team_index.get(r.team())?;
            let ratio = if max_tdi > 0.0 { r.tdi / max_tdi } else { 0.0 };
            let color = HSLColor(0.66 * (1.0 - ratio), 0.8, 0.5);

            Some(Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                color.filled(),
            ))
        }))?;

        root.present()?;
        Ok(())
    }

    /// @ai:intent Generate pie chart of TDI shares among a season's top teams
    /// @ai:effects fs:write
    fn generate_pie_chart(
        &self,
        data: &[(String, f64)],
        year: i32,
        options: &ChartConfig,
        output_path: &Path,
    ) -> Result<()> {
        let root = BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(
            &format!("TDI Share of Top {} Teams in {}", data.len(), year),
            ("sans-serif", 30),
        )?;

        let (width, height) = root.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;

        let sizes: Vec<f64> = data.iter().map(|(_, v)| *v).collect();
        let labels: Vec<&str> = data.iter().map(|(team, _)| team.as_str()).collect();
        let colors: Vec<RGBColor> = (0..data.len())
            .map(|i| {
                let (r, g, b) = Palette99::pick(i).to_backend_color().rgb;
                RGBColor(r, g, b)
            })
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
        root.draw(&pie)?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Axis upper bound with headroom, never zero
/// @ai:effects pure
fn upper_bound<I: Iterator<Item = f64>>(values: I) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// @ai:intent Per-team score series ordered by year, limited to seasons from `from_year`
/// @ai:post teams without any season in range are dropped
/// @ai:effects pure
fn team_series(records: &[ScoredRecord], teams: &[String], field: ScoreField, from_year: i32) -> TeamSeries {
    teams
        .iter()
        .filter_map(|team| {
            let mut points: Vec<(i32, f64)> = records
                .iter()
                .filter(|r| r.team() == team && r.year() >= from_year)
                .map(|r| (r.year(), r.score(field)))
                .collect();

            if points.is_empty() {
                return None;
            }
            points.sort_by_key(|(year, _)| *year);
            Some((team.clone(), points))
        })
        .collect()
}

/// @ai:intent Top teams by mean score over seasons from `from_year`
/// @ai:effects pure
fn top_teams_since(records: &[ScoredRecord], from_year: i32, field: ScoreField, n: usize) -> Vec<String> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for record in records.iter().filter(|r| r.year() >= from_year) {
        let entry = totals.entry(record.team()).or_insert((0.0, 0));
        entry.0 += record.score(field);
        entry.1 += 1;
    }

    let mut means: Vec<(&str, f64)> = totals
        .into_iter()
        .map(|(team, (sum, count))| (team, sum / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    means.into_iter().take(n).map(|(team, _)| team.to_string()).collect()
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Generate every chart that has data, skipping the rest with a warning
    /// @ai:effects fs:write
    fn generate_all(&self, results: &PipelineResults, options: &ChartConfig, output_dir: &Path) -> Result<Vec<String>> {
        std::fs::create_dir_all(output_dir)?;

        let mut generated = Vec::new();

        if results.records.is_empty() {
            tracing::warn!("No scored records; skipping all charts");
            return Ok(generated);
        }

        match results.focus_year(options.focus_year) {
            Some(year) => {
                let top: Vec<(String, f64)> = results
                    .top_teams(year, options.top_n, ScoreField::Tdi)
                    .into_iter()
                    .map(|r| (r.team().to_string(), r.tdi))
                    .collect();

                if top.is_empty() {
                    tracing::warn!("No teams in season {}; skipping bar chart", year);
                } else {
                    let name = format!("top_teams_{}.png", year);
                    self.generate_top_teams_chart(&top, year, options, &output_dir.join(&name))?;
                    generated.push(name);
                }

                let pie: Vec<(String, f64)> = top
                    .into_iter()
                    .take(options.pie_top_n)
                    .filter(|(_, tdi)| *tdi > 0.0)
                    .collect();

                if pie.is_empty() {
                    tracing::warn!("No positive TDI in season {}; skipping pie chart", year);
                } else {
                    let name = format!("dominance_pie_{}.png", year);
                    self.generate_pie_chart(&pie, year, options, &output_dir.join(&name))?;
                    generated.push(name);
                }
            }
            None => tracing::warn!("No focus season; skipping bar and pie charts"),
        }

        let trend_teams = options
            .trend_teams
            .clone()
            .unwrap_or_else(|| results.top_teams_by_mean(options.top_n));
        let trends = team_series(&results.records, &trend_teams, ScoreField::Tdi, i32::MIN);

        if trends.is_empty() {
            tracing::warn!("None of the trend teams have data; skipping trend chart");
        } else {
            let name = "tdi_trends.png".to_string();
            self.generate_line_chart(&trends, "TDI Trends", "TDI", options, &output_dir.join(&name))?;
            generated.push(name);
        }

        let name = "tdi_vs_normalized.png".to_string();
        self.generate_scatter_chart(&results.records, options, &output_dir.join(&name))?;
        generated.push(name);

        let heatmap_teams = results.top_teams_by_mean(options.heatmap_top_n);
        if heatmap_teams.is_empty() {
            tracing::warn!("No teams for heatmap; skipping");
        } else {
            let name = "tdi_heatmap.png".to_string();
            self.generate_heatmap(&results.records, &heatmap_teams, options, &output_dir.join(&name))?;
            generated.push(name);
        }

        if let Some(latest) = results.latest_year() {
            let from_year = latest - options.recent_years.max(1) + 1;
            let teams = top_teams_since(&results.records, from_year, ScoreField::TdiNormalized, options.top_n);
            let recent = team_series(&results.records, &teams, ScoreField::TdiNormalized, from_year);

            if recent.is_empty() {
                tracing::warn!("No seasons since {}; skipping recent dominance chart", from_year);
            } else {
                let name = "recent_dominance.png".to_string();
                let caption = format!("Normalized TDI since {}", from_year);
                self.generate_line_chart(&recent, &caption, "TDI_normalized", options, &output_dir.join(&name))?;
                generated.push(name);
            }
        }

        tracing::info!("Generated {} charts in {}", generated.len(), output_dir.display());
        Ok(generated)
    }
}
