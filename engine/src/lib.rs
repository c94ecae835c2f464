//! @ai:module:intent Team Dominance Index metric engine for Formula 1 constructor seasons
//! @ai:module:layer domain
//! @ai:module:public_api record, rates, normalize, composite, engine, schema, table, sensitivity, output, error
//! @ai:module:stateless true
//!
//! # TDI Engine
//!
//! Turns a season-team results table (one row per constructor per season) into
//! rate metrics, per-season min-max normalized metrics, and two weighted
//! composite dominance scores (`TDI` and `TDI_alt`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use tdi_engine::{build_all_metrics, output, table};
//! use std::path::Path;
//!
//! let season = table::read_season_table(Path::new("team_year_summary.csv")).unwrap();
//! let scored = build_all_metrics(&season.records);
//! println!("{}", output::format_scored(&scored, output::OutputFormat::Text));
//! ```

pub mod composite;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod output;
pub mod rates;
pub mod record;
pub mod schema;
pub mod sensitivity;
pub mod table;

pub use composite::{compute_composite, MetricWeights};
pub use engine::{build_all_metrics, EngineConfig, MetricEngine};
pub use error::{Error, Result};
pub use normalize::{min_max_by_group, normalize, normalize_scores, GroupScope};
pub use output::{format_schema, format_scored, format_sensitivity, to_json, OutputFormat};
pub use rates::{compute_rates, safe_ratio};
pub use record::{Metric, MetricValues, ScoreField, ScoredRecord, ScoredRow, SeasonTeamRecord, NULL_MARKERS};
pub use schema::{check_columns, normalize_header, MissingColumn, SchemaReport, REQUIRED_COLUMNS};
pub use sensitivity::{compare_rankings, rank_season, ChangeType, RankChange, SensitivityReport};
pub use table::{
    read_scored_table, read_season_csv, read_season_table, write_scored_csv, write_scored_table,
    SeasonTable,
};
