//! @ai:module:intent Aggregate per-race results into season-team records
//! @ai:module:layer application
//! @ai:module:public_api SeasonAggregator, SeasonAggregatorTrait, Aggregation
//! @ai:module:depends_on data
//! @ai:module:stateless true

use crate::data::RaceData;
use std::collections::{BTreeMap, HashMap};
use tdi_engine::SeasonTeamRecord;

/// @ai:intent Trait for turning raw race tables into a season table
pub trait SeasonAggregatorTrait: Send + Sync {
    /// @ai:intent Aggregate raw race data by (year, team)
    fn aggregate(&self, data: &RaceData) -> Aggregation;
}

/// @ai:intent Season table produced from raw data, plus what could not be joined
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub records: Vec<SeasonTeamRecord>,
    /// Results whose race or constructor id is unknown
    pub skipped_results: usize,
}

/// Finishing positions and points of one team in one season, keyed by race
#[derive(Debug, Default)]
struct SeasonTally {
    positions: HashMap<u32, Vec<u32>>,
    points: f64,
}

impl SeasonTally {
    fn record(&mut self, race_id: u32, position: Option<u32>, points: f64) {
        let entry = self.positions.entry(race_id).or_default();
        if let Some(p) = position {
            entry.push(p);
        }
        if points.is_finite() {
            self.points += points;
        }
    }

    fn races_where<F: Fn(&[u32]) -> bool>(&self, predicate: F) -> u32 {
        self.positions.values().filter(|p| predicate(p)).count() as u32
    }

    fn into_record(self, year: i32, team: String) -> SeasonTeamRecord {
        let races = self.positions.len() as u32;
        let wins = self.races_where(|p| p.contains(&1));
        let podiums = self.races_where(|p| p.iter().any(|&pos| (1..=3).contains(&pos)));
        let one_two = self.races_where(|p| p.contains(&1) && p.contains(&2));

        SeasonTeamRecord::new(year, team, races, wins, podiums, self.points).with_one_two(one_two)
    }
}

/// @ai:intent Joins results to races and constructors and counts per season
pub struct SeasonAggregator;

impl SeasonAggregator {
    /// @ai:intent Create a new season aggregator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for SeasonAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SeasonAggregatorTrait for SeasonAggregator {
    /// @ai:intent Count races entered, wins, podiums, one-twos and points per (year, team)
    /// @ai:post records are sorted by (year, team) and wins <= podiums <= races
    /// @ai:effects pure
    fn aggregate(&self, data: &RaceData) -> Aggregation {
        let race_year: HashMap<u32, i32> = data.races.iter().map(|r| (r.race_id, r.year)).collect();
        let team_name: HashMap<u32, &str> = data
            .constructors
            .iter()
            .map(|c| (c.constructor_id, c.name.as_str()))
            .collect();

        let mut tallies: BTreeMap<(i32, String), SeasonTally> = BTreeMap::new();
        let mut skipped_results = 0;

        for result in &data.results {
            let (Some(&year), Some(&team)) = (
                race_year.get(&result.race_id),
                team_name.get(&result.constructor_id),
            ) else {
                skipped_results += 1;
                continue;
            };

            tallies
                .entry((year, team.to_string()))
                .or_default()
                .record(result.race_id, result.position_order, result.points.unwrap_or(0.0));
        }

        if skipped_results > 0 {
            tracing::warn!("Skipped {} results with unknown race or constructor", skipped_results);
        }

        let records = tallies
            .into_iter()
            .map(|((year, team), tally)| tally.into_record(year, team))
            .collect();

        Aggregation {
            records,
            skipped_results,
        }
    }
}
