//! @ai:module:intent Compare per-season rankings under TDI and TDI_alt
//! @ai:module:layer application
//! @ai:module:public_api compare_rankings, rank_season, SensitivityReport, RankChange, ChangeType
//! @ai:module:depends_on record
//! @ai:module:stateless true

use crate::record::{ScoreField, ScoredRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// @ai:intent How much a team's position moved between the two scores
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// The season winner differs, and this team gained or lost first place
    LeaderChange,
    Shift,
}

/// @ai:intent A team whose rank differs between TDI and TDI_alt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankChange {
    pub year: i32,
    pub team: String,
    pub change_type: ChangeType,
    pub tdi_rank: usize,
    pub alt_rank: usize,
    pub tdi: f64,
    pub tdi_alt: f64,
}

impl RankChange {
    /// @ai:intent Positive when the team ranks better under TDI_alt
    pub fn delta(&self) -> i64 {
        self.tdi_rank as i64 - self.alt_rank as i64
    }
}

/// @ai:intent Result of comparing the two composite rankings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SensitivityReport {
    pub seasons: usize,
    pub changes: Vec<RankChange>,
    pub leader_changes: Vec<i32>,
    pub leader_change_count: usize,
    pub shift_count: usize,
    pub stable_count: usize,
}

impl SensitivityReport {
    /// @ai:intent Check if any season crowns a different leader under TDI_alt
    pub fn has_leader_changes(&self) -> bool {
        !self.leader_changes.is_empty()
    }

    /// @ai:intent Add a change and update counts
    fn add_change(&mut self, change: RankChange) {
        match change.change_type {
            ChangeType::LeaderChange => self.leader_change_count += 1,
            ChangeType::Shift => self.shift_count += 1,
        }
        self.changes.push(change);
    }
}

/// @ai:intent Order a season's records by a score, best first
/// @ai:post ties are broken by team name so the order is deterministic
/// @ai:effects pure
pub fn rank_season<'a>(season: &[&'a ScoredRecord], field: ScoreField) -> Vec<&'a ScoredRecord> {
    let mut ranked = season.to_vec();
    ranked.sort_by(|a, b| {
        b.score(field)
            .partial_cmp(&a.score(field))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.team().cmp(b.team()))
    });
    ranked
}

/// @ai:intent Compare TDI and TDI_alt rankings season by season
/// @ai:pre records carry both composite scores
/// @ai:effects pure
pub fn compare_rankings(records: &[ScoredRecord]) -> SensitivityReport {
    let mut by_year: BTreeMap<i32, Vec<&ScoredRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year()).or_default().push(record);
    }

    let mut report = SensitivityReport {
        seasons: by_year.len(),
        ..Default::default()
    };

    for (year, season) in &by_year {
        let primary = rank_season(season, ScoreField::Tdi);
        let alternate = rank_season(season, ScoreField::TdiAlt);

        let alt_rank: BTreeMap<&str, usize> = alternate
            .iter()
            .enumerate()
            .map(|(i, r)| (r.team(), i + 1))
            .collect();

        let leader_changed = match (primary.first(), alternate.first()) {
            (Some(a), Some(b)) => a.team() != b.team(),
            _ => false,
        };
        if leader_changed {
            report.leader_changes.push(*year);
        }

        for (i, record) in primary.iter().enumerate() {
            let tdi_rank = i + 1;
            let alt = alt_rank.get(record.team()).copied().unwrap_or(tdi_rank);

            if alt == tdi_rank {
                report.stable_count += 1;
                continue;
            }

            let change_type = if leader_changed && (tdi_rank == 1 || alt == 1) {
                ChangeType::LeaderChange
            } else {
                ChangeType::Shift
            };

            report.add_change(RankChange {
                year: *year,
                team: record.team().to_string(),
                change_type,
                tdi_rank,
                alt_rank: alt,
                tdi: record.tdi,
                tdi_alt: record.tdi_alt,
            });
        }
    }

    report
}
