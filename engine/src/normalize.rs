//! @ai:module:intent Min-max normalization of metrics within comparison groups
//! @ai:module:layer domain
//! @ai:module:public_api GroupScope, normalize, normalize_scores, min_max_by_group
//! @ai:module:stateless true

use crate::record::{Metric, ScoreField, ScoredRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// @ai:intent Which records are compared with each other during normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupScope {
    /// Each season is its own group
    #[default]
    Year,
    /// The whole table is one group
    Global,
}

impl GroupScope {
    /// @ai:effects pure
    fn key(&self, record: &ScoredRecord) -> Option<i32> {
        match self {
            GroupScope::Year => Some(record.year()),
            GroupScope::Global => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupScope::Year => "year",
            GroupScope::Global => "global",
        }
    }
}

/// @ai:intent Rescale each (group, value) pair to [0, 1] using min and max of its group
/// @ai:post one output per input, in input order
/// @ai:post a group with zero spread maps every member to 1.0
/// @ai:post non-finite inputs are treated as 0.0
/// @ai:effects pure
pub fn min_max_by_group<K: Eq + Hash + Copy>(keyed: &[(K, f64)]) -> Vec<f64> {
    let clean = |v: f64| if v.is_finite() { v } else { 0.0 };

    let mut bounds: HashMap<K, (f64, f64)> = HashMap::new();
    for (key, value) in keyed {
        let v = clean(*value);
        bounds
            .entry(*key)
            .and_modify(|(lo, hi)| {
                *lo = lo.min(v);
                *hi = hi.max(v);
            })
            .or_insert((v, v));
    }

    keyed
        .iter()
        .map(|(key, value)| {
            let (lo, hi) = bounds[key];
            let spread = hi - lo;
            // Tied (or single-member) groups count as maximally dominant.
            if spread <= 0.0 {
                1.0
            } else {
                ((clean(*value) - lo) / spread).clamp(0.0, 1.0)
            }
        })
        .collect()
}

/// @ai:intent Write `<metric>_norm` for each metric, grouped by the given scope
/// @ai:post every written norm lies in [0, 1]
/// @ai:effects pure (mutates only the passed records)
pub fn normalize(records: &mut [ScoredRecord], metrics: &[Metric], group_by: GroupScope) {
    for metric in metrics {
        let keyed: Vec<(Option<i32>, f64)> = records
            .iter()
            .map(|r| (group_by.key(r), r.rates.get(*metric)))
            .collect();
        let normalized = min_max_by_group(&keyed);

        for (record, norm) in records.iter_mut().zip(normalized) {
            record.norms.set(*metric, norm);
        }
    }
}

/// @ai:intent Normalize one composite score into another score field
/// @ai:effects pure (mutates only the passed records)
pub fn normalize_scores(
    records: &mut [ScoredRecord],
    source: ScoreField,
    target: ScoreField,
    group_by: GroupScope,
) {
    let keyed: Vec<(Option<i32>, f64)> = records
        .iter()
        .map(|r| (group_by.key(r), r.score(source)))
        .collect();

    for (record, norm) in records.iter_mut().zip(min_max_by_group(&keyed)) {
        record.set_score(target, norm);
    }
}
