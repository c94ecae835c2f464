//! @ai:module:intent Derive per-record rate metrics from season totals
//! @ai:module:layer domain
//! @ai:module:public_api compute_rates, safe_ratio
//! @ai:module:stateless true

use crate::record::{MetricValues, ScoredRecord, SeasonTeamRecord};
use std::collections::HashMap;

/// @ai:intent Divide, resolving zero denominators and non-finite results to 0
/// @ai:effects pure
/// @ai:post result is finite
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }

    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// @ai:intent Append win, podium, one-two rates and season points share to each record
/// @ai:pre records carry year, team, races, wins, podiums, points
/// @ai:post output has the same length and order as the input
/// @ai:post races == 0 yields zero rates; a zero-point season yields zero shares
/// @ai:effects pure
pub fn compute_rates(records: &[SeasonTeamRecord]) -> Vec<ScoredRecord> {
    let season_points = season_point_totals(records);

    records
        .iter()
        .map(|record| {
            let races = f64::from(record.races);
            let total = season_points.get(&record.year).copied().unwrap_or(0.0);

            let rates = MetricValues {
                win_rate: safe_ratio(f64::from(record.wins), races),
                podium_rate: safe_ratio(f64::from(record.podiums), races),
                points_share: safe_ratio(finite_or_zero(record.points), total),
                one_two_rate: record
                    .one_two_finishes
                    .map(|n| safe_ratio(f64::from(n), races))
                    .unwrap_or(0.0),
            };

            let mut scored = ScoredRecord::unscored(record.clone());
            scored.rates = rates;
            scored
        })
        .collect()
}

/// @ai:intent Sum points per season, ignoring non-finite values
/// @ai:effects pure
fn season_point_totals(records: &[SeasonTeamRecord]) -> HashMap<i32, f64> {
    let mut totals: HashMap<i32, f64> = HashMap::new();

    for record in records {
        *totals.entry(record.year).or_insert(0.0) += finite_or_zero(record.points);
    }

    totals
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_ratio_zero_denominator() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert_eq!(safe_ratio(0.0, 0.0), 0.0);
        assert!((safe_ratio(1.0, 4.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_two_team_points_share() {
        let records = vec![
            SeasonTeamRecord::new(2020, "A", 10, 5, 8, 200.0),
            SeasonTeamRecord::new(2020, "B", 10, 2, 4, 100.0),
        ];

        let rated = compute_rates(&records);

        assert!((rated[0].rates.points_share - 2.0 / 3.0).abs() < 1e-9);
        assert!((rated[1].rates.points_share - 1.0 / 3.0).abs() < 1e-9);
        assert!((rated[0].rates.win_rate - 0.5).abs() < 1e-12);
        assert!((rated[1].rates.podium_rate - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_races_yields_zero_rates() {
        let records = vec![
            SeasonTeamRecord::new(1958, "Ghost", 0, 0, 0, 0.0).with_one_two(0),
            SeasonTeamRecord::new(1958, "Vanwall", 11, 6, 7, 48.0),
        ];

        let rated = compute_rates(&records);

        assert_eq!(rated[0].rates.win_rate, 0.0);
        assert_eq!(rated[0].rates.podium_rate, 0.0);
        assert_eq!(rated[0].rates.one_two_rate, 0.0);
        assert!(rated.iter().all(|r| r.rates.win_rate.is_finite()));
    }

    #[test]
    fn test_zero_point_season_shares_are_zero() {
        let records = vec![
            SeasonTeamRecord::new(1950, "Alfa Romeo", 6, 6, 6, 0.0),
            SeasonTeamRecord::new(1950, "Ferrari", 6, 0, 3, 0.0),
            SeasonTeamRecord::new(1951, "Ferrari", 8, 3, 6, 10.0),
        ];

        let rated = compute_rates(&records);

        assert_eq!(rated[0].rates.points_share, 0.0);
        assert_eq!(rated[1].rates.points_share, 0.0);
        assert!((rated[2].rates.points_share - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_points_share_sums_to_one_per_season() {
        let records = vec![
            SeasonTeamRecord::new(2021, "Mercedes", 22, 9, 22, 613.5),
            SeasonTeamRecord::new(2021, "Red Bull", 22, 11, 22, 585.5),
            SeasonTeamRecord::new(2021, "Ferrari", 22, 0, 5, 323.5),
            SeasonTeamRecord::new(2022, "Red Bull", 22, 17, 22, 759.0),
            SeasonTeamRecord::new(2022, "Ferrari", 22, 4, 20, 554.0),
        ];

        let rated = compute_rates(&records);

        for year in [2021, 2022] {
            let sum: f64 = rated
                .iter()
                .filter(|r| r.year() == year)
                .map(|r| r.rates.points_share)
                .sum();
            assert!((sum - 1.0).abs() < 1e-9, "season {} summed to {}", year, sum);
        }
    }

    #[test]
    fn test_missing_one_two_column_defaults_to_zero() {
        let records = vec![SeasonTeamRecord::new(1988, "McLaren", 16, 15, 16, 199.0)];
        let rated = compute_rates(&records);
        assert_eq!(rated[0].rates.one_two_rate, 0.0);
    }

    #[test]
    fn test_non_finite_points_do_not_leak() {
        let records = vec![
            SeasonTeamRecord::new(2000, "A", 17, 10, 17, f64::NAN),
            SeasonTeamRecord::new(2000, "B", 17, 7, 15, 100.0),
        ];

        let rated = compute_rates(&records);

        assert_eq!(rated[0].rates.points_share, 0.0);
        assert!((rated[1].rates.points_share - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let records = vec![
            SeasonTeamRecord::new(2001, "Z", 1, 0, 0, 1.0),
            SeasonTeamRecord::new(1999, "A", 1, 1, 1, 9.0),
            SeasonTeamRecord::new(2001, "B", 1, 1, 1, 3.0),
        ];

        let teams: Vec<_> = compute_rates(&records)
            .iter()
            .map(|r| r.team().to_string())
            .collect();
        assert_eq!(teams, vec!["Z", "A", "B"]);
    }
}
