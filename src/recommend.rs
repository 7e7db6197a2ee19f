//! Derivation of recommendation constraints from baseline statistics.

use std::collections::HashMap;

use crate::analysis::DescriptiveSummary;
use crate::services::music_api::RecommendationQuery;

/// Closed numeric range for one feature: mean ± one standard deviation,
/// taken from the full-precision summary.
pub fn interval(summary: &DescriptiveSummary) -> (f64, f64) {
    (
        summary.mean - summary.stddev,
        summary.mean + summary.stddev,
    )
}

/// Builds the constraint set for a recommendation lookup from the baseline
/// group's summaries plus its top-ranked genres. Issuing the query is the
/// remote client's job.
pub fn build_query(
    summaries: &[DescriptiveSummary],
    seed_genres: Vec<String>,
) -> RecommendationQuery {
    let bounds: HashMap<String, (f64, f64)> = summaries
        .iter()
        .map(|s| (s.feature.clone(), interval(s)))
        .collect();
    RecommendationQuery {
        seed_genres,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(feature: &str, mean: f64, stddev: f64) -> DescriptiveSummary {
        DescriptiveSummary {
            group: "happy".to_string(),
            feature: feature.to_string(),
            mean,
            stddev,
            std_error: 0.0,
        }
    }

    #[test]
    fn interval_is_mean_plus_minus_stddev() {
        let s = summary("tempo", 120.0, 10.0);
        assert_eq!(interval(&s), (110.0, 130.0));
    }

    #[test]
    fn query_carries_one_bound_per_feature() {
        let summaries = vec![summary("tempo", 120.0, 10.0), summary("energy", 0.6, 0.2)];
        let query = build_query(&summaries, vec!["pop".to_string(), "rock".to_string()]);

        assert_eq!(query.seed_genres, vec!["pop", "rock"]);
        assert_eq!(query.bounds.len(), 2);
        assert_eq!(query.bounds["tempo"], (110.0, 130.0));
        let (lo, hi) = query.bounds["energy"];
        assert!((lo - 0.4).abs() < 1e-12);
        assert!((hi - 0.8).abs() < 1e-12);
    }
}
