//! Cross-group comparison: descriptive summaries per (group, feature) and
//! pairwise Welch tests against a baseline with deferred family-wise
//! correction.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::collect::Track;
use crate::services::music_api::FeatureVector;
use crate::stats;

#[derive(Debug, Error)]
pub enum StatsError {
    /// A requested feature key is absent from one of the group's vectors.
    /// Fatal to the statistic; nothing substitutes a default value.
    #[error("feature {feature:?} missing from track {track_id} in group {group:?}")]
    MissingFeature {
        group: String,
        feature: String,
        track_id: String,
    },
    /// Variance-based statistics need at least two observations.
    #[error("group {group:?} has {count} observations of {feature:?}, need at least 2")]
    InsufficientSample {
        group: String,
        feature: String,
        count: usize,
    },
}

/// A named category of tracks with their enriched feature vectors.
#[derive(Debug)]
pub struct Group {
    pub name: String,
    pub vectors: Vec<FeatureVector>,
}

impl Group {
    pub fn new(name: impl Into<String>, vectors: Vec<FeatureVector>) -> Self {
        Self {
            name: name.into(),
            vectors,
        }
    }

    /// Extracts this group's sample for one feature. Every vector must carry
    /// the feature key, and at least two observations are required.
    pub fn feature_samples(&self, feature: &str) -> Result<Vec<f64>, StatsError> {
        let mut samples = Vec::with_capacity(self.vectors.len());
        for vector in &self.vectors {
            match vector.get(feature) {
                Some(v) => samples.push(v),
                None => {
                    return Err(StatsError::MissingFeature {
                        group: self.name.clone(),
                        feature: feature.to_string(),
                        track_id: vector.track_id.clone(),
                    });
                }
            }
        }
        if samples.len() < 2 {
            return Err(StatsError::InsufficientSample {
                group: self.name.clone(),
                feature: feature.to_string(),
                count: samples.len(),
            });
        }
        Ok(samples)
    }
}

/// Builds a group from deduplicated tracks and their enrichment results.
/// Tracks the enricher did not recognize are skipped.
pub fn group_from_tracks(
    name: &str,
    tracks: &[Track],
    features: &HashMap<String, FeatureVector>,
) -> Group {
    let vectors = tracks
        .iter()
        .filter_map(|t| features.get(&t.id).cloned())
        .collect();
    Group::new(name, vectors)
}

/// Mean, sample standard deviation and standard error for one
/// (group, feature) pair. Carried at full precision; rounding happens only
/// in the output layer.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveSummary {
    pub group: String,
    pub feature: String,
    pub mean: f64,
    pub stddev: f64,
    pub std_error: f64,
}

/// One Welch test of a comparison group against the baseline, for one
/// feature. `p_adjusted` is populated only once the whole family of a run
/// is known.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub group: String,
    pub feature: String,
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_raw: f64,
    pub p_adjusted: Option<f64>,
}

/// Computes the descriptive summary for one (group, feature) pair.
pub fn describe(group: &Group, feature: &str) -> Result<DescriptiveSummary, StatsError> {
    let samples = group.feature_samples(feature)?;
    let mean = stats::mean(&samples);
    let stddev = stats::sample_stddev(&samples, mean);
    Ok(DescriptiveSummary {
        group: group.name.clone(),
        feature: feature.to_string(),
        mean,
        stddev,
        std_error: stats::standard_error(stddev, samples.len()),
    })
}

/// Runs one Welch test per (feature, comparison group) pair against the
/// baseline, then applies Bonferroni correction across the entire family.
///
/// Correction is deferred until every raw p-value of the run has been
/// collected: the family size is a property of the run, not of any single
/// test. Each result carries its own (group, feature) identity, so corrected
/// values can never be misattributed if callers reorder the family.
pub fn run_pairwise_tests(
    baseline: &Group,
    comparisons: &[&Group],
    features: &[String],
) -> Result<Vec<TestResult>, StatsError> {
    let mut results = Vec::new();

    for feature in features {
        let base = baseline.feature_samples(feature)?;
        for group in comparisons {
            let sample = group.feature_samples(feature)?;
            let (t, df, p) = stats::welch_t_test(&base, &sample);
            debug!(group = %group.name, feature = %feature, t, p, "welch test");
            results.push(TestResult {
                group: group.name.clone(),
                feature: feature.clone(),
                t_statistic: t,
                degrees_of_freedom: df,
                p_raw: p,
                p_adjusted: None,
            });
        }
    }

    let raw: Vec<f64> = results.iter().map(|r| r.p_raw).collect();
    for (result, adjusted) in results.iter_mut().zip(stats::bonferroni(&raw)) {
        result.p_adjusted = Some(adjusted);
    }

    Ok(results)
}
