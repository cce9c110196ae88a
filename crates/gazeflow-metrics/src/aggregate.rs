//! Cross-respondent aggregation
//!
//! Folds all per-respondent reductions into one performance row per AOI
//! (or per AOI within a stimulus). The usage pass marks AOIs that too
//! few respondents ever fixated, so the ranking layer can exclude them;
//! the aggregator itself drops nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reduce::AoiReduction;

/// How AOI identity is scoped during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AoiGrouping {
    /// One row per AOI name across all stimuli.
    Global,
    /// One row per (stimulus, AOI) pair.
    PerStimulus,
}

/// Aggregated attention metrics for one AOI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AoiPerformance {
    /// Present under [`AoiGrouping::PerStimulus`], absent globally.
    pub stimulus: Option<String>,
    pub aoi: String,
    pub mean_ttff: f64,
    pub mean_ffd: f64,
    pub mean_tfd: f64,
    /// Distinct respondents contributing at least one reduction.
    pub count: usize,
    /// Whether the AOI clears the usage threshold.
    pub use_value: bool,
}

/// Aggregates `reductions` into performance rows, ordered by stimulus
/// then AOI name.
///
/// `total_respondents` is the batch's N; `usage_threshold` is the
/// minimum `count / N` for `use_value`. A zero N marks every row
/// unusable.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn aggregate(
    reductions: &[AoiReduction],
    grouping: AoiGrouping,
    total_respondents: usize,
    usage_threshold: f64,
) -> Vec<AoiPerformance> {
    let mut groups: BTreeMap<(Option<&str>, &str), Vec<&AoiReduction>> = BTreeMap::new();
    for reduction in reductions {
        let stimulus = match grouping {
            AoiGrouping::Global => None,
            AoiGrouping::PerStimulus => Some(reduction.stimulus.as_str()),
        };
        groups
            .entry((stimulus, &reduction.aoi))
            .or_default()
            .push(reduction);
    }

    groups
        .into_iter()
        .map(|((stimulus, aoi), members)| {
            let n = members.len() as f64;
            let mut respondents: Vec<&str> =
                members.iter().map(|r| r.respondent.as_str()).collect();
            respondents.sort_unstable();
            respondents.dedup();
            let count = respondents.len();

            let use_value = total_respondents > 0
                && count as f64 / total_respondents as f64 >= usage_threshold;
            AoiPerformance {
                stimulus: stimulus.map(ToOwned::to_owned),
                aoi: aoi.to_owned(),
                mean_ttff: members.iter().map(|r| r.ttff).sum::<f64>() / n,
                mean_ffd: members.iter().map(|r| r.ffd).sum::<f64>() / n,
                mean_tfd: members.iter().map(|r| r.tfd).sum::<f64>() / n,
                count,
                use_value,
            }
        })
        .collect()
}

/// Default sample size metric columns are padded to for pairwise
/// comparisons across unequal exposure counts.
pub const DEFAULT_COMPARISON_SAMPLES: usize = 30;

/// Fill value for respondents missing from a comparison sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillPolicy {
    /// Missing respondents contribute zero (dwell-style metrics).
    Zero,
    /// Missing respondents contribute a fixed ceiling, typically the
    /// stimulus duration (latency-style metrics, where absent means
    /// "never looked").
    Ceiling(f64),
}

impl FillPolicy {
    fn fill(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Ceiling(value) => value,
        }
    }
}

/// Pads a metric column up to `target` samples for comparisons across
/// unequal exposure counts.
///
/// Columns already at or above `target` come back unchanged.
#[must_use]
pub fn padded_metric_values(values: &[f64], target: usize, policy: FillPolicy) -> Vec<f64> {
    let mut padded = values.to_vec();
    padded.resize(padded.len().max(target), policy.fill());
    padded
}
