//! Batch pipeline
//!
//! Drives one batch end to end: viewing split and rebase, per-AOI
//! segmentation, reduction, cross-respondent aggregation, and percentile
//! ranking. Failures local to one respondent are collected and reported
//! at the end, never allowed to abort the batch; only an empty batch is
//! fatal.

use gazeflow_events::stream::EventStream;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{AoiGrouping, AoiPerformance, aggregate};
use crate::config::MetricsConfig;
use crate::rank::{BrandProminence, Metric, MetricRank, brand_prominence, rank_aoi_metrics};
use crate::reduce::AoiReduction;
use crate::segment::{Fixation, admitted_fixations};

/// One admitted fixation with its full grouping context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixationRecord {
    pub respondent: String,
    pub stimulus: String,
    pub viewing: u32,
    pub aoi: String,
    #[serde(flatten)]
    pub fixation: Fixation,
}

/// A respondent whose file was dropped from the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRespondent {
    pub respondent: String,
    pub reason: String,
}

/// Everything one batch run produces.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// One row per admitted fixation.
    pub fixations: Vec<FixationRecord>,
    /// One row per (respondent, stimulus, viewing, AOI) with admitted
    /// fixations.
    pub reductions: Vec<AoiReduction>,
    /// Per-stimulus AOI performance, every fixated AOI included.
    pub performance: Vec<AoiPerformance>,
    /// Percentile ranks over the usable performance rows, all three
    /// metrics.
    pub ranks: Vec<MetricRank>,
    /// Per-stimulus total-dwell prominence over the usable rows.
    pub prominence: Vec<BrandProminence>,
    pub skipped: Vec<SkippedRespondent>,
}

/// Batch-fatal failures.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BatchError {
    #[display("no event streams in the batch")]
    NoInput,
}

/// Runs the whole pipeline over one batch of respondent streams.
///
/// # Errors
///
/// Returns [`BatchError::NoInput`] when `streams` is empty. Everything
/// else is recoverable: respondents whose streams cannot be rebased are
/// reported in [`BatchReport::skipped`].
pub fn run_batch(
    streams: &[EventStream],
    config: &MetricsConfig,
) -> Result<BatchReport, BatchError> {
    if streams.is_empty() {
        return Err(BatchError::NoInput);
    }

    let mut respondents: Vec<&str> = streams.iter().map(|s| s.respondent.as_str()).collect();
    respondents.sort_unstable();
    respondents.dedup();
    let total_respondents = respondents.len();

    let mut fixations = Vec::new();
    let mut reductions = Vec::new();
    let mut skipped = Vec::new();

    for stream in streams {
        let viewings = match stream.viewings() {
            Ok(viewings) => viewings,
            Err(err) => {
                warn!(respondent = stream.respondent, %err, "skipping respondent");
                skipped.push(SkippedRespondent {
                    respondent: stream.respondent.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        for viewing in viewings {
            let viewing = match config.stimulus_duration_ms {
                Some(duration) => viewing.clipped_to(duration),
                None => viewing,
            };
            for aoi in viewing.aois() {
                let admitted =
                    admitted_fixations(viewing.events_for_aoi(aoi), &config.window);
                if admitted.is_empty() {
                    debug!(
                        respondent = viewing.respondent,
                        stimulus = viewing.stimulus,
                        aoi,
                        "no admitted fixations"
                    );
                    continue;
                }
                if let Some(reduction) = AoiReduction::from_fixations(
                    viewing.respondent.clone(),
                    viewing.stimulus.clone(),
                    viewing.viewing,
                    aoi,
                    &admitted,
                ) {
                    reductions.push(reduction);
                }
                fixations.extend(admitted.into_iter().map(|fixation| FixationRecord {
                    respondent: viewing.respondent.clone(),
                    stimulus: viewing.stimulus.clone(),
                    viewing: viewing.viewing,
                    aoi: aoi.to_owned(),
                    fixation,
                }));
            }
        }
    }

    let performance = aggregate(
        &reductions,
        AoiGrouping::PerStimulus,
        total_respondents,
        config.usage_threshold,
    );
    let usable: Vec<AoiPerformance> = performance
        .iter()
        .filter(|row| row.use_value)
        .cloned()
        .collect();
    let ranks = rank_aoi_metrics(&usable, &[Metric::Ttff, Metric::Ffd, Metric::Tfd]);
    let prominence = brand_prominence(&usable, Metric::Tfd);

    info!(
        respondents = total_respondents,
        fixations = fixations.len(),
        reductions = reductions.len(),
        aois = performance.len(),
        skipped = skipped.len(),
        "batch complete"
    );
    Ok(BatchReport {
        fixations,
        reductions,
        performance,
        ranks,
        prominence,
        skipped,
    })
}
