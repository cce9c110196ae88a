//! Percentile ranking of aggregated metrics
//!
//! Scores each performance row against the population of rows it was
//! handed: z-score against the population mean and standard deviation,
//! percentile through the standard normal CDF. The ranker applies no
//! usage filtering; callers pre-filter by `use_value` when they want
//! exclusion. Brand prominence re-aggregates one metric at the stimulus
//! level and ranks the sums the same way.

use gazeflow_stats::zscore::{percentile_scores, z_scores};
use serde::{Deserialize, Serialize};

use crate::aggregate::AoiPerformance;

/// The rankable attention metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Metric {
    #[display("TTFF")]
    Ttff,
    #[display("FFD")]
    Ffd,
    #[display("TFD")]
    Tfd,
}

impl Metric {
    /// Reads this metric's mean off a performance row.
    #[must_use]
    pub fn of(self, row: &AoiPerformance) -> f64 {
        match self {
            Self::Ttff => row.mean_ttff,
            Self::Ffd => row.mean_ffd,
            Self::Tfd => row.mean_tfd,
        }
    }
}

/// One row's score for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRank {
    pub stimulus: Option<String>,
    pub aoi: String,
    pub metric: Metric,
    pub value: f64,
    /// `NaN` when the population has zero variance.
    pub z_score: f64,
    /// `100 * cdf(z)`, `NaN` alongside the z-score.
    pub percentile: f64,
}

/// Ranks `rows` on every requested metric, each against its own
/// population mean and deviation.
///
/// Returns one [`MetricRank`] per row per metric, rows in input order
/// within each metric. Empty input yields empty output.
#[must_use]
pub fn rank_aoi_metrics(rows: &[AoiPerformance], metrics: &[Metric]) -> Vec<MetricRank> {
    let mut ranks = Vec::with_capacity(rows.len() * metrics.len());
    for &metric in metrics {
        let values: Vec<f64> = rows.iter().map(|row| metric.of(row)).collect();
        let Some(z) = z_scores(&values) else {
            continue;
        };
        let Some(pct) = percentile_scores(&values) else {
            continue;
        };
        for (((row, value), z_score), percentile) in rows.iter().zip(values).zip(z).zip(pct) {
            ranks.push(MetricRank {
                stimulus: row.stimulus.clone(),
                aoi: row.aoi.clone(),
                metric,
                value,
                z_score,
                percentile,
            });
        }
    }
    ranks
}

/// A stimulus's summed metric ranked across stimuli.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandProminence {
    pub stimulus: String,
    pub metric: Metric,
    /// Sum of the metric over the stimulus's AOI rows.
    pub total: f64,
    pub z_score: f64,
    pub percentile: f64,
}

/// Sums one metric per stimulus and percentile-ranks the sums.
///
/// Rows without a stimulus (global grouping) are ignored; call this
/// with per-stimulus performance rows.
#[must_use]
pub fn brand_prominence(rows: &[AoiPerformance], metric: Metric) -> Vec<BrandProminence> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for row in rows {
        let Some(stimulus) = &row.stimulus else {
            continue;
        };
        match totals.iter_mut().find(|(name, _)| name == stimulus) {
            Some((_, total)) => *total += metric.of(row),
            None => totals.push((stimulus.clone(), metric.of(row))),
        }
    }

    let values: Vec<f64> = totals.iter().map(|(_, total)| *total).collect();
    let (Some(z), Some(pct)) = (z_scores(&values), percentile_scores(&values)) else {
        return Vec::new();
    };
    totals
        .into_iter()
        .zip(z)
        .zip(pct)
        .map(|(((stimulus, total), z_score), percentile)| BrandProminence {
            stimulus,
            metric,
            total,
            z_score,
            percentile,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(stimulus: &str, aoi: &str, tfd: f64) -> AoiPerformance {
        AoiPerformance {
            stimulus: Some(stimulus.to_owned()),
            aoi: aoi.to_owned(),
            mean_ttff: 1000.0 - tfd,
            mean_ffd: tfd / 2.0,
            mean_tfd: tfd,
            count: 2,
            use_value: true,
        }
    }

    #[test]
    fn test_rank_single_metric() {
        let rows = [
            row("AdX", "Claim", 100.0),
            row("AdX", "Logo", 500.0),
            row("AdX", "Price", 900.0),
        ];
        let ranks = rank_aoi_metrics(&rows, &[Metric::Tfd]);
        assert_eq!(ranks.len(), 3);
        assert_eq!(ranks[1].percentile, 50.0);
        assert!((ranks[2].percentile - 88.97).abs() < 0.2);
        assert!((ranks[0].percentile - 11.03).abs() < 0.2);
    }

    #[test]
    fn test_each_metric_ranks_against_its_own_population() {
        let rows = [row("AdX", "Claim", 100.0), row("AdX", "Logo", 900.0)];
        let ranks = rank_aoi_metrics(&rows, &[Metric::Tfd, Metric::Ttff]);
        assert_eq!(ranks.len(), 4);
        let tfd_logo = ranks
            .iter()
            .find(|r| r.metric == Metric::Tfd && r.aoi == "Logo")
            .unwrap();
        let ttff_logo = ranks
            .iter()
            .find(|r| r.metric == Metric::Ttff && r.aoi == "Logo")
            .unwrap();
        // Logo dwells longest but is also fixated earliest.
        assert!(tfd_logo.percentile > 50.0);
        assert!(ttff_logo.percentile < 50.0);
    }

    #[test]
    fn test_zero_variance_propagates_nan() {
        let rows = [row("AdX", "A", 300.0), row("AdX", "B", 300.0)];
        let ranks = rank_aoi_metrics(&rows, &[Metric::Tfd]);
        assert!(ranks.iter().all(|r| r.z_score.is_nan() && r.percentile.is_nan()));
    }

    #[test]
    fn test_brand_prominence_sums_per_stimulus() {
        let rows = [
            row("AdX", "Logo", 300.0),
            row("AdX", "Price", 100.0),
            row("AdY", "Logo", 500.0),
            row("AdY", "Price", 700.0),
            row("AdZ", "Logo", 50.0),
            row("AdZ", "Price", 50.0),
        ];
        let prominence = brand_prominence(&rows, Metric::Tfd);
        assert_eq!(prominence.len(), 3);
        let totals: Vec<(&str, f64)> = prominence
            .iter()
            .map(|p| (p.stimulus.as_str(), p.total))
            .collect();
        assert_eq!(totals, vec![("AdX", 400.0), ("AdY", 1200.0), ("AdZ", 100.0)]);
        let ady = &prominence[1];
        assert!(ady.percentile > 80.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_aoi_metrics(&[], &[Metric::Tfd]).is_empty());
        assert!(brand_prominence(&[], Metric::Tfd).is_empty());
    }
}
