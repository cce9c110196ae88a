//! Omnibus tests for three or more groups
//!
//! One-way ANOVA for homoscedastic groups, Welch's ANOVA when the
//! variances differ, and Kruskal-Wallis when the residuals are not
//! normal. All three reduce k groups to a single p-value; pairwise
//! attribution is the post-hoc layer's job.

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};

use crate::descriptive::{mean, sample_variance};
use crate::rank_tests::mid_ranks;

/// Outcome of an omnibus test.
#[derive(Debug, Clone)]
pub struct OmnibusTest {
    /// F statistic (or H for Kruskal-Wallis).
    pub statistic: f64,
    /// Numerator degrees of freedom.
    pub df_between: f64,
    /// Denominator degrees of freedom (`NaN` for Kruskal-Wallis).
    pub df_within: f64,
    /// Upper-tail p-value.
    pub p_value: f64,
}

/// Residuals of every value against its own group mean, concatenated.
///
/// The engine feeds these to the normality test to validate the ANOVA
/// assumption after the fact.
#[must_use]
pub fn residuals(groups: &[&[f64]]) -> Vec<f64> {
    groups
        .iter()
        .flat_map(|group| {
            let m = mean(group);
            group.iter().map(move |v| v - m)
        })
        .collect()
}

/// Classic one-way ANOVA.
///
/// Returns `None` for fewer than two groups or any group with fewer than
/// two values. Zero within-group variance collapses to `p = 1` when the
/// means agree and `p = 0` when they do not.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn one_way_anova(groups: &[&[f64]]) -> Option<OmnibusTest> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.len() < 2) {
        return None;
    }
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let grand_mean = mean(&groups.iter().flat_map(|g| g.iter().copied()).collect::<Vec<_>>());

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;

    if ss_within <= 0.0 {
        let (statistic, p_value) = if ss_between <= 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY, 0.0)
        };
        return Some(OmnibusTest {
            statistic,
            df_between,
            df_within,
            p_value,
        });
    }

    let statistic = (ss_between / df_between) / (ss_within / df_within);
    let dist = FisherSnedecor::new(df_between, df_within).ok()?;
    Some(OmnibusTest {
        statistic,
        df_between,
        df_within,
        p_value: 1.0 - dist.cdf(statistic),
    })
}

/// Welch's heteroscedastic ANOVA with Satterthwaite denominator degrees
/// of freedom.
///
/// Returns `None` for fewer than two groups, any group with fewer than
/// two values, or any internally constant group (zero variance breaks
/// the weighting).
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn welch_anova(groups: &[&[f64]]) -> Option<OmnibusTest> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.len() < 2) {
        return None;
    }
    let kf = k as f64;

    let stats: Vec<(f64, f64, f64)> = groups
        .iter()
        .map(|g| (g.len() as f64, mean(g), sample_variance(g)))
        .collect();
    if stats.iter().any(|(_, _, var)| *var <= 0.0) {
        return None;
    }

    let weights: Vec<f64> = stats.iter().map(|(n, _, var)| n / var).collect();
    let weight_sum: f64 = weights.iter().sum();
    let weighted_mean: f64 = stats
        .iter()
        .zip(&weights)
        .map(|((_, m, _), w)| w * m)
        .sum::<f64>()
        / weight_sum;

    let numerator: f64 = stats
        .iter()
        .zip(&weights)
        .map(|((_, m, _), w)| w * (m - weighted_mean).powi(2))
        .sum::<f64>()
        / (kf - 1.0);

    let lambda: f64 = stats
        .iter()
        .zip(&weights)
        .map(|((n, _, _), w)| (1.0 - w / weight_sum).powi(2) / (n - 1.0))
        .sum();

    let statistic = numerator / (1.0 + 2.0 * (kf - 2.0) / (kf * kf - 1.0) * lambda);
    let df_between = kf - 1.0;
    let df_within = (kf * kf - 1.0) / (3.0 * lambda);

    let dist = FisherSnedecor::new(df_between, df_within).ok()?;
    Some(OmnibusTest {
        statistic,
        df_between,
        df_within,
        p_value: 1.0 - dist.cdf(statistic),
    })
}

/// Kruskal-Wallis H test with tie correction.
///
/// Returns `None` for fewer than two groups or any empty group. All
/// values identical yields `p = 1`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn kruskal_wallis(groups: &[&[f64]]) -> Option<OmnibusTest> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return None;
    }
    let combined: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let n = combined.len() as f64;
    if n < 3.0 {
        return None;
    }
    let (ranks, tie_sizes) = mid_ranks(&combined);

    let mut h = 0.0;
    let mut offset = 0;
    for group in groups {
        let rank_sum: f64 = ranks[offset..offset + group.len()].iter().sum();
        h += rank_sum * rank_sum / group.len() as f64;
        offset += group.len();
    }
    h = 12.0 / (n * (n + 1.0)) * h - 3.0 * (n + 1.0);

    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let correction = 1.0 - tie_term / (n * n * n - n);
    let df_between = (k - 1) as f64;

    if correction <= 0.0 {
        // Every value tied with every other.
        return Some(OmnibusTest {
            statistic: 0.0,
            df_between,
            df_within: f64::NAN,
            p_value: 1.0,
        });
    }

    let statistic = h / correction;
    let dist = ChiSquared::new(df_between).ok()?;
    Some(OmnibusTest {
        statistic,
        df_between,
        df_within: f64::NAN,
        p_value: 1.0 - dist.cdf(statistic),
    })
}
