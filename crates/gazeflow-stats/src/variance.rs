//! Homogeneity-of-variance test
//!
//! Brown-Forsythe variant of Levene's test: absolute deviations from the
//! group medians are fed through a one-way ANOVA F-test. The significance
//! engine uses the outcome to choose between classic and Welch's ANOVA.

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::descriptive::{mean, median};

/// Result of a homogeneity-of-variance check.
#[derive(Debug, Clone)]
pub struct VarianceTest {
    /// The F statistic on the absolute median deviations.
    pub statistic: f64,
    /// Upper-tail p-value.
    pub p_value: f64,
    /// Whether the group variances look equal at the supplied alpha
    /// (`p_value > alpha`).
    pub equal_variance: bool,
}

/// Runs the Brown-Forsythe test across `groups` at significance level
/// `alpha`.
///
/// Returns `None` when fewer than two groups are given or any group has
/// fewer than two values. Degenerate deviations (all groups internally
/// constant) yield a `NaN` statistic flagged as equal variance, so the
/// engine falls through to the parametric branch.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn brown_forsythe(groups: &[&[f64]], alpha: f64) -> Option<VarianceTest> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.len() < 2) {
        return None;
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|group| {
            let med = median(group);
            group.iter().map(|v| (v - med).abs()).collect()
        })
        .collect();

    let n_total: usize = deviations.iter().map(Vec::len).sum();
    let grand_mean = mean(&deviations.iter().flatten().copied().collect::<Vec<_>>());

    let ss_between: f64 = deviations
        .iter()
        .map(|d| d.len() as f64 * (mean(d) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = deviations
        .iter()
        .map(|d| {
            let m = mean(d);
            d.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;

    if ss_within <= 0.0 {
        // Deviations are constant within every group; nothing to test.
        return Some(VarianceTest {
            statistic: f64::NAN,
            p_value: f64::NAN,
            equal_variance: true,
        });
    }

    let statistic = (ss_between / df_between) / (ss_within / df_within);
    let dist = FisherSnedecor::new(df_between, df_within).ok()?;
    let p_value = 1.0 - dist.cdf(statistic);

    Some(VarianceTest {
        statistic,
        p_value,
        equal_variance: p_value > alpha,
    })
}
