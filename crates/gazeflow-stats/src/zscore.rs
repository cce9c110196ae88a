//! Z-scores and cumulative-normal percentile scores
//!
//! The ranking layer scores every row against the population of rows it
//! was given: `z = (x - mean) / std` with the population standard
//! deviation, and `percentile = 100 * cdf(z)` under the standard normal
//! distribution. A zero-variance population yields `NaN` scores rather
//! than an error; the caller decides what to do with them.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::descriptive::DescriptiveStats;

/// The standard normal distribution.
///
/// `Normal::new(0, 1)` cannot fail; the unwrap is an invariant, not a
/// runtime condition.
pub(crate) fn std_normal() -> Normal {
    Normal::new(0.0, 1.0).unwrap()
}

/// Standard normal CDF.
#[must_use]
pub fn normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    std_normal().cdf(z)
}

/// Percentile score `100 * cdf(z)` for a z-score, `NaN` passing through.
#[must_use]
pub fn normal_percentile(z: f64) -> f64 {
    100.0 * normal_cdf(z)
}

/// Population z-scores for every value in `values`.
///
/// Returns `None` for empty input. When the population standard
/// deviation is zero every score is `NaN` — degenerate variance
/// propagates, it never raises.
///
/// # Examples
///
/// ```
/// use gazeflow_stats::zscore::z_scores;
///
/// let z = z_scores(&[100.0, 500.0, 900.0]).unwrap();
/// assert_eq!(z[1], 0.0);
/// assert!((z[2] - 1.224_744_871_391_589).abs() < 1e-9);
///
/// let degenerate = z_scores(&[5.0, 5.0, 5.0]).unwrap();
/// assert!(degenerate.iter().all(|z| z.is_nan()));
/// ```
#[must_use]
pub fn z_scores(values: &[f64]) -> Option<Vec<f64>> {
    let stats = DescriptiveStats::new(values.iter().copied())?;
    let scores = values
        .iter()
        .map(|value| {
            if stats.std_dev == 0.0 {
                f64::NAN
            } else {
                (value - stats.mean) / stats.std_dev
            }
        })
        .collect();
    Some(scores)
}

/// Cumulative-normal percentile scores for every value in `values`.
///
/// Equivalent to [`z_scores`] followed by [`normal_percentile`] per
/// element.
#[must_use]
pub fn percentile_scores(values: &[f64]) -> Option<Vec<f64>> {
    Some(z_scores(values)?.into_iter().map(normal_percentile).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(z_scores(&[]).is_none());
        assert!(percentile_scores(&[]).is_none());
    }

    #[test]
    fn test_percentile_scenario() {
        // Three AOIs with TFD means [100, 500, 900]: the middle one sits at
        // the 50th percentile, the extremes near 11.1 / 88.9.
        let scores = percentile_scores(&[100.0, 500.0, 900.0]).unwrap();
        assert!((scores[0] - 11.033).abs() < 0.15);
        assert!((scores[1] - 50.0).abs() < 1e-9);
        assert!((scores[2] - 88.966).abs() < 0.15);
    }

    #[test]
    fn test_percentile_monotonicity() {
        let values = [3.0, 1.0, 4.0, 1.5, 9.0, 2.6];
        let scores = percentile_scores(&values).unwrap();
        for i in 0..values.len() {
            for j in 0..values.len() {
                assert_eq!(values[i] > values[j], scores[i] > scores[j]);
            }
        }
    }

    #[test]
    fn test_zero_variance_propagates_nan() {
        let scores = percentile_scores(&[7.0, 7.0]).unwrap();
        assert!(scores.iter().all(|s| s.is_nan()));
    }
}
