//! Parametric two-sample tests
//!
//! Paired and independent t-tests with two-sided p-values from the
//! Student's t distribution. The independent variant pools the variances;
//! Welch's correction lives with the omnibus tests where the engine needs
//! it.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Outcome of a t-test.
#[derive(Debug, Clone)]
pub struct TTest {
    /// The t statistic.
    pub statistic: f64,
    /// Degrees of freedom used for the p-value.
    pub df: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Two-sided p-value of `t` under a Student's t distribution with `df`
/// degrees of freedom.
#[must_use]
pub(crate) fn t_p_value(t: f64, df: f64) -> f64 {
    if !t.is_finite() || df <= 0.0 {
        return f64::NAN;
    }
    let Ok(dist) = StudentsT::new(0.0, 1.0, df) else {
        return f64::NAN;
    };
    2.0 * (1.0 - dist.cdf(t.abs()))
}

/// Paired t-test on per-subject differences.
///
/// Returns `None` when the samples differ in length or contain fewer than
/// two pairs. Identical samples produce a zero statistic with `p = 1`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn paired_t_test(a: &[f64], b: &[f64]) -> Option<TTest> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let n = a.len() as f64;
    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    let mean = diffs.iter().sum::<f64>() / n;
    let var = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let df = n - 1.0;

    if var <= 0.0 {
        let (statistic, p_value) = if mean == 0.0 {
            (0.0, 1.0)
        } else {
            // Constant non-zero shift: infinitely strong evidence.
            (f64::INFINITY.copysign(mean), 0.0)
        };
        return Some(TTest {
            statistic,
            df,
            p_value,
        });
    }

    let statistic = mean / (var / n).sqrt();
    Some(TTest {
        statistic,
        df,
        p_value: t_p_value(statistic, df),
    })
}

/// Independent two-sample t-test with pooled variance.
///
/// Returns `None` when either sample has fewer than two values. Both
/// samples constant and equal yields `p = 1`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn independent_t_test(a: &[f64], b: &[f64]) -> Option<TTest> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (ma, mb) = (
        a.iter().sum::<f64>() / na,
        b.iter().sum::<f64>() / nb,
    );
    let ssa = a.iter().map(|v| (v - ma).powi(2)).sum::<f64>();
    let ssb = b.iter().map(|v| (v - mb).powi(2)).sum::<f64>();
    let df = na + nb - 2.0;
    let pooled = (ssa + ssb) / df;

    if pooled <= 0.0 {
        let (statistic, p_value) = if ma == mb {
            (0.0, 1.0)
        } else {
            (f64::INFINITY.copysign(ma - mb), 0.0)
        };
        return Some(TTest {
            statistic,
            df,
            p_value,
        });
    }

    let se = (pooled * (1.0 / na + 1.0 / nb)).sqrt();
    let statistic = (ma - mb) / se;
    Some(TTest {
        statistic,
        df,
        p_value: t_p_value(statistic, df),
    })
}

/// Welch's t-test: independent samples without the pooled-variance
/// assumption, Satterthwaite degrees of freedom.
///
/// Returns `None` when either sample has fewer than two values or both
/// samples are internally constant.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Option<TTest> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (ma, mb) = (
        a.iter().sum::<f64>() / na,
        b.iter().sum::<f64>() / nb,
    );
    let va = a.iter().map(|v| (v - ma).powi(2)).sum::<f64>() / (na - 1.0);
    let vb = b.iter().map(|v| (v - mb).powi(2)).sum::<f64>() / (nb - 1.0);
    let (ta, tb) = (va / na, vb / nb);

    if ta + tb <= 0.0 {
        return None;
    }
    let statistic = (ma - mb) / (ta + tb).sqrt();
    let df = (ta + tb).powi(2) / (ta * ta / (na - 1.0) + tb * tb / (nb - 1.0));
    Some(TTest {
        statistic,
        df,
        p_value: t_p_value(statistic, df),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_length_mismatch() {
        assert!(paired_t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_paired_identical_samples() {
        let result = paired_t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_paired_constant_shift() {
        let result = paired_t_test(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0]).unwrap();
        assert_eq!(result.p_value, 0.0);
        assert!(result.statistic.is_infinite() && result.statistic < 0.0);
    }

    #[test]
    fn test_paired_known_value() {
        // Differences [1, 2, 3, 4]: mean 2.5, sd 1.2910, t = 3.873, df 3.
        let a = [5.0, 6.0, 7.0, 8.0];
        let b = [4.0, 4.0, 4.0, 4.0];
        let result = paired_t_test(&a, &b).unwrap();
        assert!((result.statistic - 3.872_983_346).abs() < 1e-6);
        assert!((result.p_value - 0.030_466).abs() < 1e-4);
    }

    #[test]
    fn test_independent_known_value() {
        // Pooled-variance t on two small groups; reference values from a
        // hand calculation: means 2 and 5, pooled var 1, se = sqrt(2/3).
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let result = independent_t_test(&a, &b).unwrap();
        assert!((result.statistic + 3.674_234_614).abs() < 1e-6);
        assert_eq!(result.df, 4.0);
        assert!((result.p_value - 0.021_312).abs() < 1e-4);
    }

    #[test]
    fn test_independent_constant_equal_groups() {
        let result = independent_t_test(&[2.0, 2.0], &[2.0, 2.0]).unwrap();
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_welch_shrinks_df_under_unequal_variance() {
        let tight = [10.0, 10.1, 9.9, 10.05, 9.95];
        let wide = [5.0, 25.0, 0.0, 30.0, -5.0];
        let welch = welch_t_test(&tight, &wide).unwrap();
        let pooled = independent_t_test(&tight, &wide).unwrap();
        assert!(welch.df < pooled.df);
        assert!(welch.df > 4.0 - 1e-9);
        assert!((0.0..=1.0).contains(&welch.p_value));
    }

    #[test]
    fn test_welch_rejects_double_constant() {
        assert!(welch_t_test(&[1.0, 1.0], &[2.0, 2.0]).is_none());
    }
}
