//! Pairwise post-hoc tests
//!
//! After a significant omnibus result the engine attributes the effect to
//! specific pairs: Tukey HSD (equal variances), Games-Howell (unequal
//! variances), or Dunn's rank test with Holm adjustment (after
//! Kruskal-Wallis). Tukey and Games-Howell need the studentized-range
//! distribution, which statrs does not carry, so its CDF is evaluated by
//! Gauss-Legendre quadrature over the standard double-integral form.

use statrs::function::gamma::ln_gamma;

use crate::descriptive::{mean, sample_variance};
use crate::rank_tests::mid_ranks;
use crate::zscore::normal_cdf;

/// One pairwise comparison from a post-hoc test.
///
/// `a` and `b` index into the group slice the test was called with.
#[derive(Debug, Clone)]
pub struct PairwiseComparison {
    pub a: usize,
    pub b: usize,
    /// q statistic for Tukey/Games-Howell, |z| for Dunn.
    pub statistic: f64,
    /// Adjusted two-sided p-value.
    pub p_value: f64,
}

/// Gauss-Legendre nodes and weights on `[-1, 1]`.
///
/// Nodes are the roots of the degree-`n` Legendre polynomial, found by
/// Newton iteration from the Chebyshev initial guess.
#[expect(clippy::cast_precision_loss)]
fn gauss_legendre(n: usize) -> Vec<(f64, f64)> {
    let mut rules = Vec::with_capacity(n);
    let nf = n as f64;
    for i in 0..n {
        let mut x = (std::f64::consts::PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        loop {
            // Evaluate P_n(x) and P_{n-1}(x) via the recurrence.
            let (mut p0, mut p1) = (1.0, x);
            for j in 2..=n {
                let jf = j as f64;
                let p2 = ((2.0 * jf - 1.0) * x * p1 - (jf - 1.0) * p0) / jf;
                p0 = p1;
                p1 = p2;
            }
            let dp = nf * (x * p1 - p0) / (x * x - 1.0);
            let dx = p1 / dp;
            x -= dx;
            if dx.abs() < 1e-14 {
                let weight = 2.0 / ((1.0 - x * x) * dp * dp);
                rules.push((x, weight));
                break;
            }
        }
    }
    rules
}

/// Integrates `f` over `[lo, hi]` with a fixed Gauss-Legendre rule.
fn integrate(rule: &[(f64, f64)], lo: f64, hi: f64, f: impl Fn(f64) -> f64) -> f64 {
    let half = (hi - lo) / 2.0;
    let mid = (lo + hi) / 2.0;
    rule.iter()
        .map(|&(x, w)| w * f(mid + half * x))
        .sum::<f64>()
        * half
}

/// Probability that the range of `k` standard normal draws stays below
/// `x`, times the density ordering factor.
fn range_probability(rule: &[(f64, f64)], x: f64, k: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let density = |z: f64| (-z * z / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let inner = |z: f64| {
        let span = normal_cdf(z) - normal_cdf(z - x);
        density(z) * span.powf(k - 1.0)
    };
    // The normal density kills everything outside [-8, 8] regardless of x.
    k * integrate(rule, -8.0, 8.0, inner)
}

/// CDF of the studentized range distribution with `k` groups and `df`
/// error degrees of freedom.
///
/// Returns `NaN` for invalid parameters. `df` above 10 000 is treated as
/// infinite, where the scale factor integrates out.
#[must_use]
pub fn studentized_range_cdf(q: f64, k: f64, df: f64) -> f64 {
    if k.is_nan() || k < 2.0 || df.is_nan() || df < 1.0 || q.is_nan() {
        return f64::NAN;
    }
    if q <= 0.0 {
        return 0.0;
    }
    let rule = gauss_legendre(48);
    if df > 10_000.0 {
        return range_probability(&rule, q, k).clamp(0.0, 1.0);
    }

    // Density of s = chi_df / sqrt(df), integrated in pieces to keep the
    // quadrature honest near the mode.
    let ln_norm =
        (df / 2.0) * (df.ln() - std::f64::consts::LN_2) + std::f64::consts::LN_2 - ln_gamma(df / 2.0);
    let s_density = |s: f64| {
        if s <= 0.0 {
            0.0
        } else {
            (ln_norm + (df - 1.0) * s.ln() - df * s * s / 2.0).exp()
        }
    };
    let outer = |s: f64| s_density(s) * range_probability(&rule, q * s, k);

    let cuts = [0.0, 0.5, 1.0, 1.5, 2.5, 4.0, 8.0];
    let total: f64 = cuts
        .windows(2)
        .map(|w| integrate(&rule, w[0], w[1], outer))
        .sum();
    total.clamp(0.0, 1.0)
}

/// Tukey's HSD (Tukey-Kramer for unequal sizes).
///
/// Returns `None` for fewer than two groups, any group with fewer than
/// two values, or zero pooled within-group variance.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn tukey_hsd(groups: &[&[f64]]) -> Option<Vec<PairwiseComparison>> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.len() < 2) {
        return None;
    }
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let df_within = (n_total - k) as f64;
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();
    if ss_within <= 0.0 {
        return None;
    }
    let msw = ss_within / df_within;

    let mut comparisons = Vec::new();
    for i in 0..k {
        for j in i + 1..k {
            let (ni, nj) = (groups[i].len() as f64, groups[j].len() as f64);
            let se = (msw / 2.0 * (1.0 / ni + 1.0 / nj)).sqrt();
            let q = (mean(groups[i]) - mean(groups[j])).abs() / se;
            comparisons.push(PairwiseComparison {
                a: i,
                b: j,
                statistic: q,
                p_value: 1.0 - studentized_range_cdf(q, k as f64, df_within),
            });
        }
    }
    Some(comparisons)
}

/// Games-Howell: Tukey's HSD without the equal-variance assumption, with
/// Welch-Satterthwaite degrees of freedom per pair.
///
/// Returns `None` for fewer than two groups, any group with fewer than
/// two values, or any internally constant group.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn games_howell(groups: &[&[f64]]) -> Option<Vec<PairwiseComparison>> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.len() < 2) {
        return None;
    }
    let stats: Vec<(f64, f64, f64)> = groups
        .iter()
        .map(|g| (g.len() as f64, mean(g), sample_variance(g)))
        .collect();
    if stats.iter().any(|(_, _, var)| *var <= 0.0) {
        return None;
    }

    let mut comparisons = Vec::new();
    for i in 0..k {
        for j in i + 1..k {
            let (ni, mi, vi) = stats[i];
            let (nj, mj, vj) = stats[j];
            let (ti, tj) = (vi / ni, vj / nj);
            let se = ((ti + tj) / 2.0).sqrt();
            let q = (mi - mj).abs() / se;
            let df = (ti + tj).powi(2) / (ti * ti / (ni - 1.0) + tj * tj / (nj - 1.0));
            comparisons.push(PairwiseComparison {
                a: i,
                b: j,
                statistic: q,
                p_value: 1.0 - studentized_range_cdf(q, k as f64, df),
            });
        }
    }
    Some(comparisons)
}

/// Dunn's rank-based pairwise test with Holm adjustment.
///
/// Returns `None` for fewer than two groups or any empty group. All
/// values tied yields every pair at `p = 1`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn dunn_holm(groups: &[&[f64]]) -> Option<Vec<PairwiseComparison>> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return None;
    }
    let combined: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let n = combined.len() as f64;
    let (ranks, tie_sizes) = mid_ranks(&combined);

    let mut rank_means = Vec::with_capacity(k);
    let mut offset = 0;
    for group in groups {
        let sum: f64 = ranks[offset..offset + group.len()].iter().sum();
        rank_means.push(sum / group.len() as f64);
        offset += group.len();
    }

    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let base_var = n * (n + 1.0) / 12.0 - tie_term / (12.0 * (n - 1.0));

    let mut comparisons = Vec::new();
    for i in 0..k {
        for j in i + 1..k {
            let (ni, nj) = (groups[i].len() as f64, groups[j].len() as f64);
            let variance = base_var * (1.0 / ni + 1.0 / nj);
            let (statistic, p_raw) = if variance <= 0.0 {
                (0.0, 1.0)
            } else {
                let z = (rank_means[i] - rank_means[j]).abs() / variance.sqrt();
                (z, (2.0 * (1.0 - normal_cdf(z))).min(1.0))
            };
            comparisons.push(PairwiseComparison {
                a: i,
                b: j,
                statistic,
                p_value: p_raw,
            });
        }
    }
    holm_adjust(&mut comparisons);
    Some(comparisons)
}

/// Holm step-down adjustment of the p-values in place.
fn holm_adjust(comparisons: &mut [PairwiseComparison]) {
    let m = comparisons.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| comparisons[a].p_value.total_cmp(&comparisons[b].p_value));

    let mut running_max = 0.0_f64;
    for (rank, &idx) in order.iter().enumerate() {
        #[expect(clippy::cast_precision_loss)]
        let adjusted = (comparisons[idx].p_value * (m - rank) as f64).min(1.0);
        running_max = running_max.max(adjusted);
        comparisons[idx].p_value = running_max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::distribution::{ContinuousCDF, StudentsT};

    #[test]
    fn test_studentized_range_matches_t_at_two_groups() {
        // For k = 2, P(Q <= q) equals P(|T| <= q / sqrt(2)).
        for &(t, df) in &[(1.0, 5.0), (2.0, 10.0), (3.0, 30.0)] {
            let q = t * std::f64::consts::SQRT_2;
            let expected = {
                let dist = StudentsT::new(0.0, 1.0, df).unwrap();
                2.0 * dist.cdf(t) - 1.0
            };
            let actual = studentized_range_cdf(q, 2.0, df);
            assert!(
                (actual - expected).abs() < 1e-3,
                "q = {q}, df = {df}: {actual} vs {expected}"
            );
        }
    }

    #[test]
    fn test_studentized_range_known_quantile() {
        // Tabulated critical value: q(0.05; k = 3, df = 12) = 3.77.
        let p = studentized_range_cdf(3.77, 3.0, 12.0);
        assert!((p - 0.95).abs() < 5e-3, "p = {p}");
    }

    #[test]
    fn test_studentized_range_edges() {
        assert_eq!(studentized_range_cdf(0.0, 3.0, 10.0), 0.0);
        assert!(studentized_range_cdf(f64::NAN, 3.0, 10.0).is_nan());
        assert!(studentized_range_cdf(2.0, 1.0, 10.0).is_nan());
    }

    #[test]
    fn test_tukey_flags_the_distant_group() {
        let a = [10.0, 12.0, 11.0, 13.0, 9.0];
        let b = [10.5, 12.5, 11.5, 13.5, 9.5];
        let c = [30.0, 32.0, 31.0, 33.0, 29.0];
        let comparisons = tukey_hsd(&[&a, &b, &c]).unwrap();
        assert_eq!(comparisons.len(), 3);
        let find = |x, y| {
            comparisons
                .iter()
                .find(|c| c.a == x && c.b == y)
                .unwrap()
                .p_value
        };
        assert!(find(0, 1) > 0.5);
        assert!(find(0, 2) < 0.01);
        assert!(find(1, 2) < 0.01);
    }

    #[test]
    fn test_tukey_rejects_zero_variance() {
        assert!(tukey_hsd(&[&[1.0, 1.0], &[2.0, 2.0]]).is_none());
    }

    #[test]
    fn test_games_howell_handles_unequal_spread() {
        let tight = [10.0, 10.2, 9.8, 10.1, 9.9];
        let wide = [25.0, 45.0, 15.0, 55.0, 10.0];
        let comparisons = games_howell(&[&tight, &wide]).unwrap();
        assert_eq!(comparisons.len(), 1);
        assert!(comparisons[0].p_value < 0.2);
        assert!(comparisons[0].statistic > 0.0);
    }

    #[test]
    fn test_dunn_holm_orders_adjustments() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 3.0, 4.0, 5.0, 6.0];
        let c = [20.0, 21.0, 22.0, 23.0, 24.0];
        let comparisons = dunn_holm(&[&a, &b, &c]).unwrap();
        let find = |x, y| {
            comparisons
                .iter()
                .find(|c| c.a == x && c.b == y)
                .unwrap()
                .p_value
        };
        assert!(find(0, 1) > find(0, 2));
        assert!(find(0, 2) < 0.05);
        assert!((0.0..=1.0).contains(&find(0, 1)));
    }
}
