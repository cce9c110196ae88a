//! Non-parametric two-sample tests
//!
//! Mann-Whitney U for independent samples and the Wilcoxon signed-rank
//! test for paired samples, both with the tie-corrected normal
//! approximation and continuity correction. Wilcoxon flags samples it
//! cannot rank (all differences zero, or fewer than two non-zero
//! differences) so the engine can fall back to a permutation test.

use crate::zscore::normal_cdf;

/// Outcome of a rank test.
#[derive(Debug, Clone)]
pub struct RankTest {
    /// The test statistic (U for Mann-Whitney, W for Wilcoxon).
    pub statistic: f64,
    /// Two-sided p-value from the normal approximation.
    pub p_value: f64,
    /// Set when the ranks were degenerate and the p-value is not
    /// trustworthy.
    pub degenerate: bool,
}

/// Mid-ranks (1-based, ties averaged) for `values`, plus the size of every
/// tie group for variance corrections.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn mid_ranks(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_sizes = Vec::new();
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // Average of ranks i+1 ..= j over the tie group.
        let rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        if j - i > 1 {
            tie_sizes.push(j - i);
        }
        i = j;
    }
    (ranks, tie_sizes)
}

/// Mann-Whitney U test for two independent samples.
///
/// Returns `None` when either sample is empty. All values identical
/// across both samples yields `p = 1` flagged degenerate.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Option<RankTest> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let n = na + nb;

    let combined: Vec<f64> = a.iter().chain(b).copied().collect();
    let (ranks, tie_sizes) = mid_ranks(&combined);
    let rank_sum_a: f64 = ranks[..a.len()].iter().sum();

    let u_a = na * nb + na * (na + 1.0) / 2.0 - rank_sum_a;
    let u = u_a.min(na * nb - u_a);

    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = na * nb / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));

    if variance <= 0.0 {
        return Some(RankTest {
            statistic: u,
            p_value: 1.0,
            degenerate: true,
        });
    }

    let z = (u - na * nb / 2.0 + 0.5) / variance.sqrt();
    let p_value = (2.0 * normal_cdf(z)).min(1.0);
    Some(RankTest {
        statistic: u,
        p_value,
        degenerate: false,
    })
}

/// Wilcoxon signed-rank test for two paired samples.
///
/// Zero differences are dropped before ranking. Returns `None` when the
/// samples differ in length; fewer than two non-zero differences leaves
/// nothing to rank and comes back degenerate with `p = 1`. The result is
/// also flagged degenerate when fewer than 10 non-zero differences
/// remain or the magnitudes tie, where the normal approximation is not
/// trustworthy; the engine reroutes those to the permutation test.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn wilcoxon_signed_rank(a: &[f64], b: &[f64]) -> Option<RankTest> {
    if a.len() != b.len() {
        return None;
    }
    let diffs: Vec<f64> = a
        .iter()
        .zip(b)
        .map(|(x, y)| x - y)
        .filter(|d| *d != 0.0)
        .collect();
    if diffs.len() < 2 {
        return Some(RankTest {
            statistic: 0.0,
            p_value: 1.0,
            degenerate: true,
        });
    }

    let n = diffs.len() as f64;
    let magnitudes: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let (ranks, tie_sizes) = mid_ranks(&magnitudes);

    let w_plus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();
    let w = w_plus.min(n * (n + 1.0) / 2.0 - w_plus);

    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term / 48.0;

    if variance <= 0.0 {
        return Some(RankTest {
            statistic: w,
            p_value: 1.0,
            degenerate: true,
        });
    }

    let z = (w - n * (n + 1.0) / 4.0 + 0.5) / variance.sqrt();
    let p_value = (2.0 * normal_cdf(z)).min(1.0);
    Some(RankTest {
        statistic: w,
        p_value,
        degenerate: diffs.len() < 10 || !tie_sizes.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_ranks_with_ties() {
        let (ranks, ties) = mid_ranks(&[3.0, 1.0, 3.0, 2.0]);
        assert_eq!(ranks, vec![3.5, 1.0, 3.5, 2.0]);
        assert_eq!(ties, vec![2]);
    }

    #[test]
    fn test_mann_whitney_separated_groups() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let result = mann_whitney_u(&a, &b).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert!(result.p_value < 0.01);
        assert!(!result.degenerate);
    }

    #[test]
    fn test_mann_whitney_identical_values() {
        let result = mann_whitney_u(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]).unwrap();
        assert!(result.degenerate);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_mann_whitney_similar_groups_not_significant() {
        let a = [1.0, 3.0, 5.0, 7.0, 9.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let result = mann_whitney_u(&a, &b).unwrap();
        assert!(result.p_value > 0.3);
    }

    #[test]
    fn test_wilcoxon_all_zero_differences() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let result = wilcoxon_signed_rank(&a, &a).unwrap();
        assert!(result.degenerate);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_wilcoxon_one_sided_shift() {
        let a = [
            10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 24.0, 26.0, 28.0, 30.0, 32.0,
        ];
        let offsets = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let b: Vec<f64> = a.iter().zip(offsets).map(|(v, o)| v + o).collect();
        let result = wilcoxon_signed_rank(&a, &b).unwrap();
        assert!(!result.degenerate);
        // All twelve differences share the same sign.
        assert_eq!(result.statistic, 0.0);
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn test_wilcoxon_small_sample_is_degenerate() {
        let a = [10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 24.0];
        let offsets = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let b: Vec<f64> = a.iter().zip(offsets).map(|(v, o)| v + o).collect();
        let result = wilcoxon_signed_rank(&a, &b).unwrap();
        // Only eight non-zero differences: approximation not trusted.
        assert!(result.degenerate);
    }

    #[test]
    fn test_wilcoxon_length_mismatch() {
        assert!(wilcoxon_signed_rank(&[1.0], &[1.0, 2.0]).is_none());
    }
}
