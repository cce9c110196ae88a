//! Permutation testing
//!
//! Seeded pooled-permutation test on the difference of means. The
//! significance engine falls back to it when the signed-rank test has
//! nothing to rank, which happens a lot with heavily tied attention
//! metrics (many zero dwell times).

use rand::SeedableRng as _;
use rand::seq::SliceRandom as _;
use rand_pcg::Pcg64Mcg;

use crate::descriptive::mean;

/// Outcome of a permutation test.
#[derive(Debug, Clone)]
pub struct PermutationTest {
    /// Observed absolute difference of means.
    pub statistic: f64,
    /// Share of permutations at least as extreme, with the +1 smoothing
    /// that keeps the p-value off exact zero.
    pub p_value: f64,
}

/// Two-sample permutation test on `|mean(a) - mean(b)|`.
///
/// The samples are pooled, reshuffled `iterations` times with a
/// deterministic generator seeded from `seed`, and re-split at the
/// original sizes. Returns `None` when either sample is empty or
/// `iterations` is zero.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn permutation_test(a: &[f64], b: &[f64], iterations: u32, seed: u64) -> Option<PermutationTest> {
    if a.is_empty() || b.is_empty() || iterations == 0 {
        return None;
    }
    let observed = (mean(a) - mean(b)).abs();
    let mut pool: Vec<f64> = a.iter().chain(b).copied().collect();
    let mut rng = Pcg64Mcg::seed_from_u64(seed);

    let mut at_least_as_extreme = 0_u32;
    for _ in 0..iterations {
        pool.shuffle(&mut rng);
        let (left, right) = pool.split_at(a.len());
        if (mean(left) - mean(right)).abs() >= observed {
            at_least_as_extreme += 1;
        }
    }

    let p_value = f64::from(at_least_as_extreme + 1) / f64::from(iterations + 1);
    Some(PermutationTest {
        statistic: observed,
        p_value: p_value.min(1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample() {
        assert!(permutation_test(&[], &[1.0], 100, 0).is_none());
        assert!(permutation_test(&[1.0], &[2.0], 0, 0).is_none());
    }

    #[test]
    fn test_deterministic_for_a_seed() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let first = permutation_test(&a, &b, 2_000, 42).unwrap();
        let second = permutation_test(&a, &b, 2_000, 42).unwrap();
        assert_eq!(first.p_value, second.p_value);
    }

    #[test]
    fn test_identical_samples_not_significant() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let result = permutation_test(&a, &a, 1_000, 7).unwrap();
        assert_eq!(result.statistic, 0.0);
        // Every permutation is at least as extreme as a zero difference.
        assert!(result.p_value > 0.99);
    }

    #[test]
    fn test_separated_samples_significant() {
        let a = [1.0, 2.0, 1.5, 2.5, 1.2, 2.2];
        let b = [100.0, 101.0, 100.5, 101.5, 100.2, 101.2];
        let result = permutation_test(&a, &b, 5_000, 9).unwrap();
        assert!(result.p_value < 0.01, "p = {}", result.p_value);
    }
}
