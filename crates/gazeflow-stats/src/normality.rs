//! Shapiro-Wilk normality test
//!
//! Royston's AS R94 approximation of the Shapiro-Wilk W statistic and its
//! p-value, valid for sample sizes from 4 upwards. The significance engine
//! uses it to decide between parametric and rank-based tests, so the
//! implementation favors never panicking over rejecting awkward input:
//! zero-variance samples produce a `NaN` statistic flagged non-normal.

use statrs::distribution::ContinuousCDF;

use crate::zscore::std_normal;

/// Result of a normality check.
#[derive(Debug, Clone)]
pub struct NormalityTest {
    /// The Shapiro-Wilk W statistic, in `(0, 1]`.
    pub statistic: f64,
    /// Upper-tail p-value of the normality hypothesis.
    pub p_value: f64,
    /// Whether the sample looks normal at the supplied alpha
    /// (`p_value > alpha`).
    pub normal: bool,
}

/// Errors raised by the normality test.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum NormalityError {
    #[display("Shapiro-Wilk requires at least 4 samples, got {n}")]
    TooFewSamples { n: usize },
}

/// Runs the Shapiro-Wilk test on `values` at significance level `alpha`.
///
/// # Errors
///
/// Returns [`NormalityError::TooFewSamples`] for fewer than 4 values.
#[expect(clippy::cast_precision_loss)]
pub fn shapiro_wilk(values: &[f64], alpha: f64) -> Result<NormalityTest, NormalityError> {
    let n = values.len();
    if n < 4 {
        return Err(NormalityError::TooFewSamples { n });
    }

    let mut x = values.to_vec();
    x.sort_by(f64::total_cmp);

    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq_x = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    if ssq_x <= 0.0 {
        // All values identical: W is undefined, treat as non-normal.
        return Ok(NormalityTest {
            statistic: f64::NAN,
            p_value: f64::NAN,
            normal: false,
        });
    }

    let weights = royston_weights(n);
    let w_num = x
        .iter()
        .zip(&weights)
        .map(|(value, weight)| weight * value)
        .sum::<f64>()
        .powi(2);
    let w = (w_num / ssq_x).min(1.0);

    let p_value = royston_p_value(w, n);
    Ok(NormalityTest {
        statistic: w,
        p_value,
        normal: p_value > alpha,
    })
}

/// Royston's polynomial-corrected weights for the order statistics.
#[expect(clippy::cast_precision_loss)]
fn royston_weights(n: usize) -> Vec<f64> {
    let normal = std_normal();
    let nf = n as f64;

    // Blom scores: expected normal order statistics approximation.
    let m: Vec<f64> = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let ssq_m = m.iter().map(|v| v * v).sum::<f64>();
    let rsqrt_ssq = 1.0 / ssq_m.sqrt();

    let u = 1.0 / nf.sqrt();
    let a_n = poly(
        &[0.0, 0.221_157, -0.147_981, -2.071_190, 4.434_685, -2.706_056],
        u,
    ) + m[n - 1] * rsqrt_ssq;

    let mut weights = vec![0.0; n];
    if n > 5 {
        let a_n1 = poly(
            &[0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633],
            u,
        ) + m[n - 2] * rsqrt_ssq;
        let phi = (ssq_m - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
        let scale = phi.sqrt();
        weights[n - 1] = a_n;
        weights[n - 2] = a_n1;
        weights[0] = -a_n;
        weights[1] = -a_n1;
        for i in 2..n - 2 {
            weights[i] = m[i] / scale;
        }
    } else {
        let phi = (ssq_m - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
        let scale = phi.sqrt();
        weights[n - 1] = a_n;
        weights[0] = -a_n;
        for i in 1..n - 1 {
            weights[i] = m[i] / scale;
        }
    }
    weights
}

/// Transforms W to an approximately standard normal deviate and returns
/// the upper-tail p-value.
#[expect(clippy::cast_precision_loss)]
fn royston_p_value(w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let one_minus_w = (1.0 - w).max(1e-12);

    let (z, valid) = if n <= 11 {
        let gamma = -2.273 + 0.459 * nf;
        let shifted = gamma - one_minus_w.ln();
        if shifted <= 0.0 {
            (f64::INFINITY, false)
        } else {
            let w_t = -shifted.ln();
            let mu = 0.544_0 - 0.399_78 * nf + 0.025_054 * nf * nf - 0.000_671_4 * nf.powi(3);
            let sigma =
                (1.382_2 - 0.778_57 * nf + 0.062_767 * nf * nf - 0.002_032_2 * nf.powi(3)).exp();
            ((w_t - mu) / sigma, true)
        }
    } else {
        let ln_n = nf.ln();
        let w_t = one_minus_w.ln();
        let mu = -1.586_1 - 0.310_82 * ln_n - 0.083_751 * ln_n * ln_n + 0.003_891_5 * ln_n.powi(3);
        let sigma = (-0.480_3 - 0.082_676 * ln_n + 0.003_030_2 * ln_n * ln_n).exp();
        ((w_t - mu) / sigma, true)
    };

    if !valid {
        // W so close to 1 that the transform degenerates: clearly normal.
        return 1.0;
    }
    1.0 - std_normal().cdf(z)
}

fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .map(|(power, c)| c * x.powi(i32::try_from(power).unwrap_or(i32::MAX)))
        .sum()
}
