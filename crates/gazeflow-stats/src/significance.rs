//! Test selection and the uniform result table
//!
//! The engine takes named sample groups for one metric cluster and walks
//! a decision tree: assumption checks (normality, homogeneity of
//! variance) pick the test, the test produces a p-value, and everything
//! is rendered into a flat table of [`SignificanceResult`] rows. Two
//! groups yield one row; three or more yield an omnibus `Group` row plus
//! pairwise post-hoc rows when the omnibus is significant. The engine
//! never panics on degenerate data; it reports a `Not enough samples`
//! row or a conservative p-value instead.

use serde::Serialize;
use tracing::debug;

use crate::anova::{kruskal_wallis, one_way_anova, residuals, welch_anova};
use crate::bootstrap::permutation_test;
use crate::normality::shapiro_wilk;
use crate::posthoc::{PairwiseComparison, dunn_holm, games_howell, tukey_hsd};
use crate::rank_tests::{mann_whitney_u, wilcoxon_signed_rank};
use crate::ttest::{independent_t_test, paired_t_test};
use crate::variance::brown_forsythe;

/// Label used for omnibus rows spanning all groups.
pub const GROUP_LABEL: &str = "Group";

/// A named sample group entering the engine.
#[derive(Debug, Clone)]
pub struct SampleGroup {
    pub name: String,
    pub values: Vec<f64>,
}

impl SampleGroup {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Tuning knobs for the engine.
#[derive(Debug, Clone, Serialize)]
pub struct SignificanceConfig {
    /// Significance level for assumption checks and omnibus gating.
    pub alpha: f64,
    /// Highest p-value still worth flagging in report footnotes.
    pub report_cutoff: f64,
    /// Iterations for the permutation fallback.
    pub bootstrap_iterations: u32,
    /// Seed for the permutation fallback, so reports reproduce.
    pub seed: u64,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            report_cutoff: 0.055,
            bootstrap_iterations: 10_000,
            seed: 0,
        }
    }
}

/// Which test produced a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TestType {
    #[display("Paired T-Test")]
    PairedT,
    #[display("Independent T-Test")]
    IndependentT,
    #[display("Wilcoxon")]
    Wilcoxon,
    #[display("Mann-Whitney U")]
    MannWhitney,
    #[display("ANOVA")]
    Anova,
    #[display("ANOVA Welch")]
    AnovaWelch,
    #[display("Kruskal-Wallis")]
    KruskalWallis,
    #[display("Post-Hoc Tukey")]
    PostHocTukey,
    #[display("Post-Hoc Games-Howell")]
    PostHocGamesHowell,
    #[display("Post-Hoc Dunn")]
    PostHocDunn,
    #[display("Bootstrap")]
    Bootstrap,
    #[display("Not enough samples")]
    NotEnoughSamples,
}

impl Serialize for TestType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the significance table.
#[derive(Debug, Clone, Serialize)]
pub struct SignificanceResult {
    /// Metric cluster the comparison belongs to (e.g. `TFD`).
    pub cluster: String,
    /// Compared pair as a sorted `"A and B"` label, or [`GROUP_LABEL`]
    /// for omnibus rows.
    pub groups: String,
    /// First compared group, or [`GROUP_LABEL`] for omnibus rows.
    pub control: String,
    /// Second compared group, or [`GROUP_LABEL`] for omnibus rows.
    pub treatment: String,
    pub p_value: f64,
    #[serde(rename = "test")]
    pub test_type: TestType,
    /// Sample sizes, absent on omnibus rows.
    pub n_control: Option<usize>,
    pub n_treatment: Option<usize>,
}

/// Runs the decision tree over `groups` for one metric `cluster`.
///
/// `paired` marks the samples as per-respondent repeated measures; it
/// only changes the two-group path, and only when the group lengths
/// actually match.
#[must_use]
pub fn significance(
    groups: &[SampleGroup],
    cluster: &str,
    paired: bool,
    config: &SignificanceConfig,
) -> Vec<SignificanceResult> {
    if groups.len() < 2 {
        return Vec::new();
    }
    if groups.iter().any(|g| g.values.len() < 3) {
        debug!(cluster, "a group has fewer than 3 samples, not testing");
        return vec![not_enough_samples_row(groups, cluster)];
    }

    // Three samples sit right at the edge of what the assumption checks
    // accept; pad them with a zero so the checks can run. Matches the
    // behavior attention reports have always had.
    let padded: Vec<SampleGroup> = groups
        .iter()
        .map(|g| {
            let mut values = g.values.clone();
            if values.len() == 3 {
                values.push(0.0);
            }
            SampleGroup::new(g.name.clone(), values)
        })
        .collect();

    if padded.len() == 2 {
        vec![two_group_row(&padded[0], &padded[1], cluster, paired, config)]
    } else {
        multi_group_rows(&padded, cluster, config)
    }
}

/// Sorted pair label, the way report tables have always printed it.
fn pair_label(a: &str, b: &str) -> String {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("{first} and {second}")
}

fn not_enough_samples_row(groups: &[SampleGroup], cluster: &str) -> SignificanceResult {
    // The undersized group is the one worth naming.
    let undersized = groups
        .iter()
        .find(|g| g.values.len() < 3)
        .unwrap_or(&groups[0]);
    let (label, treatment, n_treatment) = if groups.len() == 2 {
        let other = groups
            .iter()
            .find(|g| g.name != undersized.name)
            .unwrap_or(&groups[1]);
        (
            pair_label(&undersized.name, &other.name),
            other.name.clone(),
            Some(other.values.len()),
        )
    } else {
        (GROUP_LABEL.to_owned(), GROUP_LABEL.to_owned(), None)
    };
    SignificanceResult {
        cluster: cluster.to_owned(),
        groups: label,
        control: undersized.name.clone(),
        treatment,
        p_value: 1.0,
        test_type: TestType::NotEnoughSamples,
        n_control: Some(undersized.values.len()),
        n_treatment,
    }
}

fn is_normal(values: &[f64], alpha: f64) -> bool {
    shapiro_wilk(values, alpha).is_ok_and(|t| t.normal)
}

fn two_group_row(
    a: &SampleGroup,
    b: &SampleGroup,
    cluster: &str,
    paired: bool,
    config: &SignificanceConfig,
) -> SignificanceResult {
    let both_normal = is_normal(&a.values, config.alpha) && is_normal(&b.values, config.alpha);
    let pairable = paired && a.values.len() == b.values.len();

    let (p_value, test_type) = if pairable {
        if both_normal {
            let p = paired_t_test(&a.values, &b.values).map_or(f64::NAN, |t| t.p_value);
            (p, TestType::PairedT)
        } else {
            match wilcoxon_signed_rank(&a.values, &b.values) {
                Some(result) if !result.degenerate => (result.p_value, TestType::Wilcoxon),
                _ => {
                    debug!(cluster, "signed ranks degenerate, permuting instead");
                    let p = permutation_test(
                        &a.values,
                        &b.values,
                        config.bootstrap_iterations,
                        config.seed,
                    )
                    .map_or(f64::NAN, |t| t.p_value);
                    (p, TestType::Bootstrap)
                }
            }
        }
    } else if both_normal {
        let p = independent_t_test(&a.values, &b.values).map_or(f64::NAN, |t| t.p_value);
        (p, TestType::IndependentT)
    } else {
        let p = mann_whitney_u(&a.values, &b.values).map_or(f64::NAN, |t| t.p_value);
        (p, TestType::MannWhitney)
    };

    SignificanceResult {
        cluster: cluster.to_owned(),
        groups: pair_label(&a.name, &b.name),
        control: a.name.clone(),
        treatment: b.name.clone(),
        p_value,
        test_type,
        n_control: Some(a.values.len()),
        n_treatment: Some(b.values.len()),
    }
}

fn multi_group_rows(
    groups: &[SampleGroup],
    cluster: &str,
    config: &SignificanceConfig,
) -> Vec<SignificanceResult> {
    let slices: Vec<&[f64]> = groups.iter().map(|g| g.values.as_slice()).collect();

    let equal_variance = brown_forsythe(&slices, config.alpha).is_none_or(|t| t.equal_variance);
    let residuals_normal = is_normal(&residuals(&slices), config.alpha);

    let (omnibus_p, omnibus_test) = if equal_variance {
        if residuals_normal {
            let p = one_way_anova(&slices).map_or(f64::NAN, |t| t.p_value);
            (p, TestType::Anova)
        } else {
            let p = kruskal_wallis(&slices).map_or(f64::NAN, |t| t.p_value);
            (p, TestType::KruskalWallis)
        }
    } else if let Some(result) = welch_anova(&slices) {
        (result.p_value, TestType::AnovaWelch)
    } else {
        // A constant group breaks Welch's weighting; ranks still work.
        let p = kruskal_wallis(&slices).map_or(f64::NAN, |t| t.p_value);
        (p, TestType::KruskalWallis)
    };

    let mut rows = vec![SignificanceResult {
        cluster: cluster.to_owned(),
        groups: GROUP_LABEL.to_owned(),
        control: GROUP_LABEL.to_owned(),
        treatment: GROUP_LABEL.to_owned(),
        p_value: omnibus_p,
        test_type: omnibus_test,
        n_control: None,
        n_treatment: None,
    }];

    if omnibus_p.is_nan() || omnibus_p >= config.alpha {
        return rows;
    }

    // The post-hoc family follows the raw groups, not the omnibus: a
    // parametric pairwise test needs every group normal on its own,
    // even when residual normality let a plain ANOVA through.
    let groups_normal = slices.iter().all(|s| is_normal(s, config.alpha));
    let (comparisons, posthoc_test): (Option<Vec<PairwiseComparison>>, TestType) =
        if groups_normal && equal_variance {
            (tukey_hsd(&slices), TestType::PostHocTukey)
        } else if groups_normal {
            (games_howell(&slices), TestType::PostHocGamesHowell)
        } else {
            (dunn_holm(&slices), TestType::PostHocDunn)
        };
    let Some(comparisons) = comparisons else {
        debug!(cluster, "omnibus significant but post-hoc degenerate");
        return rows;
    };

    rows.extend(comparisons.into_iter().map(|c| SignificanceResult {
        cluster: cluster.to_owned(),
        groups: pair_label(&groups[c.a].name, &groups[c.b].name),
        control: groups[c.a].name.clone(),
        treatment: groups[c.b].name.clone(),
        p_value: c.p_value,
        test_type: posthoc_test,
        n_control: Some(groups[c.a].values.len()),
        n_treatment: Some(groups[c.b].values.len()),
    }));
    rows
}
