//! Statistical analysis utilities for the gazeflow project.
//!
//! This crate provides the statistical layer under the attention-metric
//! pipeline:
//!
//! - **Descriptive statistics**: mean, median, population variance, etc.
//! - **Z-scores and normal percentiles**: standard-normal-CDF percentile
//!   scores used for AOI and brand-prominence ranking
//! - **Distribution checks**: Shapiro-Wilk normality and Brown-Forsythe
//!   homoscedasticity tests
//! - **Two-sample tests**: paired/independent t-tests, Mann-Whitney U,
//!   Wilcoxon signed-rank
//! - **Omnibus tests**: one-way ANOVA, Welch's ANOVA, Kruskal-Wallis
//! - **Post-hoc tests**: Tukey HSD, Games-Howell, Dunn (Holm-adjusted)
//! - **Bootstrap**: permutation test fallback for degenerate rank tests
//! - **Significance engine**: the decision tree that selects among all of
//!   the above and renders a uniform result table
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`zscore`]: Z-scores and cumulative-normal percentile scores
//! - [`normality`]: Shapiro-Wilk normality test
//! - [`variance`]: Homogeneity-of-variance test
//! - [`ttest`]: Parametric two-sample tests
//! - [`rank_tests`]: Non-parametric two-sample tests
//! - [`anova`]: Omnibus tests for three or more groups
//! - [`posthoc`]: Pairwise post-hoc tests
//! - [`bootstrap`]: Permutation testing
//! - [`significance`]: Test selection and the uniform result table
//! - [`footnote`]: Human-readable significance footnotes for reports
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use gazeflow_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Percentile scores against the normal distribution
//!
//! ```
//! use gazeflow_stats::zscore::percentile_scores;
//!
//! let scores = percentile_scores(&[100.0, 500.0, 900.0]).unwrap();
//! assert!((scores[1] - 50.0).abs() < 1e-9);
//! assert!(scores[2] > 85.0 && scores[2] < 92.0);
//! ```
//!
//! ## Running the significance engine
//!
//! ```
//! use gazeflow_stats::significance::{significance, SampleGroup, SignificanceConfig};
//!
//! let groups = vec![
//!     SampleGroup::new("Control", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
//!     SampleGroup::new("Treatment", vec![6.0, 7.0, 8.0, 9.0, 10.0]),
//! ];
//! let table = significance(&groups, "TFD", false, &SignificanceConfig::default());
//! assert_eq!(table.len(), 1);
//! assert!(table[0].p_value <= 1.0);
//! ```

pub mod anova;
pub mod bootstrap;
pub mod descriptive;
pub mod footnote;
pub mod normality;
pub mod posthoc;
pub mod rank_tests;
pub mod significance;
pub mod ttest;
pub mod variance;
pub mod zscore;
