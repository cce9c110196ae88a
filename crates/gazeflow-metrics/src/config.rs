//! Configuration for the attention-metric pipeline
//!
//! Every threshold the pipeline applies lives here with the study-default
//! value, so per-study tuning never means editing pipeline code.

use serde::{Deserialize, Serialize};

/// Three-way fixation-duration classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum FixationClass {
    /// Reflexive glance, too short for cognitive processing.
    Short,
    /// The cognitive processing band.
    Cognitive,
    /// Dwell long enough to signal disengagement or inhibition.
    Overtaxed,
}

/// The fixation-duration band admitted into aggregation.
///
/// Admission is strict on both sides: a duration exactly on either
/// boundary is rejected. Classification is inclusive, so a boundary
/// duration still classifies as [`FixationClass::Cognitive`] in the raw
/// export while being excluded from the metric tables. Both behaviors
/// are long-standing report conventions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixationWindow {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl Default for FixationWindow {
    fn default() -> Self {
        Self {
            min_ms: 150.0,
            max_ms: 900.0,
        }
    }
}

impl FixationWindow {
    /// Whether a fixation of `duration_ms` enters aggregation.
    #[must_use]
    pub fn admits(&self, duration_ms: f64) -> bool {
        duration_ms > self.min_ms && duration_ms < self.max_ms
    }

    /// Diagnostic classification of `duration_ms`, boundaries inclusive.
    #[must_use]
    pub fn classify(&self, duration_ms: f64) -> FixationClass {
        if duration_ms < self.min_ms {
            FixationClass::Short
        } else if duration_ms > self.max_ms {
            FixationClass::Overtaxed
        } else {
            FixationClass::Cognitive
        }
    }
}

/// Batch-level knobs for the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub window: FixationWindow,
    /// Minimum share of respondents that must have fixated an AOI for it
    /// to count in ranking (`Count / N >= usage_threshold`).
    pub usage_threshold: f64,
    /// Declared on-screen duration; events past it are clipped before
    /// segmentation. `None` disables trailing clipping.
    pub stimulus_duration_ms: Option<i64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window: FixationWindow::default(),
            usage_threshold: 0.5,
            stimulus_duration_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_is_strict_on_both_boundaries() {
        let window = FixationWindow::default();
        assert!(!window.admits(150.0));
        assert!(!window.admits(900.0));
        assert!(window.admits(151.0));
        assert!(window.admits(899.0));
    }

    #[test]
    fn test_classification_is_boundary_inclusive() {
        let window = FixationWindow::default();
        assert_eq!(window.classify(149.9), FixationClass::Short);
        assert_eq!(window.classify(150.0), FixationClass::Cognitive);
        assert_eq!(window.classify(900.0), FixationClass::Cognitive);
        assert_eq!(window.classify(900.1), FixationClass::Overtaxed);
    }
}
