//! Human-readable significance footnotes for reports
//!
//! Renders the significance table into one-line footnotes suitable for
//! the bottom of a metric chart. Only rows at or below the report cutoff
//! make it in; rows between alpha and the cutoff are kept but marked as
//! borderline so near-misses stay visible.

use crate::significance::{GROUP_LABEL, SignificanceConfig, SignificanceResult, TestType};

/// Formats a p-value the way reports print them.
#[must_use]
pub fn format_p(p: f64) -> String {
    if p.is_nan() {
        "n/a".to_owned()
    } else if p < 0.001 {
        "p < 0.001".to_owned()
    } else {
        format!("p = {p:.3}")
    }
}

/// Renders footnote lines for every reportable row in `table`.
///
/// Degenerate rows and rows above the cutoff produce nothing.
#[must_use]
pub fn footnotes(table: &[SignificanceResult], config: &SignificanceConfig) -> Vec<String> {
    table
        .iter()
        .filter(|row| {
            row.test_type != TestType::NotEnoughSamples
                && !row.p_value.is_nan()
                && row.p_value <= config.report_cutoff
        })
        .map(|row| {
            let borderline = if row.p_value > config.alpha {
                " (borderline)"
            } else {
                ""
            };
            let sizes = match (row.n_control, row.n_treatment) {
                (Some(a), Some(b)) => format!(", n = {a}/{b}"),
                _ => String::new(),
            };
            if row.control == GROUP_LABEL {
                format!(
                    "{}: groups differ overall ({}, {}){}",
                    row.cluster,
                    row.test_type,
                    format_p(row.p_value),
                    borderline,
                )
            } else {
                format!(
                    "{}: {} vs {} differ ({}, {}{}){}",
                    row.cluster,
                    row.control,
                    row.treatment,
                    row.test_type,
                    format_p(row.p_value),
                    sizes,
                    borderline,
                )
            }
        })
        .collect()
}

/// Renders the complete footnote block for a chart.
///
/// Joins the reportable lines, or falls back to the stock sentence when
/// nothing cleared the cutoff.
#[must_use]
pub fn footnote_text(table: &[SignificanceResult], config: &SignificanceConfig) -> String {
    let lines = footnotes(table, config);
    if lines.is_empty() {
        "Results did not show any statistical significance".to_owned()
    } else {
        lines.join("\n")
    }
}
