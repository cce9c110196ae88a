//! Per-respondent AOI reduction
//!
//! Collapses one (respondent, stimulus, viewing, AOI) fixation sequence
//! into the three attention metrics: time to first fixation, first
//! fixation duration, total fixation duration. No reduction is produced
//! when nothing was admitted; those combinations are absent from the
//! output rather than zero-filled.

use serde::{Deserialize, Serialize};

use crate::segment::Fixation;

/// Attention metrics for one respondent on one AOI of one viewing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AoiReduction {
    pub respondent: String,
    pub stimulus: String,
    pub viewing: u32,
    pub aoi: String,
    /// Time to first fixation: start time of the first admitted fixation.
    pub ttff: f64,
    /// First fixation duration.
    pub ffd: f64,
    /// Total fixation duration: sum over all admitted fixations.
    pub tfd: f64,
}

impl AoiReduction {
    /// Reduces an admitted, temporally ordered fixation sequence.
    ///
    /// Returns `None` for an empty sequence.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_fixations(
        respondent: impl Into<String>,
        stimulus: impl Into<String>,
        viewing: u32,
        aoi: impl Into<String>,
        fixations: &[Fixation],
    ) -> Option<Self> {
        let first = fixations.first()?;
        Some(Self {
            respondent: respondent.into(),
            stimulus: stimulus.into(),
            viewing,
            aoi: aoi.into(),
            ttff: first.start_ms as f64,
            ffd: first.duration_ms,
            tfd: fixations.iter().map(|f| f.duration_ms).sum(),
        })
    }
}
