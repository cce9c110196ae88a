//! Per-respondent event streams and viewing-level preprocessing
//!
//! An [`EventStream`] holds one respondent's events in recording order.
//! [`EventStream::viewings`] splits it into [`StimulusViewing`] groups —
//! one per stimulus viewing — and rebases timestamps so they are relative
//! to the viewing's own `StartMedia` marker.
//!
//! # Viewing identity
//!
//! Fixation indices restart when a stimulus is shown a second time, so two
//! viewings must never be segmented together. A viewing boundary is drawn
//! when any of these occur within one stimulus:
//!
//! - the exported stimulus name carries a different trailing `_NN` viewing
//!   suffix (`AdX_01`, `AdX_02` both map to stimulus `AdX`)
//! - a second `StartMedia` marker appears
//! - the fixation index falls below the running maximum (an index restart)

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::RawEvent;

/// One respondent's events, in recording order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventStream {
    pub respondent: String,
    pub events: Vec<RawEvent>,
}

/// One viewing of one stimulus, with stimulus-relative timestamps.
///
/// Events before the `StartMedia` marker are dropped during rebasing, so
/// timestamps start at or above zero. The `viewing` id is 0-based and
/// counts viewings of the same stimulus by the same respondent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StimulusViewing {
    pub respondent: String,
    /// Stimulus name with any trailing viewing suffix stripped.
    pub stimulus: String,
    pub viewing: u32,
    pub events: Vec<RawEvent>,
}

/// Errors raised while rebasing a viewing onto its media start.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RebaseError {
    #[display("no StartMedia marker for stimulus '{stimulus}' (respondent '{respondent}')")]
    MissingStartMedia {
        respondent: String,
        stimulus: String,
    },
}

impl EventStream {
    #[must_use]
    pub fn new(respondent: impl Into<String>, events: Vec<RawEvent>) -> Self {
        Self {
            respondent: respondent.into(),
            events,
        }
    }

    /// Distinct stimulus names (viewing suffix stripped), in encounter
    /// order.
    #[must_use]
    pub fn stimuli(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for event in &self.events {
            let (base, _) = strip_viewing_suffix(&event.stimulus);
            if !names.contains(&base) {
                names.push(base);
            }
        }
        names
    }

    /// Splits the stream into stimulus viewings and rebases each one.
    ///
    /// # Errors
    ///
    /// Returns [`RebaseError::MissingStartMedia`] if any viewing lacks a
    /// `StartMedia` marker; the caller skips the whole respondent file and
    /// keeps the batch going.
    pub fn viewings(&self) -> Result<Vec<StimulusViewing>, RebaseError> {
        let mut viewings: Vec<RawViewing<'_>> = Vec::new();

        for event in &self.events {
            let (base, _) = strip_viewing_suffix(&event.stimulus);
            let open = viewings
                .iter_mut()
                .rev()
                .find(|viewing| viewing.stimulus == base && !viewing.closed);
            match open {
                Some(viewing) if viewing.accepts(event) => viewing.push(event),
                Some(viewing) => {
                    viewing.closed = true;
                    viewings.push(RawViewing::start(base, event));
                }
                None => viewings.push(RawViewing::start(base, event)),
            }
        }

        let mut rebased = Vec::with_capacity(viewings.len());
        let mut counts: Vec<(&str, u32)> = Vec::new();
        for viewing in viewings {
            let viewing_id = next_viewing_id(&mut counts, viewing.stimulus);
            rebased.push(viewing.rebase(&self.respondent, viewing_id)?);
        }
        Ok(rebased)
    }
}

impl StimulusViewing {
    /// Drops events past the stimulus's declared on-screen duration.
    ///
    /// Rebasing already clips the leading side (events before `StartMedia`
    /// never make it into the viewing), so this completes the clipping to
    /// `[0, duration]`.
    #[must_use]
    pub fn clipped_to(mut self, duration_ms: i64) -> Self {
        let before = self.events.len();
        self.events.retain(|event| event.timestamp <= duration_ms);
        if self.events.len() < before {
            debug!(
                respondent = self.respondent,
                stimulus = self.stimulus,
                dropped = before - self.events.len(),
                "clipped events past stimulus duration"
            );
        }
        self
    }

    /// Distinct AOI labels fixated in this viewing, in encounter order.
    #[must_use]
    pub fn aois(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for event in &self.events {
            if let Some(aoi) = event.aoi.as_deref()
                && !names.contains(&aoi)
            {
                names.push(aoi);
            }
        }
        names
    }

    /// Events attributed to one AOI, preserving temporal order.
    #[must_use]
    pub fn events_for_aoi(&self, aoi: &str) -> Vec<&RawEvent> {
        self.events
            .iter()
            .filter(|event| event.aoi.as_deref() == Some(aoi))
            .collect()
    }
}

/// Accumulator for one viewing before rebasing.
struct RawViewing<'a> {
    stimulus: &'a str,
    /// Exported name of the first row, kept for suffix comparison.
    exported_name: &'a str,
    events: Vec<&'a RawEvent>,
    max_fixation_index: Option<u32>,
    seen_start: bool,
    closed: bool,
}

impl<'a> RawViewing<'a> {
    fn start(stimulus: &'a str, event: &'a RawEvent) -> Self {
        let mut viewing = Self {
            stimulus,
            exported_name: &event.stimulus,
            events: Vec::new(),
            max_fixation_index: None,
            seen_start: false,
            closed: false,
        };
        viewing.push(event);
        viewing
    }

    /// Whether `event` belongs to this viewing or opens the next one.
    fn accepts(&self, event: &RawEvent) -> bool {
        if event.stimulus != self.exported_name {
            return false;
        }
        if self.seen_start && event.slide_event.is_some_and(|marker| marker.is_start_media()) {
            return false;
        }
        if let (Some(index), Some(max)) = (event.fixation_index, self.max_fixation_index)
            && index < max
        {
            return false;
        }
        true
    }

    fn push(&mut self, event: &'a RawEvent) {
        if event.slide_event.is_some_and(|marker| marker.is_start_media()) {
            self.seen_start = true;
        }
        if let Some(index) = event.fixation_index {
            self.max_fixation_index = Some(self.max_fixation_index.map_or(index, |m| m.max(index)));
        }
        self.events.push(event);
    }

    fn rebase(self, respondent: &str, viewing: u32) -> Result<StimulusViewing, RebaseError> {
        let start = self
            .events
            .iter()
            .find(|event| event.slide_event.is_some_and(|marker| marker.is_start_media()))
            .map(|event| event.timestamp)
            .ok_or_else(|| RebaseError::MissingStartMedia {
                respondent: respondent.to_owned(),
                stimulus: self.stimulus.to_owned(),
            })?;

        let events = self
            .events
            .into_iter()
            .filter(|event| event.timestamp >= start)
            .map(|event| RawEvent {
                stimulus: self.stimulus.to_owned(),
                timestamp: event.timestamp - start,
                ..event.clone()
            })
            .collect();
        Ok(StimulusViewing {
            respondent: respondent.to_owned(),
            stimulus: self.stimulus.to_owned(),
            viewing,
            events,
        })
    }
}

fn next_viewing_id<'a>(counts: &mut Vec<(&'a str, u32)>, stimulus: &'a str) -> u32 {
    if let Some((_, count)) = counts.iter_mut().find(|(name, _)| *name == stimulus) {
        *count += 1;
        *count
    } else {
        counts.push((stimulus, 0));
        0
    }
}

/// Splits a trailing `_NN` viewing suffix off an exported stimulus name.
///
/// Returns the base name and the parsed suffix, or the whole name when no
/// numeric suffix is present.
#[must_use]
pub fn strip_viewing_suffix(name: &str) -> (&str, Option<u32>) {
    match name.rsplit_once('_') {
        Some((base, tail)) if !base.is_empty() && tail.parse::<u32>().is_ok() => {
            (base, tail.parse().ok())
        }
        _ => (name, None),
    }
}
