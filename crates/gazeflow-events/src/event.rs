//! Raw sensor event rows
//!
//! One [`RawEvent`] corresponds to one row of a respondent's sensor log.
//! Events are created once at import, never mutated afterwards except for
//! timestamp rebasing (subtracting the stimulus start time), and consumed
//! in streaming fashion by the segmentation pipeline.

use serde::{Deserialize, Serialize};

/// Slide-level media markers emitted by the recording software.
///
/// Only the start marker is load-bearing (it anchors timestamp rebasing);
/// the end marker is kept for clipping to the stimulus's on-screen window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::IsVariant)]
pub enum SlideEvent {
    StartMedia,
    EndMedia,
}

impl SlideEvent {
    /// Parses the marker vocabulary of the sensor export.
    ///
    /// Unknown marker strings map to `None`; they carry no meaning for the
    /// pipeline and are treated the same as rows without a marker.
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "StartMedia" => Some(Self::StartMedia),
            "EndMedia" => Some(Self::EndMedia),
            _ => None,
        }
    }
}

/// One row of a respondent's sensor log.
///
/// Timestamps are integer milliseconds, monotonic within one respondent's
/// recording. The AOI label is absent when gaze is off all defined areas.
/// The fixation index is unique only within a single viewing of one
/// stimulus; it restarts when the stimulus is shown a second time.
/// The fixation duration is the device-reported value for the whole
/// fixation, repeated on every row of it — segmentation derives its own
/// duration from the row timestamps and only keeps the device value for
/// the diagnostic export.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawEvent {
    /// Respondent identifier, usually derived from the source file name.
    pub respondent: String,
    /// Stimulus name as exported, possibly carrying a `_NN` viewing suffix.
    pub stimulus: String,
    /// Slide/media marker, if this row carries one.
    pub slide_event: Option<SlideEvent>,
    /// Timestamp in milliseconds.
    pub timestamp: i64,
    /// AOI the gaze was attributed to, if any.
    pub aoi: Option<String>,
    /// Fixation index, unique within one viewing of one stimulus.
    pub fixation_index: Option<u32>,
    /// Device-reported fixation duration in milliseconds.
    pub fixation_duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_vocabulary() {
        assert_eq!(
            SlideEvent::from_marker("StartMedia"),
            Some(SlideEvent::StartMedia)
        );
        assert_eq!(
            SlideEvent::from_marker("EndMedia"),
            Some(SlideEvent::EndMedia)
        );
        assert_eq!(SlideEvent::from_marker("ShowSlide"), None);
        assert_eq!(SlideEvent::from_marker(""), None);
    }

    #[test]
    fn test_event_json_round_trip() {
        let event = RawEvent {
            respondent: "002_Resp_064".into(),
            stimulus: "AdX".into(),
            slide_event: Some(SlideEvent::StartMedia),
            timestamp: 12_345,
            aoi: None,
            fixation_index: None,
            fixation_duration: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: RawEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
