//! Event stream model for eye-tracking sensor recordings
//!
//! This crate provides the typed foundation of the gazeflow pipeline: one
//! respondent's time-ordered sensor events, discovered column schemas, and
//! the viewing-level preprocessing (timestamp rebasing, viewing splits)
//! that downstream metric computation relies on.
//!
//! # Overview
//!
//! Sensor exports arrive as an already-parsed tabular structure (the
//! comment-header convention of the source files is handled by the caller).
//! From there:
//!
//! 1. **Schema discovery** ([`schema::EventSchema`]): one pass over the
//!    header row locates the required columns and the AOI label column,
//!    producing typed accessors consumed by index thereafter
//! 2. **Event conversion** ([`schema::EventSchema::events_from_rows`]):
//!    data rows become immutable [`event::RawEvent`] values
//! 3. **Viewing split and rebasing** ([`stream::EventStream::viewings`]):
//!    each stimulus viewing becomes its own [`stream::StimulusViewing`]
//!    with stimulus-relative timestamps starting at or above zero
//!
//! A fixation index is unique only within a single viewing of a stimulus,
//! and restarts when the same stimulus is shown again. The viewing split
//! therefore happens here, once, and every downstream grouping key carries
//! the viewing id — the segmenter never infers it.
//!
//! # Examples
//!
//! ```
//! use gazeflow_events::{event::RawEvent, stream::EventStream};
//!
//! let events = vec![RawEvent {
//!     respondent: "R1".into(),
//!     stimulus: "AdX_01".into(),
//!     slide_event: Some(gazeflow_events::event::SlideEvent::StartMedia),
//!     timestamp: 1000,
//!     aoi: Some("Logo".into()),
//!     fixation_index: Some(1),
//!     fixation_duration: Some(200.0),
//! }];
//! let stream = EventStream::new("R1", events);
//! let viewings = stream.viewings().unwrap();
//! assert_eq!(viewings[0].stimulus, "AdX");
//! assert_eq!(viewings[0].events[0].timestamp, 0);
//! ```

pub mod event;
pub mod schema;
pub mod stream;
