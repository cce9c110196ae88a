//! Attention metrics over eye-tracking fixation data.
//!
//! This crate turns rebased stimulus viewings into the attention metrics
//! marketing-research reports are built on:
//!
//! - **Segmentation**: fixation runs from raw sample rows, with the
//!   cognitive-band admission window and a diagnostic 3-class variant
//! - **Reduction**: TTFF / FFD / TFD per respondent, stimulus, and AOI
//! - **Aggregation**: cross-respondent means, contribution counts, and
//!   the usage-threshold exclusion flag
//! - **Ranking**: z-score and normal-CDF percentile per metric, plus the
//!   per-stimulus "brand prominence" roll-up
//! - **Pipeline**: the batch driver that strings the stages together and
//!   collects per-respondent failures instead of aborting
//!
//! # Modules
//!
//! - [`config`]: Tunable thresholds with study defaults
//! - [`segment`]: Fixation segmentation and classification
//! - [`reduce`]: Per-respondent AOI reduction
//! - [`aggregate`]: Cross-respondent aggregation and comparison padding
//! - [`rank`]: Percentile ranking and brand prominence
//! - [`pipeline`]: Batch driver
//!
//! # Examples
//!
//! Segmenting one AOI's rows and reducing them:
//!
//! ```
//! use gazeflow_events::event::RawEvent;
//! use gazeflow_metrics::config::FixationWindow;
//! use gazeflow_metrics::reduce::AoiReduction;
//! use gazeflow_metrics::segment::admitted_fixations;
//!
//! let events: Vec<RawEvent> = [(400, 3), (600, 3), (800, 3)]
//!     .into_iter()
//!     .map(|(timestamp, index)| RawEvent {
//!         respondent: "R1".into(),
//!         stimulus: "AdX".into(),
//!         slide_event: None,
//!         timestamp,
//!         aoi: Some("Logo".into()),
//!         fixation_index: Some(index),
//!         fixation_duration: None,
//!     })
//!     .collect();
//!
//! let admitted = admitted_fixations(&events, &FixationWindow::default());
//! let reduction =
//!     AoiReduction::from_fixations("R1", "AdX", 0, "Logo", &admitted).unwrap();
//! assert_eq!(reduction.ttff, 400.0);
//! assert_eq!(reduction.tfd, 400.0);
//! ```

pub mod aggregate;
pub mod config;
pub mod pipeline;
pub mod rank;
pub mod reduce;
pub mod segment;
