//! Fixation segmentation
//!
//! Partitions one AOI's event rows into fixations: maximal runs of
//! consecutive rows sharing the same non-null fixation index. The run's
//! duration is the timestamp span from its first to its last row; the
//! device-reported duration is carried along for raw exports but never
//! used in the metrics.
//!
//! The caller guarantees the rows belong to one respondent, one viewing
//! of one stimulus, and one AOI, sorted ascending by timestamp. Viewing
//! splitting is deliberately not this layer's job: fixation indices
//! restart across viewings, and merging two viewings here would silently
//! fuse unrelated fixations.

use gazeflow_events::event::RawEvent;
use serde::{Deserialize, Serialize};

use crate::config::{FixationClass, FixationWindow};

/// One segmented fixation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    /// Fixation index shared by the run's rows.
    pub index: u32,
    /// Timestamp of the run's first row, stimulus-relative.
    pub start_ms: i64,
    /// Last row's timestamp minus the first row's.
    pub duration_ms: f64,
    /// Device-reported duration from the first row, kept for raw
    /// exports only.
    pub reported_ms: Option<f64>,
    pub class: FixationClass,
}

/// Segments and classifies every fixation run, without filtering.
///
/// Rows with a null fixation index are dropped before grouping, so a
/// gap of index-less rows does not split a run. Empty input yields an
/// empty output.
pub fn classify_fixations<'a, I>(events: I, window: &FixationWindow) -> Vec<Fixation>
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut fixations = Vec::new();
    let mut run: Option<(u32, &RawEvent, &RawEvent)> = None;

    for event in events {
        let Some(index) = event.fixation_index else {
            continue;
        };
        match run {
            Some((current, first, _)) if current == index => {
                run = Some((current, first, event));
            }
            Some(done) => {
                fixations.push(close_run(done, window));
                run = Some((index, event, event));
            }
            None => run = Some((index, event, event)),
        }
    }
    if let Some(done) = run {
        fixations.push(close_run(done, window));
    }
    fixations
}

/// Segments fixation runs and keeps only the admitted ones.
///
/// A single-row run has duration zero and is never admitted.
pub fn admitted_fixations<'a, I>(events: I, window: &FixationWindow) -> Vec<Fixation>
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut fixations = classify_fixations(events, window);
    fixations.retain(|f| window.admits(f.duration_ms));
    fixations
}

#[expect(clippy::cast_precision_loss)]
fn close_run((index, first, last): (u32, &RawEvent, &RawEvent), window: &FixationWindow) -> Fixation {
    let duration_ms = (last.timestamp - first.timestamp) as f64;
    Fixation {
        index,
        start_ms: first.timestamp,
        duration_ms,
        reported_ms: first.fixation_duration,
        class: window.classify(duration_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: i64, index: Option<u32>) -> RawEvent {
        RawEvent {
            respondent: "R1".into(),
            stimulus: "AdX".into(),
            slide_event: None,
            timestamp,
            aoi: Some("Logo".into()),
            fixation_index: index,
            fixation_duration: Some(42.0),
        }
    }

    #[test]
    fn test_empty_input() {
        let window = FixationWindow::default();
        let events: [RawEvent; 0] = [];
        assert!(classify_fixations(&events, &window).is_empty());
        assert!(admitted_fixations(&events, &window).is_empty());
    }

    #[test]
    fn test_scenario_from_reports() {
        // Index run [1,1,1,2,2,3,3,3,3,3] over timestamps up to 800:
        // the first two runs are too short, the third spans 400 ms.
        let timestamps = [0, 50, 100, 150, 200, 400, 500, 600, 700, 800];
        let indices = [1, 1, 1, 2, 2, 3, 3, 3, 3, 3];
        let events: Vec<RawEvent> = timestamps
            .iter()
            .zip(indices)
            .map(|(&t, i)| event(t, Some(i)))
            .collect();

        let window = FixationWindow::default();
        let all = classify_fixations(&events, &window);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].class, FixationClass::Short);
        assert_eq!(all[1].class, FixationClass::Short);
        assert_eq!(all[2].class, FixationClass::Cognitive);

        let admitted = admitted_fixations(&events, &window);
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].start_ms, 400);
        assert_eq!(admitted[0].duration_ms, 400.0);
        assert_eq!(admitted[0].index, 3);
    }

    #[test]
    fn test_null_index_rows_do_not_split_a_run() {
        let events = [
            event(0, Some(1)),
            event(100, None),
            event(300, Some(1)),
        ];
        let window = FixationWindow::default();
        let all = classify_fixations(&events, &window);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].duration_ms, 300.0);
    }

    #[test]
    fn test_single_row_run_is_never_admitted() {
        let events = [event(0, Some(1))];
        let window = FixationWindow::default();
        let all = classify_fixations(&events, &window);
        assert_eq!(all[0].duration_ms, 0.0);
        assert!(admitted_fixations(&events, &window).is_empty());
    }

    #[test]
    fn test_boundary_durations_are_rejected() {
        let window = FixationWindow::default();
        for (span, admitted) in [(150, false), (151, true), (899, true), (900, false)] {
            let events = [event(0, Some(1)), event(span, Some(1))];
            assert_eq!(
                admitted_fixations(&events, &window).len(),
                usize::from(admitted),
                "span {span}"
            );
        }
    }

    #[test]
    fn test_reported_duration_is_carried_not_used() {
        let events = [event(0, Some(1)), event(500, Some(1))];
        let window = FixationWindow::default();
        let all = classify_fixations(&events, &window);
        assert_eq!(all[0].reported_ms, Some(42.0));
        assert_eq!(all[0].duration_ms, 500.0);
    }
}
