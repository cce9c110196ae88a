//! Column schema discovery for parsed sensor tables
//!
//! The sensor export names its columns dynamically: the fixed measurement
//! columns are always present, while AOIs appear either as one shared label
//! column ("which AOI was gazed at") or as per-AOI hit columns whose header
//! embeds the AOI name (`AOI hit [Logo]`). Instead of scanning headers by
//! substring on every access, discovery runs once per file and produces a
//! typed mapping from column role (and AOI name) to column index; row
//! conversion then works by index only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{RawEvent, SlideEvent};

/// Column names the discovery step looks for.
///
/// Defaults match the sensor export vocabulary; studies with renamed
/// columns override individual fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchemaConfig {
    pub stimulus: String,
    pub slide_event: String,
    pub timestamp: String,
    pub fixation_index: String,
    pub fixation_duration: String,
    /// Shared AOI label column, absent in per-AOI-column exports.
    pub aoi_label: String,
    /// Header prefix of per-AOI hit columns, e.g. `AOI hit [Logo]`.
    pub aoi_hit_prefix: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            stimulus: "SourceStimuliName".into(),
            slide_event: "SlideEvent".into(),
            timestamp: "Timestamp".into(),
            fixation_index: "Fixation Index".into(),
            fixation_duration: "Fixation Duration".into(),
            aoi_label: "AOIs gazed at".into(),
            aoi_hit_prefix: "AOI hit [".into(),
        }
    }
}

/// A discovered per-AOI hit column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AoiColumn {
    /// AOI name extracted from the column header.
    pub name: String,
    /// Column index in the data rows.
    pub index: usize,
}

/// Errors raised while discovering a file's column layout.
///
/// These are fatal for the file they occur in; the batch driver logs the
/// file identity and continues with the remaining files.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SchemaError {
    #[display("required column '{name}' not found in header")]
    MissingColumn { name: String },
    #[display("no AOI column found: neither '{label}' nor any '{prefix}…]' header")]
    MissingAoiColumns { label: String, prefix: String },
}

/// Typed column accessors for one file, produced once by [`Self::discover`].
#[derive(Debug, Clone)]
pub struct EventSchema {
    stimulus: usize,
    slide_event: usize,
    timestamp: usize,
    fixation_index: usize,
    fixation_duration: usize,
    aoi_label: Option<usize>,
    aoi_hits: Vec<AoiColumn>,
}

impl EventSchema {
    /// Scans the header row once and resolves every column the pipeline
    /// reads.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingColumn`] when a required measurement
    /// column is absent, and [`SchemaError::MissingAoiColumns`] when the
    /// file has neither a shared AOI label column nor any per-AOI hit
    /// column.
    pub fn discover<S>(headers: &[S], config: &SchemaConfig) -> Result<Self, SchemaError>
    where
        S: AsRef<str>,
    {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref() == name)
                .ok_or_else(|| SchemaError::MissingColumn { name: name.into() })
        };

        let aoi_label = headers.iter().position(|h| h.as_ref() == config.aoi_label);
        let aoi_hits = headers
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                let header = header.as_ref();
                let name = header
                    .strip_prefix(config.aoi_hit_prefix.as_str())?
                    .strip_suffix(']')?;
                Some(AoiColumn {
                    name: name.to_owned(),
                    index,
                })
            })
            .collect::<Vec<_>>();
        if aoi_label.is_none() && aoi_hits.is_empty() {
            return Err(SchemaError::MissingAoiColumns {
                label: config.aoi_label.clone(),
                prefix: config.aoi_hit_prefix.clone(),
            });
        }

        Ok(Self {
            stimulus: find(&config.stimulus)?,
            slide_event: find(&config.slide_event)?,
            timestamp: find(&config.timestamp)?,
            fixation_index: find(&config.fixation_index)?,
            fixation_duration: find(&config.fixation_duration)?,
            aoi_label,
            aoi_hits,
        })
    }

    /// Names of all AOIs discoverable from per-AOI hit columns.
    #[must_use]
    pub fn aoi_names(&self) -> Vec<&str> {
        self.aoi_hits.iter().map(|c| c.name.as_str()).collect()
    }

    /// Converts one data row into an event.
    ///
    /// Returns `None` when the row is unusable (no stimulus, or a
    /// timestamp that does not parse); such rows are skipped by
    /// [`Self::events_from_rows`] rather than failing the file.
    #[must_use]
    pub fn event_from_row<S>(&self, respondent: &str, row: &[S]) -> Option<RawEvent>
    where
        S: AsRef<str>,
    {
        let stimulus = non_empty(row.get(self.stimulus)?.as_ref())?;
        #[expect(clippy::cast_possible_truncation)]
        let timestamp = parse_number(row.get(self.timestamp)?.as_ref())?.round() as i64;
        let slide_event = row
            .get(self.slide_event)
            .and_then(|cell| SlideEvent::from_marker(cell.as_ref().trim()));
        let aoi = self.aoi_from_row(row);
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fixation_index =
            number_at(row, self.fixation_index).map(|index| index.round() as u32);
        let fixation_duration = number_at(row, self.fixation_duration);

        Some(RawEvent {
            respondent: respondent.to_owned(),
            stimulus: stimulus.to_owned(),
            slide_event,
            timestamp,
            aoi,
            fixation_index,
            fixation_duration,
        })
    }

    /// Converts all data rows of one file, skipping unusable rows.
    pub fn events_from_rows<S>(&self, respondent: &str, rows: &[Vec<S>]) -> Vec<RawEvent>
    where
        S: AsRef<str>,
    {
        let mut skipped = 0_usize;
        let events = rows
            .iter()
            .filter_map(|row| {
                let event = self.event_from_row(respondent, row);
                if event.is_none() {
                    skipped += 1;
                }
                event
            })
            .collect::<Vec<_>>();
        if skipped > 0 {
            debug!(respondent, skipped, "skipped unusable rows");
        }
        events
    }

    fn aoi_from_row<S>(&self, row: &[S]) -> Option<String>
    where
        S: AsRef<str>,
    {
        if let Some(index) = self.aoi_label
            && let Some(label) = row.get(index).and_then(|cell| non_empty(cell.as_ref()))
        {
            return Some(label.to_owned());
        }
        // First hit column with a truthy value wins; the export never marks
        // more than one AOI per sample.
        self.aoi_hits
            .iter()
            .find(|column| {
                row.get(column.index)
                    .and_then(|cell| parse_number(cell.as_ref()))
                    .is_some_and(|hit| hit != 0.0)
            })
            .map(|column| column.name.clone())
    }
}

fn number_at<S>(row: &[S], index: usize) -> Option<f64>
where
    S: AsRef<str>,
{
    row.get(index).and_then(|cell| parse_number(cell.as_ref()))
}

fn non_empty(cell: &str) -> Option<&str> {
    let cell = cell.trim();
    (!cell.is_empty()).then_some(cell)
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<&'static str> {
        vec![
            "Row",
            "SourceStimuliName",
            "SlideEvent",
            "Timestamp",
            "AOIs gazed at",
            "Fixation Index",
            "Fixation Duration",
        ]
    }

    #[test]
    fn test_discover_label_layout() {
        let schema = EventSchema::discover(&headers(), &SchemaConfig::default()).unwrap();
        let row = vec!["1", "AdX", "StartMedia", "1000.0", "Logo", "3", "250"];
        let event = schema.event_from_row("R1", &row).unwrap();
        assert_eq!(event.stimulus, "AdX");
        assert_eq!(event.slide_event, Some(SlideEvent::StartMedia));
        assert_eq!(event.timestamp, 1000);
        assert_eq!(event.aoi.as_deref(), Some("Logo"));
        assert_eq!(event.fixation_index, Some(3));
        assert_eq!(event.fixation_duration, Some(250.0));
    }

    #[test]
    fn test_discover_hit_column_layout() {
        let headers = vec![
            "SourceStimuliName",
            "SlideEvent",
            "Timestamp",
            "Fixation Index",
            "Fixation Duration",
            "AOI hit [Logo]",
            "AOI hit [Price]",
        ];
        let schema = EventSchema::discover(&headers, &SchemaConfig::default()).unwrap();
        assert_eq!(schema.aoi_names(), vec!["Logo", "Price"]);

        let row = vec!["AdX", "", "50", "1", "120", "0", "1"];
        let event = schema.event_from_row("R1", &row).unwrap();
        assert_eq!(event.aoi.as_deref(), Some("Price"));
    }

    #[test]
    fn test_missing_required_column() {
        let headers = vec!["SourceStimuliName", "Timestamp", "AOIs gazed at"];
        let err = EventSchema::discover(&headers, &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { name } if name == "SlideEvent"));
    }

    #[test]
    fn test_missing_aoi_columns() {
        let headers = vec![
            "SourceStimuliName",
            "SlideEvent",
            "Timestamp",
            "Fixation Index",
            "Fixation Duration",
        ];
        let err = EventSchema::discover(&headers, &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingAoiColumns { .. }));
    }

    #[test]
    fn test_unusable_rows_are_skipped() {
        let schema = EventSchema::discover(&headers(), &SchemaConfig::default()).unwrap();
        let rows = vec![
            vec!["1", "AdX", "", "not-a-number", "", "", ""],
            vec!["2", "", "", "100", "", "", ""],
            vec!["3", "AdX", "", "100", "", "", ""],
        ];
        let events = schema.events_from_rows("R1", &rows);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, 100);
        assert_eq!(events[0].aoi, None);
        assert_eq!(events[0].fixation_index, None);
    }
}
