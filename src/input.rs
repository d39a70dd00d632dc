//! Discovery Input
//!
//! The batch handed over by the motif detector: for every series its label,
//! sample count and the occurrences of each motif pattern found in it.
//!
//! ```json
//! { "series": [ { "label": "cpu", "length": 60, "motifs": [[{ "begin": 3, "end": 7 }]] } ] }
//! ```

use crate::config::CausalParams;
use crate::error::{CausalError, Result};
use crate::event::{Event, MotifOccurrence, motifs_to_events};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOccurrences {
    pub label: String,
    /// Samples in the observation window (`T`).
    pub length: usize,
    /// One list of occurrences per motif pattern.
    #[serde(default)]
    pub motifs: Vec<Vec<MotifOccurrence>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryInput {
    pub series: Vec<SeriesOccurrences>,
}

impl DiscoveryInput {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Check the batch and return the shared window length.
    pub fn validate(&self) -> Result<usize> {
        let first = self.series.first().ok_or(CausalError::EmptyInput)?;
        let length = first.length;

        for series in &self.series {
            if series.length != length {
                return Err(CausalError::LengthMismatch {
                    series: series.label.clone(),
                    expected: length,
                    actual: series.length,
                });
            }
            for occurrence in series.motifs.iter().flatten() {
                if occurrence.begin > occurrence.end || occurrence.end >= length {
                    return Err(CausalError::OccurrenceOutOfRange {
                        series: series.label.clone(),
                        begin: occurrence.begin,
                        end: occurrence.end,
                        length,
                    });
                }
            }
        }
        Ok(length)
    }

    /// Validated, per-series reduced events in input order.
    pub fn to_events(&self, params: &CausalParams) -> Result<Vec<Event>> {
        let length = self.validate()?;
        let events: Vec<Event> = self
            .series
            .iter()
            .flat_map(|series| {
                motifs_to_events(&series.motifs, length, &series.label, params.merge_threshold)
            })
            .collect();
        info!(series = self.series.len(), events = events.len(), length, "events built");
        Ok(events)
    }
}
