//! Event Construction and Reduction
//!
//! Motif occurrences become events: 0/1 indicator vectors over the shared
//! observation window. Strongly correlated events of the same series are
//! collapsed into their intersection until no pair merges any more, so the
//! causality tests are not fed redundant copies of one underlying anomaly.

use crate::algo::{EventStats, lagged_correlation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, trace};

/// An inclusive `[begin, end]` index range reported by the motif detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifOccurrence {
    pub begin: usize,
    pub end: usize,
}

impl MotifOccurrence {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }
}

/// Indicator vector of one (possibly merged) occurrence.
///
/// The data is fixed at construction. Correlation stats are materialized on
/// first use and shared by every later read, including reads from worker
/// threads.
#[derive(Debug, Clone)]
pub struct Event {
    series: String,
    data: Vec<f64>,
    stats: OnceLock<EventStats>,
}

impl Event {
    pub fn new(series: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            series: series.into(),
            data,
            stats: OnceLock::new(),
        }
    }

    /// Indicator of `occurrence` over a window of `length` samples.
    ///
    /// Indices past the window are ignored; callers validate ranges first.
    pub fn from_occurrence(
        occurrence: MotifOccurrence,
        length: usize,
        series: impl Into<String>,
    ) -> Self {
        let mut data = vec![0.0; length];
        if occurrence.begin <= occurrence.end {
            for slot in data
                .iter_mut()
                .take(occurrence.end.saturating_add(1))
                .skip(occurrence.begin)
            {
                *slot = 1.0;
            }
        }
        Self::new(series, data)
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn stats(&self) -> &EventStats {
        self.stats.get_or_init(|| EventStats::from_data(&self.data))
    }

    pub fn stats_computed(&self) -> bool {
        self.stats.get().is_some()
    }

    /// First active sample, or `len()` when the event never fires.
    pub fn first_active(&self) -> usize {
        self.data
            .iter()
            .position(|&x| x != 0.0)
            .unwrap_or(self.data.len())
    }

    pub fn active_samples(&self) -> usize {
        self.data.iter().filter(|&&x| x != 0.0).count()
    }

    /// Elementwise product with `other`, labelled with this event's series.
    pub fn intersect(&self, other: &Event) -> Event {
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a * b)
            .collect();
        Event::new(self.series.clone(), data)
    }
}

/// Correlation of `e1(t)` against `e2(t + lag)`.
pub fn pearson_correlation(e1: &Event, e2: &Event, lag: isize) -> f64 {
    lagged_correlation(e1.stats(), e2.stats(), lag)
}

/// One reduction pass over an immutable snapshot.
///
/// Pairs are visited in `(i, j)`, `i < j` order; the first partner above
/// `threshold` claims an event for this pass. Merged events come first, in
/// the order they were formed, followed by untouched events in input order.
pub fn reduce_occurrences(events: &[Event], threshold: f64) -> (Vec<Event>, bool) {
    let count = events.len();
    let mut combined = vec![false; count];
    let mut reduced = Vec::with_capacity(count);
    let mut changed = false;

    for i in 0..count {
        for j in (i + 1)..count {
            if combined[i] || combined[j] {
                continue;
            }
            let r = pearson_correlation(&events[i], &events[j], 0);
            if r > threshold {
                trace!(i, j, r, "merging correlated events");
                combined[i] = true;
                combined[j] = true;
                changed = true;
                reduced.push(events[i].intersect(&events[j]));
            }
        }
    }

    reduced.extend(
        events
            .iter()
            .zip(&combined)
            .filter(|(_, merged)| !**merged)
            .map(|(event, _)| event.clone()),
    );

    (reduced, changed)
}

/// Repeat [`reduce_occurrences`] until a pass merges nothing.
pub fn reduce_to_fixed_point(mut events: Vec<Event>, threshold: f64) -> Vec<Event> {
    let mut passes = 0usize;
    loop {
        let (next, changed) = reduce_occurrences(&events, threshold);
        events = next;
        passes += 1;
        if !changed {
            break;
        }
    }
    debug!(passes, remaining = events.len(), "event reduction converged");
    events
}

/// Events of one series from its motif patterns, reduced to a fixed point.
pub fn motifs_to_events(
    patterns: &[Vec<MotifOccurrence>],
    length: usize,
    series: &str,
    threshold: f64,
) -> Vec<Event> {
    let events: Vec<Event> = patterns
        .iter()
        .flatten()
        .map(|&occurrence| Event::from_occurrence(occurrence, length, series))
        .collect();
    let built = events.len();
    let reduced = reduce_to_fixed_point(events, threshold);
    debug!(series, built, reduced = reduced.len(), "series events ready");
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MERGE_THRESHOLD;

    fn pulse(len: usize, begin: usize, end: usize) -> Event {
        Event::from_occurrence(MotifOccurrence::new(begin, end), len, "x")
    }

    #[test]
    fn test_occurrence_is_inclusive() {
        let e = pulse(10, 1, 2);
        assert_eq!(e.data(), &[0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(e.first_active(), 1);
        assert_eq!(e.active_samples(), 2);
        assert!(!e.stats_computed());
    }

    #[test]
    fn test_inverted_range_builds_silent_event() {
        let e = pulse(6, 4, 2);
        assert_eq!(e.active_samples(), 0);
        assert_eq!(e.first_active(), 6);
    }

    #[test]
    fn test_correlation_symmetric_at_zero_lag() {
        let a = pulse(40, 3, 9);
        let b = pulse(40, 6, 15);
        let ab = pearson_correlation(&a, &b, 0);
        let ba = pearson_correlation(&b, &a, 0);
        assert!((ab - ba).abs() < 1e-12, "{} vs {}", ab, ba);
    }

    #[test]
    fn test_stats_cached_once() {
        let a = pulse(20, 2, 5);
        let b = pulse(20, 3, 6);
        let first = pearson_correlation(&a, &b, 0);
        let snapshot = a.stats().clone();
        let ptr = a.stats() as *const EventStats;

        let second = pearson_correlation(&a, &b, 0);
        assert_eq!(first, second);
        assert_eq!(a.stats(), &snapshot);
        assert!(std::ptr::eq(ptr, a.stats()), "stats must not be rebuilt");
    }

    #[test]
    fn test_identical_events_merge() {
        let a = pulse(10, 1, 2);
        let b = pulse(10, 1, 2);
        let r = pearson_correlation(&a, &b, 0);
        assert!((r - 1.0).abs() < 1e-12);

        let (reduced, changed) = reduce_occurrences(&[a, b], MERGE_THRESHOLD);
        assert!(changed);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced[0].first_active(), 1);
        assert!(!reduced[0].stats_computed(), "merged event starts without stats");
    }

    #[test]
    fn test_merge_is_intersection() {
        // 9 of 10 samples shared: r ≈ 0.9
        let a = pulse(100, 10, 19);
        let b = pulse(100, 11, 20);
        let (reduced, changed) = reduce_occurrences(&[a, b], MERGE_THRESHOLD);
        assert!(changed);
        assert_eq!(reduced[0].first_active(), 11);
        assert_eq!(reduced[0].active_samples(), 9);
    }

    #[test]
    fn test_uncorrelated_events_pass_through_in_order() {
        let a = pulse(50, 0, 4);
        let b = pulse(50, 20, 24);
        let c = pulse(50, 40, 44);
        let (reduced, changed) = reduce_occurrences(&[a, b, c], MERGE_THRESHOLD);
        assert!(!changed);
        let begins: Vec<usize> = reduced.iter().map(Event::first_active).collect();
        assert_eq!(begins, vec![0, 20, 40]);
    }

    #[test]
    fn test_merged_events_precede_survivors() {
        let lone = pulse(60, 0, 3);
        let a = pulse(60, 30, 39);
        let b = pulse(60, 30, 39);
        let (reduced, _) = reduce_occurrences(&[lone, a, b], MERGE_THRESHOLD);
        let begins: Vec<usize> = reduced.iter().map(Event::first_active).collect();
        assert_eq!(begins, vec![30, 0]);
    }

    #[test]
    fn test_fixed_point_is_stable() {
        let events = vec![
            pulse(80, 10, 19),
            pulse(80, 10, 19),
            pulse(80, 10, 19),
            pulse(80, 11, 19),
            pulse(80, 50, 60),
        ];
        let reduced = reduce_to_fixed_point(events, MERGE_THRESHOLD);
        let (again, changed) = reduce_occurrences(&reduced, MERGE_THRESHOLD);
        assert!(!changed);
        assert_eq!(again.len(), reduced.len());
        for (a, b) in again.iter().zip(&reduced) {
            assert_eq!(a.data(), b.data());
        }
        assert_eq!(reduced.len(), 2);
    }

    #[test]
    fn test_constant_events_never_merge() {
        let silent = Event::new("x", vec![0.0; 12]);
        let also_silent = Event::new("x", vec![0.0; 12]);
        assert_eq!(pearson_correlation(&silent, &also_silent, 0), 0.0);
        let (reduced, changed) = reduce_occurrences(&[silent, also_silent], MERGE_THRESHOLD);
        assert!(!changed);
        assert_eq!(reduced.len(), 2);
    }

    #[test]
    fn test_motifs_flatten_patterns() {
        let patterns = vec![
            vec![MotifOccurrence::new(1, 2), MotifOccurrence::new(1, 2)],
            vec![MotifOccurrence::new(6, 8)],
        ];
        let events = motifs_to_events(&patterns, 10, "cpu", MERGE_THRESHOLD);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.series() == "cpu"));
        assert_eq!(events[0].first_active(), 1);
        assert_eq!(events[1].first_active(), 6);
    }
}
