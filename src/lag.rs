//! Dead-time (lag) estimation between events.

use crate::event::{Event, pearson_correlation};
use crate::pool::{ordered_pairs, run_pairs};
use serde::Serialize;
use tracing::debug;

/// Lag in `[0, max_lag)` maximizing `r(e1(t), e2(t + lag))`.
///
/// Starts from correlation 0 at lag 0 and only moves on a strictly larger
/// value, so pairs with no positive correlation anywhere report 0.
pub fn find_dead_time(e1: &Event, e2: &Event, max_lag: usize) -> usize {
    let mut best = 0.0;
    let mut best_lag = 0;
    for lag in 0..max_lag {
        let r = pearson_correlation(e1, e2, lag as isize);
        if r > best {
            best = r;
            best_lag = lag;
        }
    }
    best_lag
}

/// Square matrix of dead times, `get(cause, effect)`; the diagonal is 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadTimes {
    size: usize,
    values: Vec<usize>,
}

impl DeadTimes {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0; size * size],
        }
    }

    /// Dead times for every ordered pair of `events`.
    pub fn estimate(events: &[Event], max_lag: usize, workers: usize) -> Self {
        let size = events.len();
        let mut matrix = Self::zeros(size);

        let results = run_pairs(ordered_pairs(size), workers, |i, j| {
            find_dead_time(&events[i], &events[j], max_lag)
        });
        for ((i, j), lag) in results {
            matrix.set(i, j, lag);
        }

        debug!(events = size, max_lag, "pairwise dead times estimated");
        matrix
    }

    #[inline]
    pub fn get(&self, cause: usize, effect: usize) -> usize {
        self.values[cause * self.size + effect]
    }

    pub fn set(&mut self, cause: usize, effect: usize, lag: usize) {
        self.values[cause * self.size + effect] = lag;
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Sequential convenience over [`DeadTimes::estimate`].
pub fn find_pairwise_dead_times(events: &[Event], max_lag: usize) -> DeadTimes {
    DeadTimes::estimate(events, max_lag, 1)
}
