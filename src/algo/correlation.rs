//! Lagged Pearson correlation over event indicator vectors.
//!
//! `r(lag) = sum_i diffs1[i] * diffs2[i + lag] / (std1 * std2)`, summed only
//! where `i + lag` falls inside the window. `std` is the square root of the
//! raw sum of squared deviations (not divided by the sample count), so the
//! zero-lag value is the ordinary correlation coefficient while shifted lags
//! shrink with the overlap.

/// Centered values and spread of one event, computed once per event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStats {
    pub diffs: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl EventStats {
    pub fn from_data(data: &[f64]) -> Self {
        if data.is_empty() {
            return Self {
                diffs: Vec::new(),
                mean: 0.0,
                std: 0.0,
            };
        }

        let mean = data.iter().sum::<f64>() / data.len() as f64;
        let diffs: Vec<f64> = data.iter().map(|x| x - mean).collect();
        let variance: f64 = diffs.iter().map(|d| d * d).sum();

        Self {
            diffs,
            mean,
            std: variance.sqrt(),
        }
    }

    /// A constant vector has no spread and correlates with nothing.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.std == 0.0
    }
}

/// Correlation of `a(t)` against `b(t + lag)`.
///
/// Returns 0.0 when either side is constant. Both stats must come from
/// vectors of the same length.
pub fn lagged_correlation(a: &EventStats, b: &EventStats, lag: isize) -> f64 {
    if a.is_constant() || b.is_constant() {
        return 0.0;
    }

    let len = a.diffs.len() as isize;
    let sum: f64 = (0..len)
        .filter_map(|i| {
            let j = i + lag;
            (j >= 0 && j < len).then(|| a.diffs[i as usize] * b.diffs[j as usize])
        })
        .sum();

    sum / (a.std * b.std)
}
