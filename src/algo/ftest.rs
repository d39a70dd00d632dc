//! Nested-model F-test used by both Granger comparisons.

use super::fdist::f_quantile;
use serde::Serialize;

/// Test statistic and its upper-tail critical value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FTest {
    pub statistic: f64,
    pub critical: f64,
}

impl FTest {
    /// The degenerate result: both values zero, so nothing is rejected.
    pub const DEGENERATE: FTest = FTest {
        statistic: 0.0,
        critical: 0.0,
    };

    /// Compare a restricted model's SSR against a model with `lag_order`
    /// extra regressors, over `observations` samples.
    ///
    /// `S = ((ssr_restricted - ssr_full) / p) / (ssr_full / (T - 2p - 1))`,
    /// critical value `F^-1(1 - alpha; p, T - 2p - 1)`. A zero `ssr_full`
    /// or non-positive denominator degrees of freedom yields
    /// [`FTest::DEGENERATE`].
    pub fn compare(
        ssr_restricted: f64,
        ssr_full: f64,
        observations: usize,
        lag_order: usize,
        significance: f64,
    ) -> Self {
        if ssr_full == 0.0 {
            return Self::DEGENERATE;
        }

        let d1 = lag_order as f64;
        let d2 = observations as f64 - 2.0 * d1 - 1.0;
        if d2 <= 0.0 {
            return Self::DEGENERATE;
        }

        let statistic = ((ssr_restricted - ssr_full) / d1) / (ssr_full / d2);
        let critical = f_quantile(1.0 - significance, d1, d2);
        Self { statistic, critical }
    }

    /// True when the extra regressors explain significantly more variance.
    #[inline]
    pub fn rejects_null(&self) -> bool {
        self.statistic > self.critical
    }
}
