//! Granger Causality Tester
//!
//! For an ordered pair `(cause, effect)` the effect's indicator vector is
//! regressed on lagged copies of every event, each block shifted by the
//! estimated dead time towards the effect. Three models are compared:
//!
//! - **Unrestricted**: intercept plus a `p`-column lag block per event.
//! - **Restricted**: the same without the cause's block.
//! - **Extended**: the restricted model plus a forward-looking block of the
//!   cause, shifted by the reverse dead time `effect -> cause`.
//!
//! The first F-test (restricted vs unrestricted) asks whether the cause adds
//! explanatory power at all. If it does, the second F-test (restricted vs
//! extended) asks whether the *future* of the cause explains the effect just
//! as well. If it does not, the link is direct; if it does, both are more
//! likely driven by a common unobserved source.

use crate::algo::{FTest, SVD_MAX_ITERATIONS, solve_autoregression_with_limit};
use crate::config::CausalParams;
use crate::event::Event;
use crate::lag::DeadTimes;
use crate::pool::{ordered_pairs, run_pairs};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Which regressors enter a design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelLayout {
    Unrestricted,
    Restricted,
    Extended,
}

impl ModelLayout {
    fn includes_cause(self) -> bool {
        matches!(self, ModelLayout::Unrestricted)
    }

    fn name(self) -> &'static str {
        match self {
            ModelLayout::Unrestricted => "unrestricted",
            ModelLayout::Restricted => "restricted",
            ModelLayout::Extended => "extended",
        }
    }
}

/// Decision for one ordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    Unrelated,
    /// `cause -> effect` with the dead time as weight.
    Direct { weight: usize },
    HiddenCommonCause,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairOutcome {
    pub cause: usize,
    pub effect: usize,
    pub verdict: Verdict,
    /// Restricted vs unrestricted.
    pub first: FTest,
    /// Restricted vs extended; only run when the first test rejects.
    pub second: Option<FTest>,
}

/// Read-only view over the inputs shared by every pair test.
#[derive(Debug, Clone, Copy)]
pub struct CausalityTester<'a> {
    events: &'a [Event],
    dead_times: &'a DeadTimes,
    params: &'a CausalParams,
    svd_iterations: usize,
}

impl<'a> CausalityTester<'a> {
    pub fn new(events: &'a [Event], dead_times: &'a DeadTimes, params: &'a CausalParams) -> Self {
        debug_assert_eq!(events.len(), dead_times.len(), "one dead time row per event");
        Self {
            events,
            dead_times,
            params,
            svd_iterations: SVD_MAX_ITERATIONS,
        }
    }

    /// Cap the SVD iterations of every regression.
    pub fn with_svd_iterations(mut self, max_iterations: usize) -> Self {
        self.svd_iterations = max_iterations;
        self
    }

    /// Design matrix of `layout` for predicting `effect`.
    ///
    /// Column 0 is the intercept. Each included event `l` contributes `p`
    /// columns holding `events[l][t - k - d]` for `k` in `0..p`, where `d` is
    /// `dead_times[l][effect]`, or 1 for the effect's own block so it never
    /// sees the current sample. Out-of-range samples are 0.
    pub fn design_matrix(&self, cause: usize, effect: usize, layout: ModelLayout) -> DMatrix<f64> {
        let p = self.params.lag_order;
        let rows = self.events[effect].len();
        let blocks = self.events.len() - usize::from(!layout.includes_cause())
            + usize::from(layout == ModelLayout::Extended);

        let mut design = DMatrix::<f64>::zeros(rows, 1 + blocks * p);
        design.column_mut(0).fill(1.0);

        let mut block = 0;
        for (l, event) in self.events.iter().enumerate() {
            if l == cause && !layout.includes_cause() {
                continue;
            }
            // A zero self-delay would put y(t) among its own regressors and
            // every model would fit exactly.
            let delay = if l == effect {
                1
            } else {
                self.dead_times.get(l, effect)
            };
            let data = event.data();
            for k in 0..p {
                let col = 1 + block * p + k;
                for t in 0..rows {
                    if let Some(&x) = t.checked_sub(k + delay).and_then(|tl| data.get(tl)) {
                        design[(t, col)] = x;
                    }
                }
            }
            block += 1;
        }

        if layout == ModelLayout::Extended {
            let lead = self.dead_times.get(effect, cause);
            let data = self.events[cause].data();
            for k in 0..p {
                let col = 1 + block * p + k;
                for t in 0..rows {
                    if let Some(&x) = data.get(t + k + lead) {
                        design[(t, col)] = x;
                    }
                }
            }
        }

        design
    }

    fn ssr(&self, cause: usize, effect: usize, layout: ModelLayout) -> f64 {
        let design = self.design_matrix(cause, effect, layout);
        let y = DVector::from_column_slice(self.events[effect].data());
        let fit = solve_autoregression_with_limit(
            &design,
            &y,
            self.params.ssr_epsilon,
            self.svd_iterations,
        );
        if !fit.converged {
            warn!(
                cause,
                effect,
                model = layout.name(),
                "least squares did not converge, continuing with residual SSR"
            );
        }
        trace!(
            cause,
            effect,
            model = layout.name(),
            ssr = fit.ssr,
            rank = fit.rank,
            "regression"
        );
        fit.ssr
    }

    /// Run both F-tests for `cause -> effect`.
    pub fn determine_causality(&self, cause: usize, effect: usize) -> PairOutcome {
        let observations = self.events[effect].len();
        let p = self.params.lag_order;
        let alpha = self.params.significance;

        // No denominator degrees of freedom: both tests are degenerate.
        if observations <= 2 * p + 1 {
            return PairOutcome {
                cause,
                effect,
                verdict: Verdict::Unrelated,
                first: FTest::DEGENERATE,
                second: None,
            };
        }

        let ssr_full = self.ssr(cause, effect, ModelLayout::Unrestricted);
        let ssr_restricted = self.ssr(cause, effect, ModelLayout::Restricted);
        let first = FTest::compare(ssr_restricted, ssr_full, observations, p, alpha);

        if !first.rejects_null() {
            debug!(
                cause,
                effect,
                sp = first.statistic,
                crit = first.critical,
                "no causal relation"
            );
            return PairOutcome {
                cause,
                effect,
                verdict: Verdict::Unrelated,
                first,
                second: None,
            };
        }

        let ssr_extended = self.ssr(cause, effect, ModelLayout::Extended);
        let second = FTest::compare(ssr_restricted, ssr_extended, observations, p, alpha);
        let verdict = if second.statistic < second.critical {
            Verdict::Direct {
                weight: self.dead_times.get(cause, effect),
            }
        } else {
            Verdict::HiddenCommonCause
        };

        debug!(
            cause,
            effect,
            sp = first.statistic,
            sfp = second.statistic,
            crit = second.critical,
            ?verdict,
            "causal relation"
        );

        PairOutcome {
            cause,
            effect,
            verdict,
            first,
            second: Some(second),
        }
    }

    /// Every ordered pair, in `(cause, effect)` order.
    pub fn test_all(&self, workers: usize) -> Vec<PairOutcome> {
        let size = self.events.len();
        if size > 1 {
            let observations = self.events[0].len();
            if observations <= 2 * self.params.lag_order + 1 {
                warn!(
                    observations,
                    lag_order = self.params.lag_order,
                    "series too short for the F-tests, every pair will be unrelated"
                );
            }
        }

        let tester = *self;
        run_pairs(ordered_pairs(size), workers, move |cause, effect| {
            tester.determine_causality(cause, effect)
        })
        .into_iter()
        .map(|(_, outcome)| outcome)
        .collect()
    }
}
