//! Minimum-norm least squares through the singular value decomposition.
//!
//! Autoregression design matrices built from indicator vectors are routinely
//! rank deficient (all-zero lag columns, duplicated blocks), so the solve goes
//! through the SVD and treats singular values below
//! `max(rows, cols) * f64::EPSILON * s_max` as zero. That yields the
//! minimum-norm solution for any shape of system.

use nalgebra::{DMatrix, DVector};

/// Default iteration cap for the SVD. 0 would mean unbounded in nalgebra.
pub const SVD_MAX_ITERATIONS: usize = 10_000;

/// Outcome of one regression.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresFit {
    /// Sum of squared residuals, noise-filtered by the caller's epsilon.
    pub ssr: f64,
    /// Numerical rank of the design matrix (0 when the SVD failed).
    pub rank: usize,
    /// False when the SVD did not converge; `ssr` is then taken against a
    /// zero prediction.
    pub converged: bool,
}

/// Regress `y` on the columns of `design` and return the filtered SSR.
///
/// Only squared residuals strictly greater than `epsilon` contribute.
pub fn solve_autoregression(
    design: &DMatrix<f64>,
    y: &DVector<f64>,
    epsilon: f64,
) -> LeastSquaresFit {
    solve_autoregression_with_limit(design, y, epsilon, SVD_MAX_ITERATIONS)
}

/// [`solve_autoregression`] with an explicit SVD iteration cap.
pub fn solve_autoregression_with_limit(
    design: &DMatrix<f64>,
    y: &DVector<f64>,
    epsilon: f64,
    max_iterations: usize,
) -> LeastSquaresFit {
    let (rows, cols) = design.shape();
    debug_assert_eq!(rows, y.len(), "design rows must match observations");

    // nalgebra refuses to decompose an empty matrix.
    if rows == 0 || cols == 0 {
        return LeastSquaresFit {
            ssr: filtered_ssr(y.iter().copied(), epsilon),
            rank: 0,
            converged: true,
        };
    }

    let Some(svd) = design
        .clone()
        .try_svd(true, true, f64::EPSILON, max_iterations)
    else {
        return LeastSquaresFit {
            ssr: filtered_ssr(y.iter().copied(), epsilon),
            rank: 0,
            converged: false,
        };
    };

    let s_max = svd.singular_values.max();
    let tolerance = rows.max(cols) as f64 * f64::EPSILON * s_max;
    let rank = svd.rank(tolerance);

    match svd.solve(y, tolerance) {
        Ok(beta) => {
            let fitted = design * beta;
            let residuals = y - fitted;
            LeastSquaresFit {
                ssr: filtered_ssr(residuals.iter().copied(), epsilon),
                rank,
                converged: true,
            }
        }
        Err(_) => LeastSquaresFit {
            ssr: filtered_ssr(y.iter().copied(), epsilon),
            rank,
            converged: false,
        },
    }
}

fn filtered_ssr(residuals: impl Iterator<Item = f64>, epsilon: f64) -> f64 {
    residuals.map(|r| r * r).filter(|r2| *r2 > epsilon).sum()
}
