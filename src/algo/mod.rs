pub mod correlation;
pub mod fdist;
pub mod ftest;
pub mod lstsq;

// Re-exports for convenience
pub use correlation::{EventStats, lagged_correlation};
pub use fdist::{f_cdf, f_quantile};
pub use ftest::FTest;
pub use lstsq::{
    LeastSquaresFit, SVD_MAX_ITERATIONS, solve_autoregression, solve_autoregression_with_limit,
};
