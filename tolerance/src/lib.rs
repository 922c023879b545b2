use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Absolute and relative tolerance pair used when comparing computed values
/// against their exact counterparts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tolerances<T> {
    abs_tol: T,
    rel_tol: T,
}

impl<T: Float> Default for Tolerances<T> {
    fn default() -> Self {
        Self::epsilon_scaled(T::one())
    }
}

impl<T: Float> Tolerances<T> {
    pub fn new(rel_tol: T, abs_tol: T) -> Self {
        Self { rel_tol, abs_tol }
    }

    /// Both tolerances set to `factor` machine epsilons of `T`.
    pub fn epsilon_scaled(factor: T) -> Self {
        let tol = T::epsilon() * factor;
        Self {
            abs_tol: tol,
            rel_tol: tol,
        }
    }

    pub fn with_abs_tol(mut self, abs_tol: T) -> Self {
        self.abs_tol = abs_tol;
        self
    }

    pub fn with_rel_tol(mut self, rel_tol: T) -> Self {
        self.rel_tol = rel_tol;
        self
    }

    pub fn abs_tol(&self) -> T {
        self.abs_tol
    }

    pub fn rel_tol(&self) -> T {
        self.rel_tol
    }

    /// `true` when `actual` is within tolerance of `expected`.
    pub fn check_error(&self, expected: T, actual: T) -> bool {
        check_error(expected, actual, self.rel_tol, self.abs_tol)
    }
}

/// Passes when either the absolute or the relative difference is in bounds.
/// The relative test is skipped for an `expected` of zero.
pub fn check_error<T: Float>(expected: T, actual: T, rel_tol: T, abs_tol: T) -> bool {
    if !actual.is_finite() {
        return false;
    }
    let abs_diff = (actual - expected).abs();
    if abs_diff <= abs_tol {
        return true;
    }
    expected.abs() > T::min_positive_value() && abs_diff / expected.abs() <= rel_tol
}
