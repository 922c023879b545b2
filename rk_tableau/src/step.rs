//! A single explicit Runge-Kutta step over a flat state, used to exercise
//! tableaus end to end. Step size control stays with the integrator.

use crate::{error::TableauErrors, precision::TableauScalar, tableau::ExplicitRkTableau};

/// Right-hand side `dy/dt = f(t, y)` of an ODE system.
pub trait RightHandSide<T> {
    /// Compute the derivative at time `t` and state `state`, storing the result in `derivative`.
    fn f(&mut self, t: T, state: &[T], derivative: &mut [T]);
}

impl<T, F> RightHandSide<T> for F
where
    F: FnMut(T, &[T], &mut [T]),
{
    fn f(&mut self, t: T, state: &[T], derivative: &mut [T]) {
        self(t, state, derivative)
    }
}

// preallocated buffers for intermediate calculations
struct StageBuffer<T> {
    k: Vec<Vec<T>>,
    state: Vec<T>,
}

impl<T: TableauScalar> StageBuffer<T> {
    fn new(stages: usize, dim: usize) -> Self {
        Self {
            k: vec![vec![T::zero(); dim]; stages],
            state: vec![T::zero(); dim],
        }
    }
}

/// Result of one step from `y` at `t` with size `h`.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutput<T> {
    /// `h * sum(b_i * k_i)`, to be added to the starting state.
    pub increment: Vec<T>,
    /// `h * sum(e_i * k_i)`; `None` for fixed order tableaus.
    pub error: Option<Vec<T>>,
    /// Stage derivatives `k_i`, e.g. for combining with dense output weights.
    pub stages: Vec<Vec<T>>,
}

impl<T: TableauScalar> StepOutput<T> {
    /// Largest component of the error estimate.
    pub fn max_abs_error(&self) -> Option<T> {
        self.error
            .as_ref()
            .map(|error| error.iter().fold(T::zero(), |max, e| max.max(e.abs())))
    }

    /// `y + increment`.
    pub fn advance(&self, y: &[T]) -> Vec<T> {
        y.iter()
            .zip(&self.increment)
            .map(|(y, dy)| *y + *dy)
            .collect()
    }

    /// `y + h * sum(w_i * k_i)` for a set of weights over the stages, such as
    /// dense output coefficients.
    pub fn combine(&self, y: &[T], h: T, weights: &[T]) -> Vec<T> {
        let mut out = y.to_vec();
        for (w, k) in weights.iter().zip(&self.stages) {
            for (out, k) in out.iter_mut().zip(k) {
                *out = *out + h * *w * *k;
            }
        }
        out
    }
}

pub struct RungeKuttaStep<'a, T> {
    tableau: &'a ExplicitRkTableau<T>,
    dim: usize,
    buffers: StageBuffer<T>,
}

impl<'a, T: TableauScalar> RungeKuttaStep<'a, T> {
    pub fn new(tableau: &'a ExplicitRkTableau<T>, dim: usize) -> Self {
        Self {
            tableau,
            dim,
            buffers: StageBuffer::new(tableau.stages(), dim),
        }
    }

    pub fn step<Rhs: RightHandSide<T>>(
        &mut self,
        rhs: &mut Rhs,
        t: T,
        y: &[T],
        h: T,
    ) -> Result<StepOutput<T>, TableauErrors> {
        if y.len() != self.dim {
            return Err(TableauErrors::DimensionMismatch {
                expected: self.dim,
                found: y.len(),
            });
        }
        let tableau = self.tableau.tableau();
        let k = &mut self.buffers.k;
        let state = &mut self.buffers.state;

        // k0
        rhs.f(t, y, &mut k[0]);

        // k1 - ks
        for s in 1..tableau.stages() {
            // sum previous ks with appropriate scaling from tableau
            state.copy_from_slice(y);
            for (a, k_i) in tableau.stage_row(s).iter().zip(k.iter()) {
                for (x, dx) in state.iter_mut().zip(k_i) {
                    *x = *x + h * *a * *dx;
                }
            }
            rhs.f(t + tableau.nodes()[s] * h, state, &mut k[s]);
        }

        let increment = weighted_sum(k, tableau.solution_weights(), h, self.dim);
        let error = self
            .tableau
            .as_embedded()
            .map(|embedded| weighted_sum(k, embedded.error_weights(), h, self.dim));

        Ok(StepOutput {
            increment,
            error,
            stages: k.clone(),
        })
    }
}

fn weighted_sum<T: TableauScalar>(k: &[Vec<T>], weights: &[T], h: T, dim: usize) -> Vec<T> {
    let mut out = vec![T::zero(); dim];
    for (w, k_i) in weights.iter().zip(k) {
        for (out, dx) in out.iter_mut().zip(k_i) {
            *out = *out + *w * *dx;
        }
    }
    out.iter_mut().for_each(|x| *x = *x * h);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interpolation::get_dense_output_weights, method::MethodId, registry::get_tableau};
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-12;

    fn exponential(_t: f64, y: &[f64], dy: &mut [f64]) {
        dy[0] = y[0];
    }

    #[test]
    fn test_dopri5_exponential() {
        let tableau = get_tableau::<f64>(MethodId::Dopri5).unwrap();
        let mut step = RungeKuttaStep::new(&tableau, 1);
        let out = step.step(&mut exponential, 0.0, &[1.0], 0.1).unwrap();

        assert_abs_diff_eq!(out.increment[0], 0.1f64.exp() - 1.0, epsilon = 1e-8);
        let error = out.max_abs_error().unwrap();
        assert!(error < 1e-6, "{error}");
        assert!(error > 0.0);
        assert_abs_diff_eq!(out.advance(&[1.0])[0], 0.1f64.exp(), epsilon = 1e-8);
    }

    #[test]
    fn test_dopri5_dense_midpoint() {
        let tableau = get_tableau::<f64>(MethodId::Dopri5).unwrap();
        let dense = get_dense_output_weights::<f64>(MethodId::Dopri5).unwrap();
        let mut step = RungeKuttaStep::new(&tableau, 1);
        let out = step.step(&mut exponential, 0.0, &[1.0], 0.1).unwrap();
        let mid = out.combine(&[1.0], 0.1, dense.weights());
        assert_abs_diff_eq!(mid[0], 0.05f64.exp(), epsilon = 1e-7);
    }

    #[test]
    fn test_fsal_last_stage_is_new_derivative() {
        for method in [MethodId::Dopri5, MethodId::Tsit5] {
            let tableau = get_tableau::<f64>(method).unwrap();
            let mut step = RungeKuttaStep::new(&tableau, 1);
            let out = step.step(&mut exponential, 0.0, &[1.0], 0.1).unwrap();
            let y1 = out.advance(&[1.0]);
            // f(y1) = y1 for the exponential
            assert_abs_diff_eq!(out.stages[6][0], y1[0], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_rk4_has_no_error_estimate() {
        let tableau = get_tableau::<f64>(MethodId::Rk4).unwrap();
        let mut step = RungeKuttaStep::new(&tableau, 1);
        let out = step.step(&mut exponential, 0.0, &[1.0], 0.1).unwrap();
        assert!(out.error.is_none());
        assert!(out.max_abs_error().is_none());
        assert_abs_diff_eq!(out.increment[0], 0.1f64.exp() - 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_monomials_integrated_exactly() {
        // y' = k t^(k-1) has solution t^k
        for method in MethodId::ALL {
            let tableau = get_tableau::<f64>(method).unwrap();
            let (t0, h) = (0.5, 0.5);
            for degree in 1..=tableau.order() as i32 {
                let mut rhs = |t: f64, _y: &[f64], dy: &mut [f64]| {
                    dy[0] = f64::from(degree) * t.powi(degree - 1);
                };
                let mut step = RungeKuttaStep::new(&tableau, 1);
                let out = step.step(&mut rhs, t0, &[t0.powi(degree)], h).unwrap();
                let exact = (t0 + h).powi(degree) - t0.powi(degree);
                assert_abs_diff_eq!(out.increment[0], exact, epsilon = TOL);
            }
        }
    }

    #[test]
    fn test_polynomial_chain_integrated_exactly() {
        // y_1' = 1, y_j' = y_(j-1): y_j = t^j / j! from a zero initial state,
        // which goes through the stage matrix rather than only the nodes
        for method in MethodId::ALL {
            let tableau = get_tableau::<f64>(method).unwrap();
            let dim = tableau.order();
            let mut rhs = |_t: f64, y: &[f64], dy: &mut [f64]| {
                dy[0] = 1.0;
                for j in 1..y.len() {
                    dy[j] = y[j - 1];
                }
            };
            let h = 0.8;
            let mut step = RungeKuttaStep::new(&tableau, dim);
            let out = step.step(&mut rhs, 0.0, &vec![0.0; dim], h).unwrap();
            let mut factorial = 1.0;
            for j in 0..dim {
                factorial *= (j + 1) as f64;
                let exact = h.powi(j as i32 + 1) / factorial;
                assert_abs_diff_eq!(out.increment[j], exact, epsilon = TOL);
            }
        }
    }

    #[test]
    fn test_order_is_not_exceeded() {
        // one degree past the claimed order is no longer exact
        for method in MethodId::ALL {
            let tableau = get_tableau::<f64>(method).unwrap();
            let degree = tableau.order() as i32 + 1;
            let mut rhs = |t: f64, _y: &[f64], dy: &mut [f64]| {
                dy[0] = f64::from(degree) * t.powi(degree - 1);
            };
            let mut step = RungeKuttaStep::new(&tableau, 1);
            let out = step.step(&mut rhs, 0.0, &[0.0], 1.0).unwrap();
            assert!((out.increment[0] - 1.0).abs() > 1e-6, "{method}");
        }
    }

    #[test]
    fn test_single_precision_step() {
        let tableau = get_tableau::<f32>(MethodId::Tsit5).unwrap();
        let mut step = RungeKuttaStep::new(&tableau, 1);
        let mut rhs = |_t: f32, y: &[f32], dy: &mut [f32]| dy[0] = y[0];
        let out = step.step(&mut rhs, 0.0, &[1.0], 0.1).unwrap();
        assert_abs_diff_eq!(out.increment[0], 0.1f32.exp() - 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_dimension_mismatch() {
        let tableau = get_tableau::<f64>(MethodId::Rk4).unwrap();
        let mut step = RungeKuttaStep::new(&tableau, 2);
        let err = step.step(&mut exponential, 0.0, &[1.0], 0.1).unwrap_err();
        assert_eq!(
            err,
            TableauErrors::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }
}
