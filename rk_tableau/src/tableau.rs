use std::ops::Deref;

use serde::Serialize;

use crate::{
    error::TableauErrors,
    method::MethodId,
    precision::{FloatPrecision, TableauScalar},
};

/// Coefficients of an explicit Runge-Kutta method with `s` stages.
///
/// `nodes[0]` is the first stage's node and is always zero. The stage matrix
/// is strictly lower triangular and stored without its zero upper part: it
/// has `s - 1` rows and the row feeding stage `i` (0-based) holds `i`
/// entries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ButcherTableau<T> {
    method: MethodId,
    order: usize,
    nodes: Vec<T>,
    stage_matrix: Vec<Vec<T>>,
    solution_weights: Vec<T>,
    precision: FloatPrecision,
    literal_digits: u32,
}

impl<T: TableauScalar> ButcherTableau<T> {
    /// Assembles a tableau, checking the explicit-method shape invariants.
    ///
    /// `literal_digits` is the number of significant digits the source
    /// coefficients were published with, zero when they are exact ratios.
    pub fn new(
        method: MethodId,
        order: usize,
        nodes: Vec<T>,
        stage_matrix: Vec<Vec<T>>,
        solution_weights: Vec<T>,
        literal_digits: u32,
    ) -> Result<Self, TableauErrors> {
        let invalid = |reason: String| TableauErrors::InvalidShape { method, reason };

        let stages = solution_weights.len();
        if stages == 0 {
            return Err(invalid("a tableau needs at least one stage".into()));
        }
        if nodes.len() != stages {
            return Err(invalid(format!(
                "{} nodes for {stages} stages",
                nodes.len()
            )));
        }
        if !nodes[0].is_zero() {
            return Err(invalid(format!("first node is {}, not 0", nodes[0])));
        }
        if let Some(node) = nodes.iter().find(|c| !(**c >= T::zero() && **c <= T::one())) {
            return Err(invalid(format!("node {node} lies outside [0, 1]")));
        }
        if let Some(pair) = nodes.windows(2).find(|pair| pair[1] < pair[0]) {
            return Err(invalid(format!("nodes decrease from {} to {}", pair[0], pair[1])));
        }
        if stage_matrix.len() != stages - 1 {
            return Err(invalid(format!(
                "{} stage matrix rows for {stages} stages",
                stage_matrix.len()
            )));
        }
        for (i, row) in stage_matrix.iter().enumerate() {
            // row i feeds stage i + 1
            if row.len() != i + 1 {
                return Err(invalid(format!(
                    "stage {} row has {} entries, expected {}",
                    i + 2,
                    row.len(),
                    i + 1
                )));
            }
        }
        let all_finite = stage_matrix
            .iter()
            .flatten()
            .chain(&solution_weights)
            .all(|value| value.is_finite());
        if !all_finite {
            return Err(invalid("non-finite coefficient".into()));
        }

        Ok(Self {
            method,
            order,
            nodes,
            stage_matrix,
            solution_weights,
            precision: T::PRECISION,
            literal_digits,
        })
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Order of the solution weights.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn stages(&self) -> usize {
        self.solution_weights.len()
    }

    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    pub fn stage_matrix(&self) -> &[Vec<T>] {
        &self.stage_matrix
    }

    /// Coefficients combining earlier stage derivatives into the argument of
    /// `stage` (0-based). Empty for the first stage.
    ///
    /// # Panics
    ///
    /// Panics if `stage >= self.stages()`.
    pub fn stage_row(&self, stage: usize) -> &[T] {
        match stage {
            0 => &[],
            _ => &self.stage_matrix[stage - 1],
        }
    }

    pub fn solution_weights(&self) -> &[T] {
        &self.solution_weights
    }

    pub fn precision(&self) -> FloatPrecision {
        self.precision
    }

    pub fn literal_digits(&self) -> u32 {
        self.literal_digits
    }

    /// `true` when the published coefficients carry more digits than the
    /// tableau's precision can hold. Values are still correctly rounded.
    pub fn is_precision_limited(&self) -> bool {
        self.literal_digits > self.precision.significant_digits()
    }

    /// First-same-as-last: the last stage is evaluated at the new solution, so
    /// its derivative can start the next step.
    pub fn is_fsal(&self) -> bool {
        let s = self.stages();
        s > 1
            && self.nodes[s - 1] == T::one()
            && self.solution_weights[s - 1].is_zero()
            && self.stage_matrix[s - 2][..] == self.solution_weights[..s - 1]
    }

    pub fn max_abs_coefficient(&self) -> T {
        self.stage_matrix
            .iter()
            .flatten()
            .chain(&self.solution_weights)
            .fold(T::zero(), |max, value| max.max(value.abs()))
    }
}

/// A method without an embedded error estimator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FixedOrderTableau<T> {
    tableau: ButcherTableau<T>,
}

impl<T: TableauScalar> FixedOrderTableau<T> {
    pub fn new(tableau: ButcherTableau<T>) -> Self {
        Self { tableau }
    }
}

impl<T> Deref for FixedOrderTableau<T> {
    type Target = ButcherTableau<T>;
    fn deref(&self) -> &Self::Target {
        &self.tableau
    }
}

/// A method with a second, lower order set of weights sharing its stages.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmbeddedTableau<T> {
    tableau: ButcherTableau<T>,
    embedded_order: usize,
    embedded_weights: Vec<T>,
    error_weights: Vec<T>,
}

impl<T: TableauScalar> EmbeddedTableau<T> {
    /// Pairs `tableau` with its lower order weights. The error weights are the
    /// pointwise difference `solution_weights - embedded_weights`.
    pub fn new(
        tableau: ButcherTableau<T>,
        embedded_order: usize,
        embedded_weights: Vec<T>,
    ) -> Result<Self, TableauErrors> {
        if embedded_weights.len() != tableau.stages() {
            return Err(TableauErrors::InvalidShape {
                method: tableau.method(),
                reason: format!(
                    "{} embedded weights for {} stages",
                    embedded_weights.len(),
                    tableau.stages()
                ),
            });
        }
        if embedded_weights.iter().any(|value| !value.is_finite()) {
            return Err(TableauErrors::InvalidShape {
                method: tableau.method(),
                reason: "non-finite embedded weight".into(),
            });
        }
        let error_weights = tableau
            .solution_weights()
            .iter()
            .zip(&embedded_weights)
            .map(|(b, b_hat)| *b - *b_hat)
            .collect();
        Ok(Self {
            tableau,
            embedded_order,
            embedded_weights,
            error_weights,
        })
    }

    pub fn embedded_order(&self) -> usize {
        self.embedded_order
    }

    pub fn embedded_weights(&self) -> &[T] {
        &self.embedded_weights
    }

    pub fn error_weights(&self) -> &[T] {
        &self.error_weights
    }
}

impl<T> Deref for EmbeddedTableau<T> {
    type Target = ButcherTableau<T>;
    fn deref(&self) -> &Self::Target {
        &self.tableau
    }
}

/// Tableau handed to an integrator. Only the embedded variant can drive
/// error based step size control.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ExplicitRkTableau<T> {
    FixedOrder(FixedOrderTableau<T>),
    Embedded(EmbeddedTableau<T>),
}

impl<T: TableauScalar> ExplicitRkTableau<T> {
    pub fn tableau(&self) -> &ButcherTableau<T> {
        match self {
            ExplicitRkTableau::FixedOrder(fixed) => &fixed.tableau,
            ExplicitRkTableau::Embedded(embedded) => &embedded.tableau,
        }
    }

    pub fn method(&self) -> MethodId {
        self.tableau().method()
    }

    pub fn order(&self) -> usize {
        self.tableau().order()
    }

    pub fn stages(&self) -> usize {
        self.tableau().stages()
    }

    pub fn nodes(&self) -> &[T] {
        self.tableau().nodes()
    }

    pub fn stage_matrix(&self) -> &[Vec<T>] {
        self.tableau().stage_matrix()
    }

    pub fn solution_weights(&self) -> &[T] {
        self.tableau().solution_weights()
    }

    pub fn as_embedded(&self) -> Option<&EmbeddedTableau<T>> {
        match self {
            ExplicitRkTableau::Embedded(embedded) => Some(embedded),
            ExplicitRkTableau::FixedOrder(_) => None,
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.as_embedded().is_some()
    }

    pub fn embedded_order(&self) -> Option<usize> {
        self.as_embedded().map(EmbeddedTableau::embedded_order)
    }

    /// Weights that turn the stage derivatives into a local error estimate.
    pub fn error_weights(&self) -> Result<&[T], TableauErrors> {
        match self {
            ExplicitRkTableau::Embedded(embedded) => Ok(embedded.error_weights()),
            ExplicitRkTableau::FixedOrder(fixed) => {
                Err(TableauErrors::DegenerateErrorEstimator(fixed.method()))
            }
        }
    }

    /// Error weights in the legacy uniform layout. Fixed order methods return
    /// a single zero, which is not an error estimator; callers detect it by
    /// its length differing from [`Self::stages`].
    pub fn placeholder_error_weights(&self) -> Vec<T> {
        match self {
            ExplicitRkTableau::Embedded(embedded) => embedded.error_weights().to_vec(),
            ExplicitRkTableau::FixedOrder(_) => vec![T::zero()],
        }
    }
}
