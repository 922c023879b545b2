//! Numerical checks of tableau coefficients: row sums, consistency and the
//! rooted tree order conditions through order five.

use num_traits::NumCast;
use serde::Serialize;
use tolerance::Tolerances;
use tracing::debug;

use crate::{
    error::TableauErrors,
    method::MethodId,
    precision::TableauScalar,
    tableau::{ButcherTableau, ExplicitRkTableau},
};

/// Highest order whose conditions are enumerated.
pub const MAX_CHECKED_ORDER: usize = 5;

/// One order condition `weights . phi(tree) = 1 / gamma(tree)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderCondition<T> {
    pub order: usize,
    /// Tree in bracket notation, `t` being the single node tree.
    pub tree: &'static str,
    pub expected: T,
    pub value: T,
}

impl<T: TableauScalar> OrderCondition<T> {
    pub fn residual(&self) -> T {
        self.value - self.expected
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationReport<T> {
    pub method: MethodId,
    /// Order reached by the solution weights, capped at [`MAX_CHECKED_ORDER`].
    pub order: usize,
    pub embedded_order: Option<usize>,
    pub max_row_sum_residual: T,
    pub max_order_residual: T,
}

/// `sum(stage_row(i)) - nodes[i]` for every stage.
pub fn row_sum_residuals<T: TableauScalar>(tableau: &ButcherTableau<T>) -> Vec<T> {
    (0..tableau.stages())
        .map(|i| sum(tableau.stage_row(i)) - tableau.nodes()[i])
        .collect()
}

/// `sum(weights) - 1`.
pub fn consistency_residual<T: TableauScalar>(weights: &[T]) -> T {
    sum(weights) - T::one()
}

/// Evaluates every order condition up to `max_order` (at most
/// [`MAX_CHECKED_ORDER`]) for `weights` combined with the tableau's nodes and
/// stage matrix.
pub fn order_conditions<T: TableauScalar>(
    tableau: &ButcherTableau<T>,
    weights: &[T],
    max_order: usize,
) -> Vec<OrderCondition<T>> {
    let c = tableau.nodes();
    let a = |v: &[T]| -> Vec<T> {
        (0..tableau.stages())
            .map(|i| dot(tableau.stage_row(i), v))
            .collect()
    };
    let ones = vec![T::one(); c.len()];
    let c2 = mul(c, c);
    let c3 = mul(&c2, c);
    let c4 = mul(&c3, c);
    let ac = a(c);
    let ac2 = a(&c2);
    let ac3 = a(&c3);
    let aac = a(&ac);
    let aac2 = a(&ac2);
    let aaac = a(&aac);
    let a_cac = a(&mul(c, &ac));

    let trees: [(usize, &'static str, u32, Vec<T>); 17] = [
        (1, "t", 1, ones),
        (2, "[t]", 2, c.to_vec()),
        (3, "[t,t]", 3, c2.clone()),
        (3, "[[t]]", 6, ac.clone()),
        (4, "[t,t,t]", 4, c3),
        (4, "[t,[t]]", 8, mul(c, &ac)),
        (4, "[[t,t]]", 12, ac2.clone()),
        (4, "[[[t]]]", 24, aac.clone()),
        (5, "[t,t,t,t]", 5, c4),
        (5, "[t,t,[t]]", 10, mul(&c2, &ac)),
        (5, "[t,[t,t]]", 15, mul(c, &ac2)),
        (5, "[t,[[t]]]", 30, mul(c, &aac)),
        (5, "[[t],[t]]", 20, mul(&ac, &ac)),
        (5, "[[t,t,t]]", 20, ac3),
        (5, "[[t,[t]]]", 40, a_cac),
        (5, "[[[t,t]]]", 60, aac2),
        (5, "[[[[t]]]]", 120, aaac),
    ];

    trees
        .into_iter()
        .filter(|(order, ..)| *order <= max_order.min(MAX_CHECKED_ORDER))
        .map(|(order, tree, gamma, phi)| OrderCondition {
            order,
            tree,
            expected: reciprocal(gamma),
            value: dot(weights, &phi),
        })
        .collect()
}

/// Largest order `p` such that every condition up to `p` holds.
pub fn achieved_order<T: TableauScalar>(
    tableau: &ButcherTableau<T>,
    weights: &[T],
    tolerances: &Tolerances<T>,
) -> usize {
    let conditions = order_conditions(tableau, weights, MAX_CHECKED_ORDER);
    (1..=MAX_CHECKED_ORDER)
        .take_while(|p| {
            conditions
                .iter()
                .filter(|condition| condition.order == *p)
                .all(|condition| tolerances.check_error(condition.expected, condition.value))
        })
        .last()
        .unwrap_or(0)
}

/// Tolerances scaled to the rounding error the tableau's largest coefficient
/// can contribute in its precision.
pub fn default_tolerances<T: TableauScalar>(tableau: &ButcherTableau<T>) -> Tolerances<T> {
    let factor = <T as NumCast>::from(64).unwrap_or_else(T::one);
    Tolerances::epsilon_scaled(factor * tableau.max_abs_coefficient().max(T::one()))
}

/// Checks row sums, consistency and the order conditions up to the claimed
/// order of both the solution and the embedded weights.
pub fn validate<T: TableauScalar>(
    tableau: &ExplicitRkTableau<T>,
    tolerances: &Tolerances<T>,
) -> Result<ValidationReport<T>, TableauErrors> {
    let base = tableau.tableau();
    let method = base.method();

    let row_sums = row_sum_residuals(base);
    for (stage, residual) in row_sums.iter().enumerate() {
        if !tolerances.check_error(T::zero(), *residual) {
            return Err(TableauErrors::RowSumViolated {
                method,
                stage,
                residual: as_f64(*residual),
            });
        }
    }

    let mut weight_sets = vec![("solution", base.solution_weights(), base.order())];
    if let Some(embedded) = tableau.as_embedded() {
        weight_sets.push((
            "embedded",
            embedded.embedded_weights(),
            embedded.embedded_order(),
        ));
    }

    let mut max_order_residual = T::zero();
    for (label, weights, claimed) in &weight_sets {
        let residual = consistency_residual(weights);
        if !tolerances.check_error(T::zero(), residual) {
            return Err(TableauErrors::InconsistentWeights {
                method,
                weights: *label,
                residual: as_f64(residual),
            });
        }
        for condition in order_conditions(base, weights, *claimed) {
            let residual = condition.residual();
            max_order_residual = max_order_residual.max(residual.abs());
            if !tolerances.check_error(condition.expected, condition.value) {
                return Err(TableauErrors::OrderConditionViolated {
                    method,
                    weights: *label,
                    order: condition.order,
                    tree: condition.tree,
                    residual: as_f64(residual),
                });
            }
        }
    }

    let report = ValidationReport {
        method,
        order: achieved_order(base, base.solution_weights(), tolerances),
        embedded_order: tableau
            .as_embedded()
            .map(|embedded| achieved_order(base, embedded.embedded_weights(), tolerances)),
        max_row_sum_residual: row_sums
            .iter()
            .fold(T::zero(), |max, r| max.max(r.abs())),
        max_order_residual,
    };
    debug!(
        %method,
        order = report.order,
        embedded_order = ?report.embedded_order,
        "validated tableau"
    );
    Ok(report)
}

fn sum<T: TableauScalar>(values: &[T]) -> T {
    values.iter().fold(T::zero(), |acc, v| acc + *v)
}

fn dot<T: TableauScalar>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b).fold(T::zero(), |acc, (x, y)| acc + *x * *y)
}

fn mul<T: TableauScalar>(a: &[T], b: &[T]) -> Vec<T> {
    a.iter().zip(b).map(|(x, y)| *x * *y).collect()
}

fn reciprocal<T: TableauScalar>(gamma: u32) -> T {
    <T as NumCast>::from(gamma).map_or_else(T::nan, T::recip)
}

fn as_f64<T: TableauScalar>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
