use super::MethodCoefficients;
use crate::{
    literal::{Literal, ONE, Ratio, ZERO},
    method::MethodId,
};

const WEIGHTS: &[Literal] = &[Ratio(1, 6), Ratio(1, 3), Ratio(1, 3), Ratio(1, 6)];

pub static RK4: MethodCoefficients = MethodCoefficients {
    method: MethodId::Rk4,
    order: 4,
    nodes: &[ZERO, Ratio(1, 2), Ratio(1, 2), ONE],
    stage_matrix: &[
        &[Ratio(1, 2)],
        &[ZERO, Ratio(1, 2)],
        &[ZERO, ZERO, ONE],
    ],
    solution_weights: WEIGHTS,
    embedded: None,
    dense_output: None,
};
