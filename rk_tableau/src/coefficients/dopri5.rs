//! Dormand & Prince (1980), "A family of embedded Runge-Kutta formulae".
//! The seventh stage is evaluated at the new solution, so its derivative is
//! reused as the first stage of the next step.

use super::MethodCoefficients;
use crate::{
    literal::{Decimal, Literal, ONE, Ratio, ZERO},
    method::MethodId,
};

const WEIGHTS: &[Literal] = &[
    Ratio(35, 384),
    ZERO,
    Ratio(500, 1113),
    Ratio(125, 192),
    Ratio(-2187, 6784),
    Ratio(11, 84),
    ZERO,
];

// 4th order weights of the pair; the error estimate is WEIGHTS minus these
const EMBEDDED_WEIGHTS: &[Literal] = &[
    Ratio(1951, 21600),
    ZERO,
    Ratio(22642, 50085),
    Ratio(451, 720),
    Ratio(-12231, 42400),
    Ratio(649, 6300),
    Ratio(1, 60),
];

// y(t + h/2) ~ y + h * sum(w_i * k_i), the mid-point of the 4th order
// continuous extension
const MIDPOINT_WEIGHTS: &[Literal] = &[
    Decimal("0.1001343188300239499615100844531748232488"),
    ZERO,
    Decimal("0.3918321794184259048947001578614633232027"),
    Decimal("-0.02982460176594816782136413307142196920264"),
    Decimal("0.05893268337240795158825368492276719914854"),
    Decimal("-0.04497888809104361123472625032694470768933"),
    Decimal("0.02390430823613397261162645616096133129193"),
];

pub static DOPRI5: MethodCoefficients = MethodCoefficients {
    method: MethodId::Dopri5,
    order: 5,
    nodes: &[
        ZERO,
        Ratio(1, 5),
        Ratio(3, 10),
        Ratio(4, 5),
        Ratio(8, 9),
        ONE,
        ONE,
    ],
    stage_matrix: &[
        &[Ratio(1, 5)],
        &[Ratio(3, 40), Ratio(9, 40)],
        &[Ratio(44, 45), Ratio(-56, 15), Ratio(32, 9)],
        &[
            Ratio(19372, 6561),
            Ratio(-25360, 2187),
            Ratio(64448, 6561),
            Ratio(-212, 729),
        ],
        &[
            Ratio(9017, 3168),
            Ratio(-355, 33),
            Ratio(46732, 5247),
            Ratio(49, 176),
            Ratio(-5103, 18656),
        ],
        WEIGHTS.split_at(6).0,
    ],
    solution_weights: WEIGHTS,
    embedded: Some((4, EMBEDDED_WEIGHTS)),
    dense_output: Some(MIDPOINT_WEIGHTS),
};
