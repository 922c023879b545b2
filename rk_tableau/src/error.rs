use thiserror::Error;

use crate::{method::MethodId, precision::FloatPrecision};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableauErrors {
    #[error("unknown Runge-Kutta method '{0}'")]
    UnknownMethod(String),
    #[error("{precision} precision is not supported: {reason}")]
    UnsupportedPrecision {
        precision: FloatPrecision,
        reason: String,
    },
    #[error("no dense output interpolant is defined for {0}")]
    NoInterpolationDefined(MethodId),
    #[error("{0} is a fixed order method and has no embedded error estimator")]
    DegenerateErrorEstimator(MethodId),
    #[error("coefficient literal '{0}' could not be parsed")]
    MalformedLiteral(&'static str),
    #[error("invalid {method} tableau: {reason}")]
    InvalidShape { method: MethodId, reason: String },
    #[error("{method} stage {stage} row sum differs from its node by {residual:e}")]
    RowSumViolated {
        method: MethodId,
        stage: usize,
        residual: f64,
    },
    #[error("{method} {weights} weights sum to 1 + {residual:e}")]
    InconsistentWeights {
        method: MethodId,
        weights: &'static str,
        residual: f64,
    },
    #[error(
        "{method} {weights} weights violate the order {order} condition {tree} by {residual:e}"
    )]
    OrderConditionViolated {
        method: MethodId,
        weights: &'static str,
        order: usize,
        tree: &'static str,
        residual: f64,
    },
    #[error("state has dimension {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}
