use serde::Serialize;
use tracing::debug;

use crate::{
    coefficients::coefficients,
    error::TableauErrors,
    literal::{materialize_all, published_digits},
    method::MethodId,
    precision::{FloatPrecision, TableauScalar},
};

/// Weights of a dense output formula at a fixed fraction `theta` of the step.
///
/// `y(t + theta * h) ~ y + h * sum(weights[i] * k[i])`, where `k` are the
/// stage derivatives of the completed step. Together with the step end
/// points and their derivatives this pins down a polynomial of `degree` in
/// `theta`; evaluating it is up to the integrator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InterpolationCoefficients<T> {
    method: MethodId,
    theta: T,
    degree: usize,
    weights: Vec<T>,
    precision: FloatPrecision,
    literal_digits: u32,
}

impl<T: TableauScalar> InterpolationCoefficients<T> {
    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn theta(&self) -> T {
        self.theta
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    pub fn precision(&self) -> FloatPrecision {
        self.precision
    }

    pub fn is_precision_limited(&self) -> bool {
        self.literal_digits > self.precision.significant_digits()
    }
}

pub fn get_dense_output_weights<T: TableauScalar>(
    method: MethodId,
) -> Result<InterpolationCoefficients<T>, TableauErrors> {
    T::PRECISION.check_supported()?;
    let table = coefficients(method);
    let literals = table
        .dense_output
        .ok_or(TableauErrors::NoInterpolationDefined(method))?;
    let weights: Vec<T> = materialize_all(literals)?;
    debug!(%method, stages = weights.len(), "constructed dense output weights");
    Ok(InterpolationCoefficients {
        method,
        theta: T::one() / (T::one() + T::one()),
        degree: 4,
        weights,
        precision: T::PRECISION,
        literal_digits: published_digits(literals),
    })
}

/// Dense output weights whose precision was chosen at runtime.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AnyInterpolation {
    Single(InterpolationCoefficients<f32>),
    Double(InterpolationCoefficients<f64>),
}

pub fn get_dense_output_weights_with_precision(
    method: MethodId,
    precision: FloatPrecision,
) -> Result<AnyInterpolation, TableauErrors> {
    precision.check_supported()?;
    match precision {
        FloatPrecision::Single => Ok(AnyInterpolation::Single(get_dense_output_weights(method)?)),
        FloatPrecision::Double => Ok(AnyInterpolation::Double(get_dense_output_weights(method)?)),
        FloatPrecision::Half => Err(TableauErrors::UnsupportedPrecision {
            precision,
            reason: "no half precision scalar is available".into(),
        }),
    }
}
