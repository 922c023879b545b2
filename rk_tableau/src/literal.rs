//! Precision independent storage for tableau coefficients.
//!
//! Coefficients are kept either as exact ratios of small integers or as the
//! full decimal expansion published with the method. Both forms are turned
//! into the target scalar with exactly one rounding: a ratio through one IEEE
//! division of two exactly representable integers, a decimal through a
//! correctly rounded parse.

use num_traits::NumCast;

use crate::{error::TableauErrors, precision::TableauScalar};

/// Largest integer magnitude stored in a [`Literal::Ratio`]. Every integer up
/// to `2^24` is exact in single precision.
pub const MAX_EXACT_INTEGER: u32 = 1 << 24;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Ratio(i32, u32),
    Decimal(&'static str),
}

pub use Literal::{Decimal, Ratio};

/// Shorthand for an integer valued literal.
pub const fn int(value: i32) -> Literal {
    Literal::Ratio(value, 1)
}

pub const ZERO: Literal = int(0);
pub const ONE: Literal = int(1);

impl Literal {
    pub fn materialize<T: TableauScalar>(&self) -> Result<T, TableauErrors> {
        let value = match self {
            Literal::Ratio(numerator, denominator) => {
                let p = <T as NumCast>::from(*numerator)
                    .ok_or_else(|| unrepresentable::<T>(self))?;
                let q = <T as NumCast>::from(*denominator)
                    .ok_or_else(|| unrepresentable::<T>(self))?;
                p / q
            }
            Literal::Decimal(digits) => digits
                .parse::<T>()
                .map_err(|_| TableauErrors::MalformedLiteral(*digits))?,
        };
        // overflow to infinity or underflow of a nonzero literal to zero
        if !value.is_finite() || (value.is_zero() && !self.is_zero()) {
            return Err(unrepresentable::<T>(self));
        }
        Ok(value)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Literal::Ratio(numerator, _) => *numerator == 0,
            Literal::Decimal(digits) => digits
                .chars()
                .take_while(|c| !matches!(c, 'e' | 'E'))
                .all(|c| matches!(c, '0' | '.' | '-' | '+')),
        }
    }

    /// Significant decimal digits of a published decimal expansion. Ratios
    /// are exact and report `None`.
    pub fn significant_digits(&self) -> Option<u32> {
        match self {
            Literal::Ratio(..) => None,
            Literal::Decimal(digits) => {
                let mantissa = digits.split(['e', 'E']).next().unwrap_or_default();
                let significant = mantissa
                    .chars()
                    .filter(char::is_ascii_digit)
                    .skip_while(|c| *c == '0')
                    .count();
                Some(significant.max(1) as u32)
            }
        }
    }

    /// `true` when the ratio components are exact in single precision.
    pub fn is_exact_ratio(&self) -> bool {
        match self {
            Literal::Ratio(numerator, denominator) => {
                numerator.unsigned_abs() <= MAX_EXACT_INTEGER
                    && *denominator <= MAX_EXACT_INTEGER
                    && *denominator > 0
            }
            Literal::Decimal(_) => false,
        }
    }
}

pub fn materialize_all<T: TableauScalar>(literals: &[Literal]) -> Result<Vec<T>, TableauErrors> {
    literals.iter().map(Literal::materialize).collect()
}

fn unrepresentable<T: TableauScalar>(literal: &Literal) -> TableauErrors {
    TableauErrors::UnsupportedPrecision {
        precision: T::PRECISION,
        reason: format!("coefficient {literal:?} is outside the representable range"),
    }
}

/// Digits a precision must carry to hold the decimal literals without loss,
/// capped at what a double can hold. Ratios need nothing beyond rounding.
pub fn published_digits<'a>(literals: impl IntoIterator<Item = &'a Literal>) -> u32 {
    literals
        .into_iter()
        .filter_map(Literal::significant_digits)
        .map(|digits| digits.min(f64::DIGITS))
        .max()
        .unwrap_or(0)
}
