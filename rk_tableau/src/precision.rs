use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::error::TableauErrors;

/// Minimum number of significant decimal digits a precision must carry before
/// a tableau is materialized in it.
pub const MIN_SIGNIFICANT_DIGITS: u32 = 6;

/// Floating point width requested by an integrator for its state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatPrecision {
    Half,
    Single,
    #[default]
    Double,
}

impl FloatPrecision {
    /// Decimal digits that survive a round trip through this precision.
    pub fn significant_digits(&self) -> u32 {
        match self {
            FloatPrecision::Half => 3,
            FloatPrecision::Single => f32::DIGITS,
            FloatPrecision::Double => f64::DIGITS,
        }
    }

    pub fn check_supported(&self) -> Result<(), TableauErrors> {
        if self.significant_digits() < MIN_SIGNIFICANT_DIGITS {
            return Err(TableauErrors::UnsupportedPrecision {
                precision: *self,
                reason: format!(
                    "carries {} significant digits, at least {} are required",
                    self.significant_digits(),
                    MIN_SIGNIFICANT_DIGITS
                ),
            });
        }
        Ok(())
    }
}

impl Display for FloatPrecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            FloatPrecision::Half => "half",
            FloatPrecision::Single => "single",
            FloatPrecision::Double => "double",
        };
        write!(f, "{name}")
    }
}

/// Scalar types a tableau can be materialized in.
///
/// `FromStr` must round to nearest, which holds for the primitive floats, so
/// decimal literals are converted with a single rounding.
pub trait TableauScalar:
    Float + FromStr + Debug + Display + Default + Send + Sync + 'static
{
    const PRECISION: FloatPrecision;
}

impl TableauScalar for f32 {
    const PRECISION: FloatPrecision = FloatPrecision::Single;
}

impl TableauScalar for f64 {
    const PRECISION: FloatPrecision = FloatPrecision::Double;
}
