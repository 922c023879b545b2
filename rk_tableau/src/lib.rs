//! Butcher tableaus for explicit Runge-Kutta integrators.
//!
//! The registry hands out fresh, validated coefficient sets for RK4,
//! Dormand-Prince 5(4) and Tsitouras 5(4) in single or double precision,
//! together with dense output weights where a continuous extension exists.
//! Stepping, step size control and interpolation are left to the integrator.
//!
//! ```
//! use rk_tableau::{MethodId, get_tableau};
//!
//! let method = MethodId::resolve("dopri5").unwrap();
//! let tableau = get_tableau::<f64>(method).unwrap();
//! assert_eq!(tableau.stages(), 7);
//! assert!(tableau.error_weights().is_ok());
//! ```

pub mod coefficients;
pub mod error;
pub mod interpolation;
pub mod literal;
pub mod method;
pub mod precision;
pub mod registry;
pub mod step;
pub mod tableau;
pub mod validation;

pub use error::TableauErrors;
pub use interpolation::{
    AnyInterpolation, InterpolationCoefficients, get_dense_output_weights,
    get_dense_output_weights_with_precision,
};
pub use method::MethodId;
pub use precision::{FloatPrecision, TableauScalar};
pub use registry::{
    AnyTableau, TableauConfig, get_tableau, get_tableau_by_name, get_tableau_with_precision,
};
pub use step::{RightHandSide, RungeKuttaStep, StepOutput};
pub use tableau::{ButcherTableau, EmbeddedTableau, ExplicitRkTableau, FixedOrderTableau};
pub use tolerance::Tolerances;
pub use validation::{ValidationReport, default_tolerances, validate};
