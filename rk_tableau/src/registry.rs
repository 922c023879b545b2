use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    coefficients::coefficients,
    error::TableauErrors,
    literal::materialize_all,
    method::MethodId,
    precision::{FloatPrecision, TableauScalar},
    tableau::{ButcherTableau, EmbeddedTableau, ExplicitRkTableau, FixedOrderTableau},
};

/// Builds a fresh tableau for `method` in the precision of `T`.
///
/// Every coefficient is rounded once from its exact literal, so repeated calls
/// return bitwise identical values.
pub fn get_tableau<T: TableauScalar>(
    method: MethodId,
) -> Result<ExplicitRkTableau<T>, TableauErrors> {
    let precision = T::PRECISION;
    precision.check_supported()?;
    let table = coefficients(method);

    let nodes: Vec<T> = materialize_all(table.nodes)?;
    let stage_matrix: Vec<Vec<T>> = table
        .stage_matrix
        .iter()
        .map(|row| materialize_all(row))
        .collect::<Result<_, _>>()?;
    let solution_weights: Vec<T> = materialize_all(table.solution_weights)?;

    let tableau = ButcherTableau::new(
        method,
        table.order,
        nodes,
        stage_matrix,
        solution_weights,
        table.literal_digits(),
    )?;

    if tableau.is_precision_limited() {
        warn!(
            %method,
            %precision,
            literal_digits = tableau.literal_digits(),
            "coefficients carry more digits than the requested precision, values are rounded"
        );
    }
    debug!(%method, %precision, stages = tableau.stages(), "constructed tableau");

    let tableau = match table.embedded {
        Some((embedded_order, weights)) => {
            let embedded_weights: Vec<T> = materialize_all(weights)?;
            ExplicitRkTableau::Embedded(EmbeddedTableau::new(
                tableau,
                embedded_order,
                embedded_weights,
            )?)
        }
        None => ExplicitRkTableau::FixedOrder(FixedOrderTableau::new(tableau)),
    };
    Ok(tableau)
}

/// Resolves `name` and builds its tableau.
pub fn get_tableau_by_name<T: TableauScalar>(
    name: &str,
) -> Result<ExplicitRkTableau<T>, TableauErrors> {
    get_tableau(MethodId::resolve(name)?)
}

/// A tableau whose precision was chosen at runtime.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AnyTableau {
    Single(ExplicitRkTableau<f32>),
    Double(ExplicitRkTableau<f64>),
}

impl AnyTableau {
    pub fn precision(&self) -> FloatPrecision {
        match self {
            AnyTableau::Single(_) => FloatPrecision::Single,
            AnyTableau::Double(_) => FloatPrecision::Double,
        }
    }

    pub fn method(&self) -> MethodId {
        match self {
            AnyTableau::Single(tableau) => tableau.method(),
            AnyTableau::Double(tableau) => tableau.method(),
        }
    }

    pub fn as_single(&self) -> Option<&ExplicitRkTableau<f32>> {
        match self {
            AnyTableau::Single(tableau) => Some(tableau),
            AnyTableau::Double(_) => None,
        }
    }

    pub fn as_double(&self) -> Option<&ExplicitRkTableau<f64>> {
        match self {
            AnyTableau::Double(tableau) => Some(tableau),
            AnyTableau::Single(_) => None,
        }
    }
}

pub fn get_tableau_with_precision(
    method: MethodId,
    precision: FloatPrecision,
) -> Result<AnyTableau, TableauErrors> {
    precision.check_supported()?;
    match precision {
        FloatPrecision::Single => Ok(AnyTableau::Single(get_tableau(method)?)),
        FloatPrecision::Double => Ok(AnyTableau::Double(get_tableau(method)?)),
        FloatPrecision::Half => Err(TableauErrors::UnsupportedPrecision {
            precision,
            reason: "no half precision scalar is available".into(),
        }),
    }
}

/// Integrator facing selection of a tableau, typically deserialized along with
/// the rest of a solver configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableauConfig {
    pub method: MethodId,
    #[serde(default)]
    pub precision: FloatPrecision,
}

impl Default for TableauConfig {
    fn default() -> Self {
        Self {
            method: MethodId::Tsit5,
            precision: FloatPrecision::Double,
        }
    }
}

impl TableauConfig {
    pub fn new(method: MethodId) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn with_precision(mut self, precision: FloatPrecision) -> Self {
        self.precision = precision;
        self
    }

    pub fn build(&self) -> Result<AnyTableau, TableauErrors> {
        get_tableau_with_precision(self.method, self.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-15;

    #[test]
    fn test_rk4_is_fixed_order() {
        let tableau = get_tableau::<f64>(MethodId::Rk4).unwrap();
        assert!(!tableau.is_embedded());
        assert_eq!(tableau.stages(), 4);
        assert_eq!(tableau.order(), 4);
        assert_eq!(tableau.nodes(), &[0.0, 0.5, 0.5, 1.0]);
        let weights = [1. / 6., 1. / 3., 1. / 3., 1. / 6.];
        assert_eq!(tableau.solution_weights(), &weights);
        assert_eq!(
            tableau.error_weights().unwrap_err(),
            TableauErrors::DegenerateErrorEstimator(MethodId::Rk4)
        );
        // legacy layout: one zero, shorter than the stage count
        let placeholder = tableau.placeholder_error_weights();
        assert_eq!(placeholder, vec![0.0]);
        assert_ne!(placeholder.len(), tableau.stages());
    }

    #[test]
    fn test_dopri5_shape() {
        let tableau = get_tableau::<f64>(MethodId::Dopri5).unwrap();
        let embedded = tableau.as_embedded().unwrap();
        assert_eq!(embedded.stages(), 7);
        assert_eq!(embedded.order(), 5);
        assert_eq!(embedded.embedded_order(), 4);
        assert!(embedded.is_fsal());
        assert_eq!(embedded.stage_row(2), &[3. / 40., 9. / 40.]);
        assert_eq!(embedded.solution_weights()[0], 35. / 384.);
        assert_eq!(embedded.embedded_weights()[6], 1. / 60.);
    }

    #[test]
    fn test_dopri5_error_weights_exact() {
        let tableau = get_tableau::<f64>(MethodId::Dopri5).unwrap();
        let expected = [
            71. / 86400.,
            0.,
            -142. / 50085.,
            71. / 2880.,
            -5751. / 169600.,
            44. / 1575.,
            -1. / 60.,
        ];
        let error_weights = tableau.error_weights().unwrap();
        assert_eq!(error_weights.len(), expected.len());
        for (e, x) in error_weights.iter().zip(expected) {
            assert_abs_diff_eq!(*e, x, epsilon = TOL);
        }
    }

    #[test]
    fn test_dopri5_embedded_weights() {
        let tableau = get_tableau::<f64>(MethodId::Dopri5).unwrap();
        let embedded = tableau.as_embedded().unwrap();
        let expected = [
            1951. / 21600.,
            0.,
            22642. / 50085.,
            451. / 720.,
            -12231. / 42400.,
            649. / 6300.,
            1. / 60.,
        ];
        assert_eq!(embedded.embedded_weights(), &expected);
    }

    #[test]
    fn test_error_weights_are_weight_difference() {
        for method in [MethodId::Dopri5, MethodId::Tsit5] {
            let tableau = get_tableau::<f64>(method).unwrap();
            let embedded = tableau.as_embedded().unwrap();
            for i in 0..embedded.stages() {
                assert_eq!(
                    embedded.error_weights()[i],
                    embedded.solution_weights()[i] - embedded.embedded_weights()[i]
                );
            }
        }
    }

    #[test]
    fn test_tsit5_first_node_double() {
        let tableau = get_tableau::<f64>(MethodId::Tsit5).unwrap();
        assert_eq!(tableau.stages(), 7);
        assert_eq!(tableau.nodes()[1], 0.161);
        assert!(((tableau.nodes()[1] - 0.161) / 0.161).abs() < 1e-15);
        assert!(!tableau.tableau().is_precision_limited());
    }

    #[test]
    fn test_tsit5_single_precision_rounds_to_nearest() {
        let single = get_tableau::<f32>(MethodId::Tsit5).unwrap();
        let double = get_tableau::<f64>(MethodId::Tsit5).unwrap();
        assert_eq!(single.nodes()[1], 0.161f32);
        assert!(single.tableau().is_precision_limited());

        let pairs = single
            .stage_matrix()
            .iter()
            .flatten()
            .zip(double.stage_matrix().iter().flatten())
            .chain(single.solution_weights().iter().zip(double.solution_weights()))
            .chain(single.nodes().iter().zip(double.nodes()));
        for (s, d) in pairs {
            // no neighbouring f32 lies closer to the double value
            if *s == 0.0 {
                assert_eq!(*d, 0.0);
                continue;
            }
            let distance = (f64::from(*s) - d).abs();
            for neighbour in [s.to_bits() - 1, s.to_bits() + 1].map(f32::from_bits) {
                let other = (f64::from(neighbour) - d).abs();
                assert!(distance <= other, "{s} vs {d}");
            }
        }
    }

    #[test]
    fn test_precision_limited_still_builds_with_logging() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        let tableau = get_tableau::<f32>(MethodId::Tsit5).unwrap();
        assert!(tableau.tableau().is_precision_limited());
        assert_eq!(tableau.stages(), 7);
    }

    #[test]
    fn test_dopri5_single_not_limited() {
        let tableau = get_tableau::<f32>(MethodId::Dopri5).unwrap();
        assert!(!tableau.tableau().is_precision_limited());
        assert_eq!(tableau.nodes()[4], 8.0f32 / 9.0f32);
    }

    #[test]
    fn test_idempotent() {
        let first = get_tableau::<f64>(MethodId::Dopri5).unwrap();
        let second = get_tableau::<f64>(MethodId::Dopri5).unwrap();
        let bits = |t: &ExplicitRkTableau<f64>| {
            t.nodes()
                .iter()
                .chain(t.stage_matrix().iter().flatten())
                .chain(t.solution_weights())
                .chain(t.error_weights().unwrap())
                .map(|v| v.to_bits())
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&first), bits(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_name() {
        let err = get_tableau_by_name::<f64>("rk45").unwrap_err();
        assert_eq!(err, TableauErrors::UnknownMethod("rk45".into()));
        assert!(get_tableau_by_name::<f64>("DOPRI5").is_ok());
    }

    #[test]
    fn test_runtime_precision() {
        let single =
            get_tableau_with_precision(MethodId::Tsit5, FloatPrecision::Single).unwrap();
        assert_eq!(single.precision(), FloatPrecision::Single);
        assert!(single.as_single().is_some());
        assert!(single.as_double().is_none());

        let double =
            get_tableau_with_precision(MethodId::Rk4, FloatPrecision::Double).unwrap();
        assert_eq!(double.method(), MethodId::Rk4);
        assert!(double.as_double().is_some());

        let err = get_tableau_with_precision(MethodId::Rk4, FloatPrecision::Half).unwrap_err();
        assert!(matches!(
            err,
            TableauErrors::UnsupportedPrecision {
                precision: FloatPrecision::Half,
                ..
            }
        ));
    }

    #[test]
    fn test_config_from_ron() {
        let config: TableauConfig =
            ron::from_str("(method: \"DoPri5\", precision: single)").unwrap();
        let expected =
            TableauConfig::new(MethodId::Dopri5).with_precision(FloatPrecision::Single);
        assert_eq!(config, expected);
        let tableau = config.build().unwrap();
        assert_eq!(tableau.method(), MethodId::Dopri5);
        assert_eq!(tableau.precision(), FloatPrecision::Single);

        let config: TableauConfig = ron::from_str("(method: \"tsit5\")").unwrap();
        assert_eq!(config, TableauConfig::default());

        assert!(ron::from_str::<TableauConfig>("(method: \"rk45\")").is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let config = TableauConfig::new(MethodId::Rk4);
        let encoded = ron::to_string(&config).unwrap();
        let decoded: TableauConfig = ron::from_str(&encoded).unwrap();
        assert_eq!(decoded, config);
    }
}
