use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::TableauErrors;

/// Explicit Runge-Kutta methods with a tableau in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MethodId {
    /// Classical Runge-Kutta 4th-order method.
    Rk4,
    /// Dormand-Prince 5(4) method.
    Dopri5,
    /// Tsitouras 5(4) method.
    Tsit5,
}

impl MethodId {
    pub const ALL: [MethodId; 3] = [MethodId::Rk4, MethodId::Dopri5, MethodId::Tsit5];

    /// Looks up a method by name, ignoring case and surrounding whitespace.
    pub fn resolve(name: &str) -> Result<Self, TableauErrors> {
        let method = match name.trim().to_ascii_lowercase().as_str() {
            "rk4" => MethodId::Rk4,
            "dopri5" | "dormand_prince" | "dormandprince45" => MethodId::Dopri5,
            "tsit5" | "tsitouras" | "tsitouras5" => MethodId::Tsit5,
            _ => return Err(TableauErrors::UnknownMethod(name.to_string())),
        };
        Ok(method)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MethodId::Rk4 => "rk4",
            MethodId::Dopri5 => "dopri5",
            MethodId::Tsit5 => "tsit5",
        }
    }

    /// `true` for methods that carry an embedded lower order solution.
    pub fn is_embedded(&self) -> bool {
        !matches!(self, MethodId::Rk4)
    }
}

impl Display for MethodId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MethodId {
    type Err = TableauErrors;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl TryFrom<&str> for MethodId {
    type Error = TableauErrors;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::resolve(value)
    }
}

impl TryFrom<String> for MethodId {
    type Error = TableauErrors;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::resolve(&value)
    }
}

impl From<MethodId> for String {
    fn from(value: MethodId) -> Self {
        value.name().to_string()
    }
}
