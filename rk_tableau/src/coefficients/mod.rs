//! Literal coefficient tables, one submodule per method.
//!
//! Rows of the stage matrix start at the second stage; the first stage is
//! always evaluated at the start of the step with node zero.

pub mod dopri5;
pub mod rk4;
pub mod tsit5;

use crate::{
    literal::{Literal, published_digits},
    method::MethodId,
};

pub struct MethodCoefficients {
    pub method: MethodId,
    /// Order of the solution weights.
    pub order: usize,
    pub nodes: &'static [Literal],
    pub stage_matrix: &'static [&'static [Literal]],
    pub solution_weights: &'static [Literal],
    /// Lower order weights and their order, for embedded pairs.
    pub embedded: Option<(usize, &'static [Literal])>,
    /// Mid-point continuous extension weights.
    pub dense_output: Option<&'static [Literal]>,
}

impl MethodCoefficients {
    pub fn stages(&self) -> usize {
        self.solution_weights.len()
    }

    /// Every literal that ends up in the tableau, dense output excluded.
    pub fn tableau_literals(&self) -> impl Iterator<Item = &'static Literal> + '_ {
        let embedded = self.embedded.map(|(_, weights)| weights).unwrap_or_default();
        self.nodes
            .iter()
            .chain(self.stage_matrix.iter().flat_map(|row| row.iter()))
            .chain(self.solution_weights)
            .chain(embedded)
    }

    pub fn literal_digits(&self) -> u32 {
        published_digits(self.tableau_literals())
    }
}

pub fn coefficients(method: MethodId) -> &'static MethodCoefficients {
    match method {
        MethodId::Rk4 => &rk4::RK4,
        MethodId::Dopri5 => &dopri5::DOPRI5,
        MethodId::Tsit5 => &tsit5::TSIT5,
    }
}
