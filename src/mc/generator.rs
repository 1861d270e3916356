/*
    Sensitivity, Monte Carlo impact analysis
    Copyright (C) 2024 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::rand_distr::{Distribution, Normal};
use crate::errors::SensitivityError;
use crate::impact::{ImpactFactor, Scenario};
use std::fmt;

/// Number of impact factors in a single draw
pub const NUM_FACTORS: usize = 4;

/// One sample of every impact factor, stored in factor order
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Draw {
    pub values: [f64; NUM_FACTORS],
}

impl Draw {
    pub fn value(&self, factor: ImpactFactor) -> f64 {
        self.values[factor.index()]
    }

    /// Total impact of this draw, i.e. the sum of all of its factors
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for factor in ImpactFactor::iter() {
            write!(f, "{factor} = {:.3}M, ", self.value(factor))?;
        }
        write!(f, "total = {:.3}M", self.total())
    }
}

/// A generator of impact draws for Monte Carlo analyses.
#[derive(Clone, Debug)]
pub struct ImpactGenerator {
    /// The normal distribution of each factor, in factor order.
    /// Any factor without a distribution is left at zero in the draw.
    pub dispersions: Vec<(ImpactFactor, Normal<f64>)>,
}

impl ImpactGenerator {
    /// Builds the generator of a scenario, checking every parameter first.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, SensitivityError> {
        scenario.validate()?;
        let mut dispersions = Vec::with_capacity(NUM_FACTORS);
        for factor in ImpactFactor::iter() {
            dispersions.push((factor, scenario.dispersion(factor).to_normal(factor)?));
        }
        Ok(Self { dispersions })
    }

    /// Builds a generator from a list of factor dispersions, without checking their ranges.
    pub fn from_dispersions(dispersions: &[(ImpactFactor, Normal<f64>)]) -> Self {
        let mut sorted = dispersions.to_vec();
        sorted.sort_by_key(|(factor, _)| *factor);
        Self {
            dispersions: sorted,
        }
    }
}

impl Distribution<Draw> for ImpactGenerator {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Draw {
        let mut draw = Draw::default();
        for (factor, dispersion) in &self.dispersions {
            draw.values[factor.index()] = dispersion.sample(rng);
        }
        draw
    }
}
