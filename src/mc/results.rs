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
extern crate rstats;

use super::Draw;
use crate::analysis::{Histogram, Summary};
use crate::errors::SensitivityError;
use crate::impact::ImpactFactor;
pub use rstats::Stats;

/// A structure storing the result of a single Monte Carlo run
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Run {
    /// The index of this run
    pub index: usize,
    /// The sampled value of every factor
    pub draw: Draw,
    /// The total impact of this run
    pub total: f64,
}

/// A structure of Monte Carlo results
#[derive(Clone, Debug)]
pub struct Results {
    /// Raw data from each run, sorted by run index for O(1) access to each run
    pub runs: Vec<Run>,
    /// Name of this scenario
    pub scenario: String,
    /// Seed used to generate the draws
    pub seed: u64,
}

impl Results {
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Returns the total impact of every run, in run order
    pub fn totals(&self) -> Vec<f64> {
        self.runs.iter().map(|run| run.total).collect()
    }

    /// Returns the sampled values of the requested factor, in run order
    pub fn factor_values(&self, factor: ImpactFactor) -> Vec<f64> {
        self.runs.iter().map(|run| run.draw.value(factor)).collect()
    }

    /// Summary statistics of the total impact
    pub fn summary(&self) -> Result<Summary, SensitivityError> {
        Summary::from_samples(&self.totals())
    }

    /// Summary statistics of each factor, in factor order
    pub fn factor_summaries(&self) -> Result<Vec<(ImpactFactor, Summary)>, SensitivityError> {
        ImpactFactor::iter()
            .map(|factor| Ok((factor, Summary::from_samples(&self.factor_values(factor))?)))
            .collect()
    }

    /// Histogram of the total impact
    pub fn histogram(&self, bins: usize) -> Result<Histogram, SensitivityError> {
        Histogram::from_samples(&self.totals(), bins)
    }
}
