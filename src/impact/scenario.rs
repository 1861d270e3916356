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

use super::{Dispersion, ImpactFactor, ParamRange};
use crate::errors::{
    NoBinsSnafu, ParameterOutOfRangeSnafu, SensitivityError, SimulationsOutOfRangeSnafu,
};
use crate::io::{dispersions_from_partial, ConfigRepr};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::collections::BTreeMap;
use std::fmt;

/// Admissible number of Monte Carlo simulations
pub const SIMULATIONS_RANGE: (usize, usize) = (1_000, 10_000);
const DEFAULT_SIMULATIONS: usize = 5_000;
const DEFAULT_BINS: usize = 50;

/// A complete set of inputs for a Monte Carlo impact analysis.
///
/// The dispersions always hold exactly one entry per [ImpactFactor]. When loaded from a
/// configuration, any missing factor (or missing parameter of a factor) keeps its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Name of this scenario, reflected in the progress bar and in the exported data
    pub name: String,
    /// Seed of the random number generator, drawn from the OS if unset
    pub seed: Option<u64>,
    /// Number of Monte Carlo simulations
    pub simulations: usize,
    /// Number of bins of the histogram of the total impact
    pub bins: usize,
    #[serde(deserialize_with = "dispersions_from_partial")]
    pub dispersions: BTreeMap<ImpactFactor, Dispersion>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            seed: None,
            simulations: DEFAULT_SIMULATIONS,
            bins: DEFAULT_BINS,
            dispersions: ImpactFactor::iter()
                .map(|factor| (factor, factor.default_dispersion()))
                .collect(),
        }
    }
}

impl ConfigRepr for Scenario {}

impl Scenario {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the dispersion of the requested factor
    pub fn dispersion(&self, factor: ImpactFactor) -> Dispersion {
        self.dispersions
            .get(&factor)
            .copied()
            .unwrap_or_else(|| factor.default_dispersion())
    }

    /// Sets the mean of the provided factor after checking it is in its admissible range
    pub fn set_mean(&mut self, factor: ImpactFactor, mean: f64) -> Result<(), SensitivityError> {
        check_range(factor, "mean", mean, factor.mean_range())?;
        self.dispersions
            .entry(factor)
            .or_insert_with(|| factor.default_dispersion())
            .mean = mean;
        Ok(())
    }

    /// Sets the standard deviation of the provided factor after checking it is in its admissible range
    pub fn set_std_dev(
        &mut self,
        factor: ImpactFactor,
        std_dev: f64,
    ) -> Result<(), SensitivityError> {
        check_range(factor, "std dev", std_dev, factor.std_dev_range())?;
        self.dispersions
            .entry(factor)
            .or_insert_with(|| factor.default_dispersion())
            .std_dev = std_dev;
        Ok(())
    }

    pub fn set_simulations(&mut self, simulations: usize) -> Result<(), SensitivityError> {
        let (min, max) = SIMULATIONS_RANGE;
        ensure!(
            (min..=max).contains(&simulations),
            SimulationsOutOfRangeSnafu {
                value: simulations,
                min,
                max
            }
        );
        self.simulations = simulations;
        Ok(())
    }

    /// Checks every parameter of this scenario
    pub fn validate(&self) -> Result<(), SensitivityError> {
        let (min, max) = SIMULATIONS_RANGE;
        ensure!(
            (min..=max).contains(&self.simulations),
            SimulationsOutOfRangeSnafu {
                value: self.simulations,
                min,
                max
            }
        );
        ensure!(self.bins >= 1, NoBinsSnafu);

        for factor in ImpactFactor::iter() {
            let disp = self.dispersion(factor);
            check_range(factor, "mean", disp.mean, factor.mean_range())?;
            check_range(factor, "std dev", disp.std_dev, factor.std_dev_range())?;
            disp.to_normal(factor)?;
        }
        Ok(())
    }

    /// Analytic mean of the total impact: the sum of the means
    pub fn expected_total(&self) -> f64 {
        ImpactFactor::iter()
            .map(|factor| self.dispersion(factor).mean)
            .sum()
    }

    /// Analytic standard deviation of the total impact of independent factors
    pub fn expected_std_dev(&self) -> f64 {
        ImpactFactor::iter()
            .map(|factor| self.dispersion(factor).variance())
            .sum::<f64>()
            .sqrt()
    }
}

fn check_range(
    factor: ImpactFactor,
    param: &'static str,
    value: f64,
    range: ParamRange,
) -> Result<(), SensitivityError> {
    ensure!(
        range.contains(value),
        ParameterOutOfRangeSnafu {
            factor,
            param,
            value,
            min: range.min,
            max: range.max
        }
    );
    Ok(())
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} simulations", self.name, self.simulations)?;
        for factor in ImpactFactor::iter() {
            write!(f, ", {factor}: {}", self.dispersion(factor))?;
        }
        write!(f, ")")
    }
}
