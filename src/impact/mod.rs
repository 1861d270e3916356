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

use crate::errors::SensitivityError;
use arrow::datatypes::{DataType, Field};
use enum_iterator::{all, Sequence};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

mod dispersion;
pub use dispersion::Dispersion;

mod scenario;
pub use scenario::{Scenario, SIMULATIONS_RANGE};

/// Unit of every impact factor and of the total impact
pub const UNIT: &str = "M";

/// Admissible range of a scalar parameter, along with its default value and nominal step.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, default: f64, step: f64) -> Self {
        Self {
            min,
            max,
            default,
            step,
        }
    }

    /// Returns true if the value is finite and within the inclusive bounds
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Returns `steps` evenly spaced values from min to max, both included
    pub fn linspace(&self, steps: usize) -> Vec<f64> {
        match steps {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => {
                let delta = (self.max - self.min) / (steps - 1) as f64;
                (0..steps)
                    .map(|i| {
                        if i == steps - 1 {
                            self.max
                        } else {
                            self.min + delta * i as f64
                        }
                    })
                    .collect()
            }
        }
    }
}

/// The independent contributors to the total financial impact
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactFactor {
    /// Revenue gained from clients
    Revenue,
    /// Cost of employee turnover (negative)
    Turnover,
    /// Impact on morale (negative)
    Morale,
    /// Impact on the leadership pipeline (negative)
    Leadership,
}

impl ImpactFactor {
    /// Iterates over all of the factors, in the order in which they are sampled
    pub fn iter() -> impl Iterator<Item = Self> {
        all::<Self>()
    }

    /// Number of impact factors
    pub fn count() -> usize {
        enum_iterator::cardinality::<Self>()
    }

    /// Position of this factor in a draw
    pub const fn index(&self) -> usize {
        match self {
            Self::Revenue => 0,
            Self::Turnover => 1,
            Self::Morale => 2,
            Self::Leadership => 3,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Revenue => "Client Revenue Gain",
            Self::Turnover => "Employee Turnover Cost",
            Self::Morale => "Morale Impact",
            Self::Leadership => "Leadership Pipeline Impact",
        }
    }

    pub const fn mean_label(&self) -> &'static str {
        match self {
            Self::Revenue => "Mean Revenue Gain (M)",
            Self::Turnover => "Mean Turnover Cost (M)",
            Self::Morale => "Mean Morale Impact (M)",
            Self::Leadership => "Mean Leadership Impact (M)",
        }
    }

    pub const fn std_dev_label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue Gain SD (M)",
            Self::Turnover => "Turnover Cost SD (M)",
            Self::Morale => "Morale Impact SD (M)",
            Self::Leadership => "Leadership Impact SD (M)",
        }
    }

    pub const fn mean_range(&self) -> ParamRange {
        match self {
            Self::Revenue => ParamRange::new(1.0, 10.0, 5.0, 0.1),
            Self::Turnover => ParamRange::new(-5.0, 0.0, -2.0, 0.1),
            Self::Morale => ParamRange::new(-3.0, 0.0, -1.0, 0.1),
            Self::Leadership => ParamRange::new(-2.0, 0.0, -0.5, 0.1),
        }
    }

    pub const fn std_dev_range(&self) -> ParamRange {
        match self {
            Self::Revenue => ParamRange::new(0.5, 5.0, 2.0, 0.1),
            Self::Turnover => ParamRange::new(0.5, 3.0, 1.0, 0.1),
            Self::Morale => ParamRange::new(0.1, 1.0, 0.5, 0.1),
            Self::Leadership => ParamRange::new(0.1, 1.0, 0.3, 0.1),
        }
    }

    /// Default dispersion of this factor
    pub const fn default_dispersion(&self) -> Dispersion {
        Dispersion {
            mean: self.mean_range().default,
            std_dev: self.std_dev_range().default,
        }
    }

    pub(crate) fn to_field(self) -> Field {
        let mut meta = HashMap::new();
        meta.insert("unit".to_string(), UNIT.to_string());
        meta.insert("name".to_string(), self.name().to_string());

        Field::new(format!("{self}"), DataType::Float64, false).with_metadata(meta)
    }
}

impl fmt::Display for ImpactFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match *self {
            Self::Revenue => "revenue",
            Self::Turnover => "turnover",
            Self::Morale => "morale",
            Self::Leadership => "leadership",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for ImpactFactor {
    type Err = SensitivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revenue" | "client_revenue" => Ok(Self::Revenue),
            "turnover" | "turnover_cost" => Ok(Self::Turnover),
            "morale" => Ok(Self::Morale),
            "leadership" | "leadership_pipeline" => Ok(Self::Leadership),
            _ => Err(SensitivityError::UnknownFactor {
                name: s.to_string(),
            }),
        }
    }
}
