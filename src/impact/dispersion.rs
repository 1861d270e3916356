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

use super::ImpactFactor;
use crate::errors::{InvalidDispersionSnafu, InvalidStdDevSnafu, SensitivityError};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use std::fmt;
use typed_builder::TypedBuilder;

/// Normal distribution parameters of a single impact factor, in millions
#[derive(Copy, Clone, Debug, PartialEq, TypedBuilder, Serialize, Deserialize)]
pub struct Dispersion {
    pub mean: f64,
    pub std_dev: f64,
}

impl Dispersion {
    pub fn zero_mean(std_dev: f64) -> Self {
        Self { mean: 0.0, std_dev }
    }

    pub fn variance(&self) -> f64 {
        self.std_dev.powi(2)
    }

    /// Builds the normal distribution of this dispersion for the provided factor.
    pub fn to_normal(&self, factor: ImpactFactor) -> Result<Normal<f64>, SensitivityError> {
        ensure!(
            self.std_dev.is_finite() && self.std_dev > 0.0,
            InvalidStdDevSnafu {
                factor,
                std_dev: self.std_dev
            }
        );
        Normal::new(self.mean, self.std_dev).context(InvalidDispersionSnafu { factor })
    }
}

impl fmt::Display for Dispersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N({:.2}M, {:.2}M)", self.mean, self.std_dev)
    }
}

#[cfg(test)]
mod ut_dispersion {
    use super::*;

    #[test]
    fn builder_and_normal() {
        let disp = Dispersion::builder().mean(5.0).std_dev(2.0).build();
        assert_eq!(disp.variance(), 4.0);
        assert_eq!(format!("{disp}"), "N(5.00M, 2.00M)");
        let normal = disp.to_normal(ImpactFactor::Revenue).unwrap();
        assert_eq!(normal.mean(), 5.0);
        assert_eq!(normal.std_dev(), 2.0);
    }

    #[test]
    fn reject_degenerate_std_dev() {
        for std_dev in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                Dispersion::zero_mean(std_dev)
                    .to_normal(ImpactFactor::Morale)
                    .is_err(),
                "{std_dev} should be rejected"
            );
        }
    }
}
