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

/*! # sensitivity

Monte Carlo sensitivity analysis of the total financial impact of an initiative.

The total impact is the sum of four independent, normally distributed, factors (client revenue gain, employee turnover cost, morale impact, and leadership pipeline impact), all in millions.
This crate samples them, summarizes the distribution of the total, and exports the samples, a histogram, and sweeps over the factor means.
*/

/// Impact factors, their dispersions, and complete scenarios.
pub mod impact;

mod errors;
/// Functions which may fail on user input return an error instead of panicking.
pub use self::errors::SensitivityError;

/// Monte Carlo module
pub mod mc;

/// Summary statistics, histogram, and kernel density estimate of Monte Carlo samples
pub mod analysis;

/// Configuration loading, reports, exports, and plots.
pub mod io;

#[macro_use]
extern crate log;

/// Re-export some useful things
pub use self::impact::{Dispersion, ImpactFactor, Scenario};
pub use self::mc::{MonteCarlo, Results};
