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

use crate::impact::ImpactFactor;
use rand_distr::NormalError;
use snafu::prelude::*;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SensitivityError {
    #[snafu(display("{param} of {factor} must be within [{min}, {max}], got {value}"))]
    ParameterOutOfRange {
        factor: ImpactFactor,
        param: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[snafu(display("number of simulations must be within [{min}, {max}], got {value}"))]
    SimulationsOutOfRange {
        value: usize,
        min: usize,
        max: usize,
    },
    #[snafu(display("std dev of {factor} must be finite and strictly positive, got {std_dev}"))]
    InvalidStdDev { factor: ImpactFactor, std_dev: f64 },
    #[snafu(display("invalid normal distribution for {factor}: {source}"))]
    InvalidDispersion {
        factor: ImpactFactor,
        source: NormalError,
    },
    #[snafu(display("histogram requires at least one bin"))]
    NoBins,
    #[snafu(display("cannot compute statistics without any sample"))]
    EmptySamples,
    #[snafu(display("sample #{index} is not finite ({value})"))]
    NonFiniteSample { index: usize, value: f64 },
    #[snafu(display("sweep requires two distinct factors, got {factor} twice"))]
    DegenerateSweep { factor: ImpactFactor },
    #[snafu(display("sweep requires at least two steps per axis, got {steps}"))]
    SweepTooCoarse { steps: usize },
    #[snafu(display("sweep allows at most {max} steps per axis, got {steps}"))]
    SweepTooFine { steps: usize, max: usize },
    #[snafu(display("unknown impact factor `{name}`"))]
    UnknownFactor { name: String },
}
