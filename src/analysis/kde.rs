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

use super::Histogram;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Number of points at which a KDE curve is evaluated
pub const KDE_GRIDSIZE: usize = 200;

/// Gaussian kernel density estimate with Scott's rule bandwidth
#[derive(Clone, Debug)]
pub struct Kde {
    samples: Vec<f64>,
    /// Standard deviation of the kernel
    pub bandwidth: f64,
}

impl Kde {
    /// Builds a Gaussian KDE, or None if there are fewer than two samples or they have no spread.
    pub fn gaussian(samples: &[f64]) -> Option<Self> {
        let n = samples.len();
        if n < 2 || samples.iter().any(|x| !x.is_finite()) {
            return None;
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let scott = (n as f64).powf(-0.2);
        let bandwidth = scott * var.sqrt();
        if bandwidth <= 0.0 || !bandwidth.is_finite() {
            return None;
        }
        Some(Self {
            samples: samples.to_vec(),
            bandwidth,
        })
    }

    /// Probability density at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        let norm = 1.0 / (self.samples.len() as f64 * self.bandwidth * (2.0 * PI).sqrt());
        norm * self
            .samples
            .iter()
            .map(|xi| (-0.5 * ((x - xi) / self.bandwidth).powi(2)).exp())
            .sum::<f64>()
    }

    /// Evaluates the density over the data range of the histogram, scaled to the histogram counts.
    pub fn curve(&self, histogram: &Histogram, points: usize) -> Vec<(f64, f64)> {
        let scale = self.samples.len() as f64 * histogram.bin_width();
        let (lo, hi) = self.support();
        let points = points.max(2);
        let step = (hi - lo) / (points - 1) as f64;
        (0..points)
            .into_par_iter()
            .map(|i| {
                let x = lo + step * i as f64;
                (x, self.evaluate(x) * scale)
            })
            .collect()
    }

    /// Range of the data, the curve is not extended past the extreme samples
    pub fn support(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(*x), hi.max(*x))
            })
    }
}
