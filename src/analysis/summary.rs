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

use crate::errors::{EmptySamplesSnafu, NonFiniteSampleSnafu, SensitivityError};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;

/// Summary statistics of a set of Monte Carlo samples, in millions
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (normalized by `n`)
    pub std_dev: f64,
    /// Sample standard deviation (normalized by `n - 1`), zero for a single sample
    pub sample_std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// 5th percentile
    pub p05: f64,
    /// 95th percentile
    pub p95: f64,
    /// Fraction of the samples strictly below zero
    pub prob_loss: f64,
}

impl Summary {
    /// Computes the summary statistics of the provided samples.
    ///
    /// The mean and variance use Welford's online algorithm, and the percentiles use linear interpolation between closest ranks.
    pub fn from_samples(samples: &[f64]) -> Result<Self, SensitivityError> {
        ensure!(!samples.is_empty(), EmptySamplesSnafu);
        if let Some((index, value)) = samples.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return NonFiniteSampleSnafu {
                index,
                value: *value,
            }
            .fail();
        }

        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut losses = 0_usize;
        for (i, x) in samples.iter().enumerate() {
            let delta = x - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (x - mean);
            if *x < 0.0 {
                losses += 1;
            }
        }

        let n = samples.len();
        let std_dev = (m2 / n as f64).sqrt();
        let sample_std_dev = if n > 1 {
            (m2 / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            count: n,
            mean,
            std_dev,
            sample_std_dev,
            min: sorted[0],
            max: sorted[n - 1],
            median: percentile_sorted(&sorted, 50.0),
            p05: percentile_sorted(&sorted, 5.0),
            p95: percentile_sorted(&sorted, 95.0),
            prob_loss: losses as f64 / n as f64,
        })
    }
}

/// Returns the requested percentile (in [0, 100]) of sorted data, linearly interpolating between the closest ranks.
///
/// Returns NaN for empty data. The percentile is clamped to [0, 100].
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let p = pct.clamp(0.0, 100.0) / 100.0;
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean = {:.2}M, std dev = {:.2}M, median = {:.2}M, 90% interval = [{:.2}M, {:.2}M], P(loss) = {:.1}% ({} samples)",
            self.mean,
            self.std_dev,
            self.median,
            self.p05,
            self.p95,
            self.prob_loss * 100.0,
            self.count
        )
    }
}
