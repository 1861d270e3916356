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

use crate::errors::{EmptySamplesSnafu, NoBinsSnafu, NonFiniteSampleSnafu, SensitivityError};
use snafu::ensure;

/// Equal width histogram over the range of the samples.
///
/// All bins are half open except the last one, which also includes the maximum.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    /// Bin edges, one more than the number of bins
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn from_samples(samples: &[f64], bins: usize) -> Result<Self, SensitivityError> {
        ensure!(bins > 0, NoBinsSnafu);
        ensure!(!samples.is_empty(), EmptySamplesSnafu);

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (index, value) in samples.iter().copied().enumerate() {
            ensure!(value.is_finite(), NonFiniteSampleSnafu { index, value });
            min = min.min(value);
            max = max.max(value);
        }

        // Degenerate data still gets a unit wide range
        if min == max {
            min -= 0.5;
            max += 0.5;
        }

        // Split before subtracting, `max - min` may overflow for finite samples
        let width = max / bins as f64 - min / bins as f64;
        let edges = (0..=bins)
            .map(|i| {
                if i == bins {
                    max
                } else {
                    min + width * i as f64
                }
            })
            .collect::<Vec<f64>>();

        let mut counts = vec![0; bins];
        for x in samples {
            let mut idx = ((x / width - min / width).floor() as usize).min(bins - 1);
            // Floating point division may land a sample one bin off around the edges
            if *x < edges[idx] && idx > 0 {
                idx -= 1;
            } else if idx + 1 < bins && *x >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Ok(Self { edges, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        self.max() / self.bins() as f64 - self.min() / self.bins() as f64
    }

    pub fn min(&self) -> f64 {
        self.edges[0]
    }

    pub fn max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    pub fn count_total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Largest count of any bin
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Iterates over (left edge, right edge, count) of each bin
    pub fn iter_bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(edges, count)| (edges[0], edges[1], *count))
    }
}

#[cfg(test)]
mod ut_histogram {
    use super::*;

    #[test]
    fn histogram_edges_and_counts() {
        let samples = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];
        let hist = Histogram::from_samples(&samples, 4).unwrap();
        assert_eq!(hist.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        // Last bin includes the maximum
        assert_eq!(hist.counts, vec![2, 2, 2, 3]);
        assert_eq!(hist.count_total(), samples.len());
        assert_eq!(hist.bin_width(), 1.0);
        assert_eq!(hist.max_count(), 3);
        assert_eq!(hist.iter_bins().count(), 4);
    }

    #[test]
    fn histogram_degenerate() {
        let hist = Histogram::from_samples(&[3.0, 3.0, 3.0], 10).unwrap();
        assert_eq!(hist.min(), 2.5);
        assert_eq!(hist.max(), 3.5);
        assert_eq!(hist.count_total(), 3);
        assert_eq!(hist.counts[5], 3);
    }

    #[test]
    fn histogram_errors() {
        assert_eq!(
            Histogram::from_samples(&[1.0], 0),
            Err(SensitivityError::NoBins)
        );
        assert_eq!(
            Histogram::from_samples(&[], 5),
            Err(SensitivityError::EmptySamples)
        );
        assert!(Histogram::from_samples(&[1.0, f64::INFINITY], 5).is_err());
    }

    #[test]
    fn histogram_wide_range() {
        let hist = Histogram::from_samples(&[-1e308, 1e308], 4).unwrap();
        let expected = [-1e308, -5e307, 0.0, 5e307, 1e308];
        for (edge, want) in hist.edges.iter().zip(expected) {
            assert!(edge.is_finite());
            assert!((edge - want).abs() <= 1e-12 * 1e308, "{edge} != {want}");
        }
        assert_eq!(hist.counts, vec![1, 0, 0, 1]);
        assert_eq!(hist.bin_width(), 5e307);
    }
}
