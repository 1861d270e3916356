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

use super::MonteCarlo;
use crate::errors::{
    DegenerateSweepSnafu, SensitivityError, SweepTooCoarseSnafu, SweepTooFineSnafu,
};
use crate::impact::{ImpactFactor, Scenario};
use crate::io::{CreateFileSnafu, CsvFlushSnafu, CsvSnafu, ExportError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::time::Instant as StdInstant;

/// Largest number of values of each mean in a sweep
pub const MAX_SWEEP_STEPS: usize = 101;

/// A grid of Monte Carlo runs over the means of two impact factors, all other parameters being those of a base scenario.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub x: ImpactFactor,
    pub y: ImpactFactor,
    /// Number of evenly spaced values of each mean, including both ends of its range
    pub steps: usize,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            x: ImpactFactor::Revenue,
            y: ImpactFactor::Turnover,
            steps: 5,
        }
    }
}

impl Sweep {
    pub fn validate(&self) -> Result<(), SensitivityError> {
        ensure!(self.x != self.y, DegenerateSweepSnafu { factor: self.x });
        ensure!(self.steps >= 2, SweepTooCoarseSnafu { steps: self.steps });
        ensure!(
            self.steps <= MAX_SWEEP_STEPS,
            SweepTooFineSnafu {
                steps: self.steps,
                max: MAX_SWEEP_STEPS
            }
        );
        Ok(())
    }

    /// Runs `num_runs` simulations for every cell of the grid.
    ///
    /// Cell `(i, j)` has index `j * steps + i` and its run is seeded with the base seed plus that index.
    pub fn run(&self, base: &Scenario, num_runs: usize) -> Result<SweepResults, SensitivityError> {
        self.validate()?;
        base.validate()?;

        let base_seed = match base.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!("{}: no seed specified for sweep, using {seed}", base.name);
                seed
            }
        };

        let x_values = self.x.mean_range().linspace(self.steps);
        let y_values = self.y.mean_range().linspace(self.steps);

        let start = StdInstant::now();
        let cells = (0..self.steps * self.steps)
            .into_par_iter()
            .map(|cell| -> Result<f64, SensitivityError> {
                let (i, j) = (cell % self.steps, cell / self.steps);
                let mut scenario = base.clone();
                scenario.set_mean(self.x, x_values[i])?;
                scenario.set_mean(self.y, y_values[j])?;
                scenario.seed = Some(base_seed.wrapping_add(cell as u64));

                let mc = MonteCarlo::from_scenario(&scenario)?;
                Ok(mc.run(num_runs)?.summary()?.mean)
            })
            .collect::<Result<Vec<f64>, SensitivityError>>()?;

        info!(
            "{}: swept {} x {} means ({} cells of {num_runs} runs) in {:.3} s",
            base.name,
            self.x,
            self.y,
            cells.len(),
            (StdInstant::now() - start).as_secs_f64()
        );

        Ok(SweepResults {
            sweep: *self,
            x_values,
            y_values,
            mean_totals: cells,
            seed: base_seed,
        })
    }
}

/// Mean total impact of every cell of a sweep
#[derive(Clone, Debug, PartialEq)]
pub struct SweepResults {
    pub sweep: Sweep,
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
    /// Row major by `y`: the cell `(i, j)` is at `j * steps + i`
    pub mean_totals: Vec<f64>,
    pub seed: u64,
}

impl SweepResults {
    /// Mean total impact for the i-th value of `x` and the j-th value of `y`
    pub fn cell(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.x_values.len() || j >= self.y_values.len() {
            return None;
        }
        self.mean_totals.get(j * self.x_values.len() + i).copied()
    }

    /// Smallest and largest mean total impact of the grid
    pub fn bounds(&self) -> (f64, f64) {
        self.mean_totals
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            })
    }

    /// Writes the grid to CSV: one row per value of `y`, one column per value of `x`.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let file = File::create(path.as_ref()).context(CreateFileSnafu {
            path: path.as_ref().to_path_buf(),
        })?;
        let mut wtr = csv::Writer::from_writer(file);

        let mut hdr = vec![format!("{} \\ {}", self.sweep.y, self.sweep.x)];
        hdr.extend(self.x_values.iter().map(|x| format!("{x:.2}")));
        wtr.write_record(&hdr).context(CsvSnafu)?;

        for (j, y) in self.y_values.iter().enumerate() {
            let mut row = vec![format!("{y:.2}")];
            for i in 0..self.x_values.len() {
                row.push(format!("{:.4}", self.cell(i, j).unwrap_or(f64::NAN)));
            }
            wtr.write_record(&row).context(CsvSnafu)?;
        }
        wtr.flush().context(CsvFlushSnafu)?;
        info!("Sweep grid written to {}", path.as_ref().display());
        Ok(())
    }
}

impl fmt::Display for SweepResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Mean total impact (M) by {} (rows) and {} (columns) means",
            self.sweep.y, self.sweep.x
        )?;
        write!(f, "{:>10}", "")?;
        for x in &self.x_values {
            write!(f, "{x:>10.2}")?;
        }
        for (j, y) in self.y_values.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{y:>10.2}")?;
            for i in 0..self.x_values.len() {
                write!(f, "{:>10.2}", self.cell(i, j).unwrap_or(f64::NAN))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod ut_sweep {
    use super::*;

    #[test]
    fn sweep_validation() {
        let sweep = Sweep {
            x: ImpactFactor::Morale,
            y: ImpactFactor::Morale,
            steps: 3,
        };
        assert_eq!(
            sweep.validate(),
            Err(SensitivityError::DegenerateSweep {
                factor: ImpactFactor::Morale
            })
        );
        let sweep = Sweep {
            steps: 1,
            ..Default::default()
        };
        assert!(sweep.validate().is_err());
        assert!(Sweep::default().validate().is_ok());

        let sweep = Sweep {
            steps: MAX_SWEEP_STEPS,
            ..Default::default()
        };
        assert!(sweep.validate().is_ok());
        let sweep = Sweep {
            steps: usize::MAX,
            ..Default::default()
        };
        assert_eq!(
            sweep.validate(),
            Err(SensitivityError::SweepTooFine {
                steps: usize::MAX,
                max: MAX_SWEEP_STEPS
            })
        );
        // Rejected before any cell runs
        assert!(sweep
            .run(&Scenario::named("huge").with_seed(0), 1_000)
            .is_err());
    }

    #[test]
    fn sweep_grid() {
        let base = Scenario::named("sweep").with_seed(3);
        let rslts = Sweep {
            steps: 3,
            ..Default::default()
        }
        .run(&base, 2_000)
        .unwrap();

        assert_eq!(rslts.mean_totals.len(), 9);
        assert_eq!(rslts.x_values, vec![1.0, 5.5, 10.0]);
        assert_eq!(rslts.y_values, vec![-5.0, -2.5, 0.0]);
        assert!(rslts.cell(3, 0).is_none());

        // Morale and leadership keep their defaults: -1.5 in total
        for (j, y) in rslts.y_values.iter().enumerate() {
            for (i, x) in rslts.x_values.iter().enumerate() {
                let expected = x + y - 1.5;
                let actual = rslts.cell(i, j).unwrap();
                // std dev of the total is about 2.3, so the standard error is about 0.05
                assert!(
                    (actual - expected).abs() < 0.3,
                    "cell ({i}, {j}): expected {expected}, got {actual}"
                );
            }
        }

        let (lo, hi) = rslts.bounds();
        assert!(lo < hi);
    }
}
