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
extern crate indicatif;
use super::rand_distr::Distribution;
use super::{Draw, ImpactGenerator, Pcg64Mcg};
use crate::errors::{EmptySamplesSnafu, SensitivityError};
use crate::impact::Scenario;
use crate::mc::results::{Results, Run};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use snafu::ensure;
use std::fmt;
use std::time::Instant as StdInstant;

/// A Monte Carlo framework, automatically running on all threads via a thread pool.
///
/// Draws are always generated sequentially from a single seeded generator, so the results of a given seed do not depend on the number of threads.
#[derive(Clone, Debug)]
pub struct MonteCarlo {
    /// Seed of the [64bit PCG random number generator](https://www.pcg-random.org/index.html)
    pub seed: u64,
    /// Generator of the impact draws
    pub generator: ImpactGenerator,
    /// Name of this run, will be reflected in the progress bar and in the output structure
    pub scenario: String,
    /// Whether to display a progress bar while running
    pub progress: bool,
}

impl MonteCarlo {
    /// Builds a Monte Carlo run from a scenario, drawing a seed from the OS if the scenario does not specify one.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, SensitivityError> {
        let generator = ImpactGenerator::from_scenario(scenario)?;
        let seed = match scenario.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!("{}: no seed specified, using {seed}", scenario.name);
                seed
            }
        };

        Ok(Self {
            seed,
            generator,
            scenario: scenario.name.clone(),
            progress: false,
        })
    }

    /// Enables or disables the progress bar
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    // Just the template for the progress bar
    fn progress_bar(&self, num_runs: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(num_runs as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.set_message(format!("{}", self));
        pb
    }

    /// Draws `num_runs` samples of every factor and computes the total impact of each.
    pub fn run(&self, num_runs: usize) -> Result<Results, SensitivityError> {
        self.resume_run(0, num_runs)
    }

    /// Resumes a Monte Carlo run by skipping the first `skip` draws, and computes the total impact of the following `num_runs` draws.
    #[must_use = "Monte Carlo result must be used"]
    pub fn resume_run(&self, skip: usize, num_runs: usize) -> Result<Results, SensitivityError> {
        ensure!(num_runs > 0, EmptySamplesSnafu);

        // Generate the draws (must be done separately because the rng is not thread safe)
        let draws = self.generate_draws(skip, num_runs);
        // Setup the progress bar
        let pb = self.progress_bar(num_runs);

        let start = StdInstant::now();
        let mut runs = draws
            .into_par_iter()
            .progress_with(pb)
            .map(|(index, draw)| Run {
                index,
                total: draw.total(),
                draw,
            })
            .collect::<Vec<Run>>();

        // Collect preserves the order, but keep runs sorted by index regardless
        runs.par_sort_by_key(|run| run.index);

        debug!(
            "{self}: summed {num_runs} draws in {:.3} ms",
            (StdInstant::now() - start).as_secs_f64() * 1e3
        );

        Ok(Results {
            runs,
            scenario: self.scenario.clone(),
            seed: self.seed,
        })
    }

    /// Set up the seed and generate the draws. This is useful for checking the generated draws before running a large scale Monte Carlo.
    #[must_use = "Generated draws for a Monte Carlo run must be used"]
    pub fn generate_draws(&self, skip: usize, num_runs: usize) -> Vec<(usize, Draw)> {
        // Setup the RNG
        let rng = Pcg64Mcg::new(self.seed.into());

        // Generate the draws, forcing the borrow as specified in the `sample_iter` docs.
        (&self.generator)
            .sample_iter(rng)
            .skip(skip)
            .take(num_runs)
            .enumerate()
            .map(|(index, draw)| (index + skip, draw))
            .collect::<Vec<(usize, Draw)>>()
    }
}

impl fmt::Display for MonteCarlo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Impact Monte Carlo - seed: {}",
            self.scenario, self.seed
        )
    }
}

impl fmt::LowerHex for MonteCarlo {
    /// Returns a filename friendly name
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mc-data-{}-seed-{}",
            self.scenario.replace(' ', "-"),
            self.seed
        )
    }
}
