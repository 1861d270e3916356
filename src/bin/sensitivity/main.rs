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

extern crate clap;
extern crate log;
extern crate pretty_env_logger;
extern crate sensitivity;

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use sensitivity::impact::SIMULATIONS_RANGE;
use sensitivity::io::{plot_heatmap, plot_histogram, write_samples, ConfigRepr, ExportCfg, Report};
use sensitivity::mc::Sweep;
use sensitivity::{ImpactFactor, MonteCarlo, Scenario};
use std::env::{set_var, var};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

const LOG_VAR: &str = "SENSITIVITY_LOG";

#[derive(Parser)]
#[command(
    name = "sensitivity",
    version,
    about = "Monte Carlo sensitivity analysis of the total financial impact"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Monte Carlo simulation and print its summary
    Run(RunArgs),
    /// Sweep the means of two factors and print the mean total impact of each cell
    Sweep(SweepArgs),
    /// List the impact factors, their admissible ranges, and their defaults
    Factors,
}

#[derive(Args)]
struct ScenarioArgs {
    /// Scenario configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of simulations
    #[arg(short = 'n', long)]
    simulations: Option<usize>,
    /// Seed of the random number generator
    #[arg(short, long)]
    seed: Option<u64>,
    /// Override the mean of a factor, e.g. `--mean revenue=6.5`
    #[arg(long = "mean", value_name = "FACTOR=VALUE", value_parser = parse_override)]
    means: Vec<(ImpactFactor, f64)>,
    /// Override the standard deviation of a factor, e.g. `--std-dev morale=0.2`
    #[arg(long = "std-dev", value_name = "FACTOR=VALUE", value_parser = parse_override)]
    std_devs: Vec<(ImpactFactor, f64)>,
    /// Do not display progress bars
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,
    /// Number of histogram bins
    #[arg(short, long)]
    bins: Option<usize>,
    /// Render the histogram of the total impact to this file (PNG, or SVG by extension)
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Export every sample to this parquet file
    #[arg(long)]
    samples: Option<PathBuf>,
    /// Export the report table to this CSV file
    #[arg(long)]
    table: Option<PathBuf>,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,
    /// Factor whose mean varies along the columns
    #[arg(short, long, default_value = "revenue", value_parser = ImpactFactor::from_str)]
    x: ImpactFactor,
    /// Factor whose mean varies along the rows
    #[arg(short, long, default_value = "turnover", value_parser = ImpactFactor::from_str)]
    y: ImpactFactor,
    /// Number of values of each mean
    #[arg(long, default_value_t = 5)]
    steps: usize,
    /// Export the grid to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Render the grid to this file (PNG, or SVG by extension)
    #[arg(long)]
    plot: Option<PathBuf>,
}

fn parse_override(s: &str) -> Result<(ImpactFactor, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FACTOR=VALUE, got `{s}`"))?;
    let factor = ImpactFactor::from_str(key).map_err(|e| e.to_string())?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {factor}: {e}"))?;
    Ok((factor, value))
}

impl ScenarioArgs {
    /// Loads the scenario, if any, and applies the command line overrides
    fn scenario(&self) -> Result<Scenario, Box<dyn Error>> {
        let mut scenario = match &self.config {
            Some(path) => {
                let scenario = Scenario::load(path)?;
                info!("Loaded scenario `{}` from {}", scenario.name, path.display());
                scenario
            }
            None => Scenario::default(),
        };

        if let Some(simulations) = self.simulations {
            scenario.set_simulations(simulations)?;
        }
        if let Some(seed) = self.seed {
            scenario.seed = Some(seed);
        }
        for (factor, mean) in &self.means {
            scenario.set_mean(*factor, *mean)?;
        }
        for (factor, std_dev) in &self.std_devs {
            scenario.set_std_dev(*factor, *std_dev)?;
        }

        scenario.validate()?;
        Ok(scenario)
    }
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let mut scenario = args.scenario.scenario()?;
    if let Some(bins) = args.bins {
        scenario.bins = bins;
        scenario.validate()?;
    }
    info!("Running {scenario}");

    let mc = MonteCarlo::from_scenario(&scenario)?.with_progress(!args.scenario.quiet);
    let rslts = mc.run(scenario.simulations)?;

    let report = Report {
        seed: rslts.seed,
        summary: rslts.summary()?,
        factors: rslts.factor_summaries()?,
        scenario: scenario.clone(),
    };
    println!("{report}");

    if let Some(path) = args.plot {
        plot_histogram(path, &rslts, scenario.bins)?;
    }
    if let Some(path) = args.samples {
        write_samples(&rslts, path, ExportCfg::default())?;
    }
    if let Some(path) = args.table {
        report.row().to_csv(path)?;
    }
    Ok(())
}

fn sweep(args: SweepArgs) -> Result<(), Box<dyn Error>> {
    let scenario = args.scenario.scenario()?;
    let sweep = Sweep {
        x: args.x,
        y: args.y,
        steps: args.steps,
    };
    info!(
        "Sweeping {} x {} means over {} steps from {scenario}",
        sweep.x, sweep.y, sweep.steps
    );

    let rslts = sweep.run(&scenario, scenario.simulations)?;
    println!("{rslts}");

    if let Some(path) = args.csv {
        rslts.to_csv(path)?;
    }
    if let Some(path) = args.plot {
        plot_heatmap(path, &rslts)?;
    }
    Ok(())
}

fn factors() {
    let (min, max) = SIMULATIONS_RANGE;
    println!("Number of simulations: [{min}, {max}]");
    for factor in ImpactFactor::iter() {
        let mean = factor.mean_range();
        let std_dev = factor.std_dev_range();
        println!(
            "{factor:<12} {:<28} mean in [{}, {}] (default {}), std dev in [{}, {}] (default {})",
            factor.name(),
            mean.min,
            mean.max,
            mean.default,
            std_dev.min,
            std_dev.max,
            std_dev.default
        );
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Run(args) => run(args),
        Command::Sweep(args) => sweep(args),
        Command::Factors => {
            factors();
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }

    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod ut_cli {
    use super::*;
    use sensitivity::SensitivityError;

    #[test]
    fn override_parsing() {
        assert_eq!(
            parse_override("turnover_cost=-1.5").unwrap(),
            (ImpactFactor::Turnover, -1.5)
        );
        assert_eq!(
            parse_override("Morale= 0.2").unwrap(),
            (ImpactFactor::Morale, 0.2)
        );
        assert!(parse_override("revenue").is_err());
        assert!(parse_override("sma=1").is_err());
        assert!(parse_override("revenue=lots").is_err());
    }

    #[test]
    fn out_of_range_override() {
        let cli = Cli::try_parse_from(["sensitivity", "run", "--mean", "revenue=12"]).unwrap();
        let Command::Run(args) = &cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(args.scenario.means, vec![(ImpactFactor::Revenue, 12.0)]);

        let err = args.scenario.scenario().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SensitivityError>(),
            Some(SensitivityError::ParameterOutOfRange {
                factor: ImpactFactor::Revenue,
                ..
            })
        ));

        // The same error fails the whole command
        assert!(execute(cli).is_err());
    }

    #[test]
    fn scenario_overrides() {
        let cli = Cli::try_parse_from([
            "sensitivity",
            "sweep",
            "-n",
            "2000",
            "--seed",
            "3",
            "--std-dev",
            "leadership=0.9",
            "-x",
            "morale",
        ])
        .unwrap();
        let Command::Sweep(args) = &cli.command else {
            panic!("expected the sweep command");
        };
        assert_eq!(args.x, ImpactFactor::Morale);
        assert_eq!(args.y, ImpactFactor::Turnover);
        assert_eq!(args.steps, 5);

        let scenario = args.scenario.scenario().unwrap();
        assert_eq!(scenario.simulations, 2_000);
        assert_eq!(scenario.seed, Some(3));
        assert_eq!(scenario.dispersion(ImpactFactor::Leadership).std_dev, 0.9);
    }

    #[test]
    fn invalid_arguments() {
        assert!(Cli::try_parse_from(["sensitivity", "run", "--mean", "sma=1"]).is_err());
        assert!(Cli::try_parse_from(["sensitivity", "sweep", "-x", "profit"]).is_err());

        let cli = Cli::try_parse_from(["sensitivity", "run", "-n", "10"]).unwrap();
        assert!(execute(cli).is_err());
        let cli = Cli::try_parse_from(["sensitivity", "sweep", "--steps", "1000"]).unwrap();
        assert!(execute(cli).is_err());
    }
}
