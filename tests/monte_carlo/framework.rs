extern crate rayon;
extern crate sensitivity;

use crate::seeded_scenario;
use approx::assert_abs_diff_eq;
use sensitivity::io::ConfigRepr;
use sensitivity::mc::Stats;
use sensitivity::{ImpactFactor, MonteCarlo, Scenario, SensitivityError};
use std::io::Write;

use rstest::*;

#[fixture]
fn default_mc() -> MonteCarlo {
    let _ = pretty_env_logger::try_init();
    MonteCarlo::from_scenario(&seeded_scenario("default", 0)).unwrap()
}

#[rstest]
fn test_monte_carlo_total(default_mc: MonteCarlo) {
    let scenario = Scenario::default();
    let rslts = default_mc.run(scenario.simulations).unwrap();
    assert_eq!(rslts.len(), 5_000);

    let summary = rslts.summary().unwrap();
    println!("{summary}");

    // The total of independent normals is normal with the sum of the means and of the variances
    // Standard error of the mean is about 2.31 / sqrt(5000) = 0.033
    assert_abs_diff_eq!(summary.mean, scenario.expected_total(), epsilon = 0.15);
    assert_abs_diff_eq!(summary.std_dev, scenario.expected_std_dev(), epsilon = 0.1);
    assert_abs_diff_eq!(summary.median, scenario.expected_total(), epsilon = 0.2);
    assert!(summary.p05 < summary.median && summary.median < summary.p95);

    // P(total < 0) for N(1.5, 2.31) is about 26%
    assert_abs_diff_eq!(summary.prob_loss, 0.258, epsilon = 0.03);

    let average_total = rslts.totals().amean().unwrap();
    assert_abs_diff_eq!(average_total, summary.mean, epsilon = 1e-9);
}

#[rstest]
#[case(ImpactFactor::Revenue)]
#[case(ImpactFactor::Turnover)]
#[case(ImpactFactor::Morale)]
#[case(ImpactFactor::Leadership)]
fn test_factor_dispersions(default_mc: MonteCarlo, #[case] factor: ImpactFactor) {
    let rslts = default_mc.run(5_000).unwrap();
    let expected = factor.default_dispersion();

    let summaries = rslts.factor_summaries().unwrap();
    let (summary_factor, summary) = summaries[factor.index()];
    assert_eq!(summary_factor, factor);

    let std_err = expected.std_dev / (5_000.0_f64).sqrt();
    assert_abs_diff_eq!(summary.mean, expected.mean, epsilon = 5.0 * std_err);
    assert_abs_diff_eq!(summary.std_dev, expected.std_dev, epsilon = 0.05 * expected.std_dev);

    let average = rslts.factor_values(factor).amean().unwrap();
    assert_abs_diff_eq!(average, summary.mean, epsilon = 1e-9);
}

#[rstest]
fn test_monte_carlo_thread_independent(default_mc: MonteCarlo) {
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| default_mc.run(2_000).unwrap());
    let multi = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| default_mc.run(2_000).unwrap());

    assert_eq!(single.totals(), multi.totals());
    for (i, run) in multi.runs.iter().enumerate() {
        assert_eq!(run.index, i);
        assert_eq!(run.total, run.draw.total());
    }
}

#[test]
fn test_monte_carlo_seeds_differ() {
    let first = MonteCarlo::from_scenario(&seeded_scenario("a", 1))
        .unwrap()
        .run(100)
        .unwrap();
    let second = MonteCarlo::from_scenario(&seeded_scenario("b", 2))
        .unwrap()
        .run(100)
        .unwrap();
    assert_ne!(first.totals(), second.totals());
}

#[test]
fn test_unseeded_scenario_records_seed() {
    let mc = MonteCarlo::from_scenario(&Scenario::default()).unwrap();
    let rslts = mc.run(10).unwrap();
    assert_eq!(rslts.seed, mc.seed);
    // The recorded seed reproduces the run
    let replay = MonteCarlo::from_scenario(&Scenario::default().with_seed(rslts.seed))
        .unwrap()
        .run(10)
        .unwrap();
    assert_eq!(replay.totals(), rslts.totals());
}

#[test]
fn test_invalid_scenario() {
    let mut scenario = Scenario::default();
    scenario
        .dispersions
        .get_mut(&ImpactFactor::Revenue)
        .unwrap()
        .mean = 12.0;
    assert!(matches!(
        MonteCarlo::from_scenario(&scenario),
        Err(SensitivityError::ParameterOutOfRange {
            factor: ImpactFactor::Revenue,
            ..
        })
    ));
}

#[test]
fn test_scenario_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "name: optimistic\nseed: 11\nsimulations: 2000\ndispersions:\n  revenue:\n    mean: 9.0\n    std_dev: 0.5\n  morale:\n    std_dev: 0.1"
    )
    .unwrap();

    let scenario = Scenario::load(file.path()).unwrap();
    assert_eq!(scenario.name, "optimistic");
    assert_eq!(scenario.simulations, 2_000);
    assert_abs_diff_eq!(scenario.expected_total(), 5.5, epsilon = 1e-12);

    let rslts = MonteCarlo::from_scenario(&scenario)
        .unwrap()
        .run(scenario.simulations)
        .unwrap();
    let summary = rslts.summary().unwrap();
    assert_abs_diff_eq!(summary.mean, 5.5, epsilon = 0.15);
    assert_abs_diff_eq!(summary.std_dev, scenario.expected_std_dev(), epsilon = 0.1);
}

#[test]
fn test_missing_config_file() {
    assert!(Scenario::load("this/file/does/not/exist.yaml").is_err());
}
