extern crate sensitivity;

use crate::seeded_scenario;
use approx::assert_abs_diff_eq;
use sensitivity::io::plot_heatmap;
use sensitivity::mc::{Sweep, SweepResults};
use sensitivity::ImpactFactor;
use std::fs::metadata;

use rstest::*;

#[test]
fn test_sweep_morale_leadership() {
    let _ = pretty_env_logger::try_init();

    let base = seeded_scenario("sweep", 5);
    let sweep = Sweep {
        x: ImpactFactor::Morale,
        y: ImpactFactor::Leadership,
        steps: 4,
    };
    let rslts = sweep.run(&base, 1_000).unwrap();
    println!("{rslts}");

    assert_eq!(rslts.seed, 5);
    assert_eq!(rslts.x_values.len(), 4);
    assert_eq!(rslts.y_values.len(), 4);
    assert_eq!(rslts.x_values[0], -3.0);
    assert_eq!(rslts.y_values[3], 0.0);

    // Revenue and turnover keep their defaults: 3.0 in total.
    // The standard error of each cell is below 0.1.
    for (j, y) in rslts.y_values.iter().enumerate() {
        for (i, x) in rslts.x_values.iter().enumerate() {
            assert_abs_diff_eq!(rslts.cell(i, j).unwrap(), 3.0 + x + y, epsilon = 0.35);
        }
    }

    // Same seed, same grid
    assert_eq!(sweep.run(&base, 1_000).unwrap(), rslts);
}

#[test]
fn test_sweep_csv() {
    let rslts = Sweep::default()
        .run(&seeded_scenario("sweep csv", 8), 1_000)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");
    rslts.to_csv(&path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let hdr = rdr.headers().unwrap().clone();
    assert_eq!(hdr.len(), 6);
    assert_eq!(&hdr[0], "turnover \\ revenue");
    assert_eq!(&hdr[1], "1.00");
    assert_eq!(&hdr[5], "10.00");

    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(&rows[0][0], "-5.00");
    let cell: f64 = rows[2][3].parse().unwrap();
    assert_abs_diff_eq!(cell, rslts.cell(2, 2).unwrap(), epsilon = 1e-4);
}

#[test]
fn test_heatmap_requires_grid() {
    let rslts = SweepResults {
        sweep: Sweep::default(),
        x_values: vec![1.0],
        y_values: vec![-1.0],
        mean_totals: vec![0.0],
        seed: 0,
    };
    let dir = tempfile::tempdir().unwrap();
    assert!(plot_heatmap(dir.path().join("heatmap.png"), &rslts).is_err());
}

#[rstest]
#[case("heatmap.png")]
#[case("heatmap.svg")]
fn test_plot_heatmap(#[case] filename: &str) {
    let rslts = Sweep {
        steps: 3,
        ..Default::default()
    }
    .run(&seeded_scenario("heatmap", 21), 1_000)
    .unwrap();
    assert_eq!(rslts.mean_totals.len(), 9);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(filename);
    plot_heatmap(&path, &rslts).unwrap();
    assert!(metadata(&path).unwrap().len() > 0);
}
