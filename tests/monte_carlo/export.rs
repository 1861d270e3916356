extern crate sensitivity;

use crate::seeded_scenario;
use arrow::array::{Array, Float64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use sensitivity::io::{plot_histogram, write_samples, ExportCfg, Report, ReportRow};
use sensitivity::{ImpactFactor, MonteCarlo, Results};
use std::fs::{metadata, read_to_string, File};

use rstest::*;

#[fixture]
fn results() -> Results {
    let _ = pretty_env_logger::try_init();
    MonteCarlo::from_scenario(&seeded_scenario("export test", 42))
        .unwrap()
        .run(1_000)
        .unwrap()
}

#[rstest]
fn test_samples_parquet(results: Results) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("samples.parquet");

    let written = write_samples(
        &results,
        &path,
        ExportCfg::from_metadata(vec![("Analyst".to_string(), "test".to_string())]),
    )
    .unwrap();
    assert_eq!(written, path);

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap()).unwrap();
    let file_meta = builder.metadata().file_metadata();
    assert_eq!(file_meta.num_rows(), 1_000);

    let kv = file_meta.key_value_metadata().unwrap();
    let lookup = |key: &str| {
        kv.iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.clone())
    };
    assert_eq!(lookup("Scenario").as_deref(), Some("export test"));
    assert_eq!(lookup("Seed").as_deref(), Some("42"));
    assert_eq!(lookup("Analyst").as_deref(), Some("test"));

    // run, four factors, total
    assert_eq!(builder.schema().fields().len(), 6);

    let mut totals = Vec::new();
    let mut revenue = Vec::new();
    for batch in builder.build().unwrap() {
        let batch = batch.unwrap();
        let col = batch
            .column_by_name("total")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        totals.extend(col.values().iter().copied());
        let col = batch
            .column_by_name("revenue")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        revenue.extend(col.values().iter().copied());
    }
    assert_eq!(totals, results.totals());
    assert_eq!(revenue, results.factor_values(ImpactFactor::Revenue));
}

#[rstest]
fn test_samples_parquet_subset(results: Results) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subset.parquet");

    write_samples(
        &results,
        &path,
        ExportCfg::builder()
            .fields(vec![ImpactFactor::Morale])
            .build(),
    )
    .unwrap();

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap()).unwrap();
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();
    assert_eq!(names, vec!["run", "morale", "total"]);
}

#[rstest]
fn test_report_table_csv(results: Results) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.csv");

    let scenario = seeded_scenario("export test", 42);
    let report = Report {
        seed: results.seed,
        summary: results.summary().unwrap(),
        factors: results.factor_summaries().unwrap(),
        scenario,
    };
    report.row().to_csv(&path).unwrap();

    let contents = read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("Revenue Mean (M),Turnover Mean (M),Mean Total Impact (M)")
    );

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<ReportRow> = rdr.deserialize().map(|row| row.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], report.row());

    let text = format!("{report}");
    assert!(text.contains(&format!("Mean Total Impact: {:.2}M", report.summary.mean)));
    assert!(text.contains(&format!("Standard Deviation: {:.2}M", report.summary.std_dev)));
}

#[rstest]
#[case("histogram.png")]
#[case("histogram.svg")]
fn test_plot_histogram(results: Results, #[case] filename: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(filename);

    plot_histogram(&path, &results, 50).unwrap();
    assert!(metadata(&path).unwrap().len() > 0);
}
