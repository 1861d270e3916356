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

use super::{ExportError, NoDataSnafu};
use crate::analysis::{Histogram, Kde, KDE_GRIDSIZE};
use crate::mc::{Results, SweepResults};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use snafu::ensure;
use std::path::Path;

/// Size of the rendered figures, in pixels
pub const FIGURE_SIZE: (u32, u32) = (800, 500);

const SKYBLUE: RGBColor = RGBColor(135, 206, 235);
const STEELBLUE: RGBColor = RGBColor(70, 130, 180);

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

/// Renders the histogram of the total impact, its KDE, and its mean, to a PNG (or SVG if the extension is `svg`).
pub fn plot_histogram<P: AsRef<Path>>(
    path: P,
    results: &Results,
    bins: usize,
) -> Result<(), ExportError> {
    let totals = results.totals();
    let to_plot_err = |e: crate::errors::SensitivityError| ExportError::Plot { msg: e.to_string() };

    let hist = Histogram::from_samples(&totals, bins).map_err(to_plot_err)?;
    let mean = results.summary().map_err(to_plot_err)?.mean;
    let curve = Kde::gaussian(&totals).map(|kde| kde.curve(&hist, KDE_GRIDSIZE));

    let path = path.as_ref();
    let drawn = if is_svg(path) {
        let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
        draw_histogram(&root, &hist, curve.as_deref(), mean).map_err(|e| e.to_string())
    } else {
        let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
        draw_histogram(&root, &hist, curve.as_deref(), mean).map_err(|e| e.to_string())
    };
    drawn.map_err(|msg| ExportError::Plot { msg })?;

    info!("Histogram of {} written to {}", results.scenario, path.display());
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    hist: &Histogram,
    curve: Option<&[(f64, f64)]>,
    mean: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let curve_max = curve
        .map(|pts| pts.iter().fold(0.0_f64, |acc, (_, y)| acc.max(*y)))
        .unwrap_or(0.0);
    let y_max = (hist.max_count() as f64).max(curve_max).max(1.0) * 1.1;

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption(
            "Monte Carlo Simulation: Total Financial Impact",
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(hist.min()..hist.max(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Total Financial Impact (M)")
        .y_desc("Frequency")
        .draw()?;

    chart.draw_series(hist.iter_bins().map(|(left, right, count)| {
        Rectangle::new([(left, 0.0), (right, count as f64)], SKYBLUE.filled())
    }))?;
    chart.draw_series(hist.iter_bins().map(|(left, right, count)| {
        Rectangle::new([(left, 0.0), (right, count as f64)], WHITE.stroke_width(1))
    }))?;

    if let Some(curve) = curve {
        chart
            .draw_series(LineSeries::new(
                curve.iter().copied(),
                STEELBLUE.stroke_width(2),
            ))?
            .label("KDE")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &STEELBLUE));
    }

    chart
        .draw_series(DashedLineSeries::new(
            vec![(mean, 0.0), (mean, y_max)],
            6,
            4,
            RED.stroke_width(2),
        ))?
        .label(format!("Mean: {mean:.2}M"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
}

/// Renders the grid of a sweep as coloured cells, from red (lowest mean total impact) to green (highest).
pub fn plot_heatmap<P: AsRef<Path>>(path: P, sweep: &SweepResults) -> Result<(), ExportError> {
    ensure!(
        sweep.x_values.len() >= 2 && sweep.y_values.len() >= 2,
        NoDataSnafu {
            msg: "sweep grid must be at least 2 x 2".to_string()
        }
    );

    let path = path.as_ref();
    let drawn = if is_svg(path) {
        let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
        draw_heatmap(&root, sweep).map_err(|e| e.to_string())
    } else {
        let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
        draw_heatmap(&root, sweep).map_err(|e| e.to_string())
    };
    drawn.map_err(|msg| ExportError::Plot { msg })?;

    info!("Sensitivity heatmap written to {}", path.display());
    Ok(())
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    sweep: &SweepResults,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let dx = sweep.x_values[1] - sweep.x_values[0];
    let dy = sweep.y_values[1] - sweep.y_values[0];
    let x_lo = sweep.x_values[0] - dx / 2.0;
    let x_hi = sweep.x_values[sweep.x_values.len() - 1] + dx / 2.0;
    let y_lo = sweep.y_values[0] - dy / 2.0;
    let y_hi = sweep.y_values[sweep.y_values.len() - 1] + dy / 2.0;

    let (lo, hi) = sweep.bounds();
    let span = if hi > lo { hi - lo } else { 1.0 };

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption("Sensitivity Heatmap: Mean Total Impact (M)", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(sweep.sweep.x.mean_label())
        .y_desc(sweep.sweep.y.mean_label())
        .draw()?;

    let mut cells = Vec::with_capacity(sweep.mean_totals.len());
    for (j, y) in sweep.y_values.iter().enumerate() {
        for (i, x) in sweep.x_values.iter().enumerate() {
            if let Some(value) = sweep.cell(i, j) {
                cells.push((*x, *y, value));
            }
        }
    }

    chart.draw_series(cells.iter().map(|(x, y, value)| {
        let t = (value - lo) / span;
        Rectangle::new(
            [(x - dx / 2.0, y - dy / 2.0), (x + dx / 2.0, y + dy / 2.0)],
            HSLColor(t / 3.0, 0.7, 0.55).filled(),
        )
    }))?;

    chart.draw_series(cells.iter().map(|(x, y, value)| {
        Text::new(format!("{value:.2}"), (*x - dx / 4.0, *y), ("sans-serif", 14))
    }))?;

    root.present()
}
