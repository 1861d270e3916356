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

use super::{CreateFileSnafu, CsvFlushSnafu, CsvSnafu, ExportError};
use crate::analysis::Summary;
use crate::impact::{ImpactFactor, Scenario};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::fmt;
use std::fs::File;
use std::path::Path;

const HEADERS: [&str; 3] = [
    "Revenue Mean (M)",
    "Turnover Mean (M)",
    "Mean Total Impact (M)",
];

/// The one row table reflecting the current settings and their resulting mean total impact
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Revenue Mean (M)")]
    pub revenue_mean: f64,
    #[serde(rename = "Turnover Mean (M)")]
    pub turnover_mean: f64,
    #[serde(rename = "Mean Total Impact (M)")]
    pub mean_total_impact: f64,
}

impl ReportRow {
    pub fn new(scenario: &Scenario, summary: &Summary) -> Self {
        Self {
            revenue_mean: scenario.dispersion(ImpactFactor::Revenue).mean,
            turnover_mean: scenario.dispersion(ImpactFactor::Turnover).mean,
            mean_total_impact: summary.mean,
        }
    }

    /// Writes this row, with its header, to a CSV file
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let file = File::create(path.as_ref()).context(CreateFileSnafu {
            path: path.as_ref().to_path_buf(),
        })?;
        let mut wtr = csv::Writer::from_writer(file);
        wtr.serialize(self).context(CsvSnafu)?;
        wtr.flush().context(CsvFlushSnafu)?;
        info!("Report table written to {}", path.as_ref().display());
        Ok(())
    }
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = [
            format!("{:.1}", self.revenue_mean),
            format!("{:.1}", self.turnover_mean),
            format!("{:.2}", self.mean_total_impact),
        ];
        let widths: Vec<usize> = HEADERS
            .iter()
            .zip(cells.iter())
            .map(|(hdr, cell)| hdr.len().max(cell.len()))
            .collect();

        let sep = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<String>>()
            .join("+");

        let hdr = HEADERS
            .iter()
            .zip(widths.iter())
            .map(|(hdr, &w)| format!(" {hdr:<w$} "))
            .collect::<Vec<String>>()
            .join("|");
        let row = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, &w)| format!(" {cell:>w$} "))
            .collect::<Vec<String>>()
            .join("|");

        writeln!(f, "+{sep}+")?;
        writeln!(f, "|{hdr}|")?;
        writeln!(f, "+{sep}+")?;
        writeln!(f, "|{row}|")?;
        write!(f, "+{sep}+")
    }
}

/// Text report of a Monte Carlo run
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub scenario: Scenario,
    pub seed: u64,
    pub summary: Summary,
    pub factors: Vec<(ImpactFactor, Summary)>,
}

impl Report {
    pub fn row(&self) -> ReportRow {
        ReportRow::new(&self.scenario, &self.summary)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results ({}, seed {})", self.scenario.name, self.seed)?;
        writeln!(f, "Mean Total Impact: {:.2}M", self.summary.mean)?;
        writeln!(f, "Standard Deviation: {:.2}M", self.summary.std_dev)?;
        writeln!(
            f,
            "Median: {:.2}M, 90% interval: [{:.2}M, {:.2}M], probability of a loss: {:.1}%",
            self.summary.median,
            self.summary.p05,
            self.summary.p95,
            self.summary.prob_loss * 100.0
        )?;
        writeln!(
            f,
            "Expected (analytic): {:.2}M +/- {:.2}M over {} simulations",
            self.scenario.expected_total(),
            self.scenario.expected_std_dev(),
            self.summary.count
        )?;
        writeln!(f)?;
        for (factor, summary) in &self.factors {
            writeln!(
                f,
                "{:<28} {} sampled: mean {:.2}M, std dev {:.2}M",
                factor.name(),
                self.scenario.dispersion(*factor),
                summary.mean,
                summary.std_dev
            )?;
        }
        writeln!(f)?;
        write!(f, "{}", self.row())
    }
}
