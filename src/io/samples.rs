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

use super::{
    ArrowSnafu, CreateFileSnafu, ExportCfg, ExportError, NoDataSnafu, ParquetSnafu,
};
use crate::impact::UNIT;
use crate::mc::Results;
use arrow::array::{ArrayRef, Float64Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use snafu::{ensure, ResultExt};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds the writer properties, storing the provided metadata in the file
fn pq_writer(metadata: HashMap<String, String>) -> WriterProperties {
    let mut kv = metadata
        .into_iter()
        .map(|(k, v)| KeyValue::new(k, v))
        .collect::<Vec<KeyValue>>();
    kv.sort_by(|a, b| a.key.cmp(&b.key));
    WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .set_key_value_metadata(Some(kv))
        .build()
}

/// Stores the sampled factors and the total impact of every run to a parquet file, returning the path it was written to.
pub fn write_samples<P: AsRef<Path>>(
    results: &Results,
    path: P,
    cfg: ExportCfg,
) -> Result<PathBuf, ExportError> {
    ensure!(
        !results.is_empty(),
        NoDataSnafu {
            msg: format!("{} has no run", results.scenario)
        }
    );

    let factors = cfg.factors();

    // Build the schema
    let mut hdrs = vec![Field::new("run", DataType::UInt64, false)];
    for factor in &factors {
        hdrs.push(factor.to_field());
    }
    let mut total_meta = HashMap::new();
    total_meta.insert("unit".to_string(), UNIT.to_string());
    hdrs.push(Field::new("total", DataType::Float64, false).with_metadata(total_meta));

    let schema = Arc::new(Schema::new(hdrs));

    // Build all of the records
    let mut record = vec![Arc::new(UInt64Array::from(
        results
            .runs
            .iter()
            .map(|run| run.index as u64)
            .collect::<Vec<u64>>(),
    )) as ArrayRef];

    for factor in factors {
        record.push(Arc::new(Float64Array::from(results.factor_values(factor))) as ArrayRef);
    }
    record.push(Arc::new(Float64Array::from(results.totals())) as ArrayRef);

    let mut metadata = HashMap::new();
    metadata.insert("Purpose".to_string(), "Monte Carlo impact samples".to_string());
    metadata.insert("Scenario".to_string(), results.scenario.clone());
    metadata.insert("Seed".to_string(), format!("{}", results.seed));
    if let Some(add_meta) = cfg.metadata {
        for (k, v) in add_meta {
            metadata.insert(k, v);
        }
    }

    let props = pq_writer(metadata);

    let path_buf = path.as_ref().to_path_buf();
    let file = File::create(&path_buf).context(CreateFileSnafu {
        path: path_buf.clone(),
    })?;
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props)).context(ParquetSnafu)?;

    let batch = RecordBatch::try_new(schema, record).context(ArrowSnafu)?;
    writer.write(&batch).context(ParquetSnafu)?;
    writer.close().context(ParquetSnafu)?;

    info!(
        "Samples of {} runs written to {}",
        results.len(),
        path_buf.display()
    );

    // Return the path this was written to
    Ok(path_buf)
}
