use std::path::Path;

use csv::ReaderBuilder;
use ndarray::Array1;

use crate::error::{RegForestError, Result};
use crate::training_set::{Sample, TrainingSet};

/// Reads a CSV file with a header row. The first column is the target, the
/// remaining columns are the inputs.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<TrainingSet> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut ts: Option<TrainingSet> = None;
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let values = record
            .iter()
            .map(|field| {
                field.trim().parse::<f64>().map_err(|e| RegForestError::Parse {
                    message: format!("row {}: '{}': {}", line + 1, field, e),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        let Some((&y, x)) = values.split_first() else {
            continue;
        };
        let ts = ts.get_or_insert_with(|| TrainingSet::new(x.len()));
        ts.push(Sample::new(Array1::from(x.to_vec()), y))?;
    }
    ts.ok_or(RegForestError::EmptyTrainingSet)
}
