//! CSV input for datasets
//!
//! The first record is the header; every remaining field must parse as `f64`.

use crate::dataset::Dataset;
use crate::error::{NumericError, ShiftError, ValidationError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors while loading a dataset from CSV
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Numeric(#[from] NumericError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<ShiftError> for LoadError {
    fn from(err: ShiftError) -> Self {
        match err {
            ShiftError::Validation(e) => LoadError::Validation(e),
            ShiftError::Numeric(e) => LoadError::Numeric(e),
        }
    }
}

/// Load a dataset from a CSV file with a header row
pub fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path)?;
    let dataset = read_csv(BufReader::new(file))?;
    tracing::debug!(
        "Loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.n_columns(),
        path.display()
    );
    Ok(dataset)
}

/// Parse a dataset from any CSV source
pub fn read_csv<R: Read>(source: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() || columns.iter().all(String::is_empty) {
        return Err(ValidationError::NoFeatures.into());
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let mut row = Vec::with_capacity(columns.len());
        for (field, column) in record.iter().zip(&columns) {
            let value = field.parse::<f64>().map_err(|_| NumericError::NonNumeric {
                row: i,
                column: column.clone(),
                value: field.to_string(),
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows)?)
}
