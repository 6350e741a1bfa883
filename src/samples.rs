//! Sample files
//!
//! Loads reading samples from JSON arrays (the same shape the dashboard
//! receives) or from CSV exports with `fecha` and `alcohol_ppm` columns.

use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::chart::Sample;

/// Errors while loading a sample file
#[derive(Error, Debug)]
pub enum SampleFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON samples: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing column {0}")]
    MissingColumn(&'static str),
}

/// Samples plus the rows that could not be read
#[derive(Debug, Default)]
pub struct LoadedSamples {
    pub samples: Vec<Sample>,
    /// `(line, reason)` for each skipped CSV row
    pub skipped: Vec<(usize, String)>,
}

/// Load samples from `path`, picking the format by extension (`.csv` or JSON)
pub fn load_samples(path: &Path) -> Result<LoadedSamples, SampleFileError> {
    let file = std::fs::File::open(path)?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let loaded = if is_csv {
        samples_from_csv(file)?
    } else {
        LoadedSamples {
            samples: serde_json::from_reader(file)?,
            skipped: Vec::new(),
        }
    };

    tracing::info!(
        path = %path.display(),
        samples = loaded.samples.len(),
        skipped = loaded.skipped.len(),
        "Loaded sample file"
    );
    Ok(loaded)
}

/// Read CSV samples; rows with unparseable values are skipped and reported.
///
/// The timestamp comes from the `fecha` column, or `timestamp` when there is
/// no `fecha`.
pub fn samples_from_csv<R: Read>(reader: R) -> Result<LoadedSamples, SampleFileError> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let time_col = column("fecha")
        .or_else(|| column("timestamp"))
        .ok_or(SampleFileError::MissingColumn("fecha"))?;
    let ppm_col = column("alcohol_ppm").ok_or(SampleFileError::MissingColumn("alcohol_ppm"))?;

    let mut loaded = LoadedSamples::default();

    // Header is line 1
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                loaded.skipped.push((line, e.to_string()));
                continue;
            }
        };

        let (Some(fecha), Some(ppm)) = (record.get(time_col), record.get(ppm_col)) else {
            loaded.skipped.push((line, "missing fields".to_string()));
            continue;
        };

        match ppm.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => loaded.samples.push(Sample::new(fecha, value)),
            _ => loaded
                .skipped
                .push((line, format!("invalid alcohol_ppm: {}", ppm))),
        }
    }

    if !loaded.skipped.is_empty() {
        tracing::warn!(count = loaded.skipped.len(), "Skipped invalid sample rows");
    }

    Ok(loaded)
}
