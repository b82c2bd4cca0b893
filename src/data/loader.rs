//! CSV Data Loader Module
//! Locates the Zomato export, reads it with Polars and cleans it.

use super::model::{Dataset, Restaurant};
use super::processor::DataProcessor;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Dataset location relative to the project root.
pub const DEFAULT_DATASET: &str = "data/zomato.csv";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(
        "Dataset not found: {}. Download the Zomato Bengaluru export and place it at {}",
        .0.display(),
        DEFAULT_DATASET
    )]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default places to look for the dataset, in priority order.
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));

    if let Some(dir) = &exe_dir {
        candidates.push(dir.join("..").join(DEFAULT_DATASET));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(DEFAULT_DATASET));
    }
    if let Some(dir) = &exe_dir {
        candidates.push(dir.join(DEFAULT_DATASET));
    }
    candidates
}

/// Pick the dataset path: an explicit path always wins, otherwise the first
/// existing candidate, otherwise the first candidate (reported as missing later).
pub fn resolve_dataset_path(explicit: Option<&Path>, candidates: &[PathBuf]) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    candidates
        .iter()
        .find(|p| p.exists())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET))
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Read the raw export. Every column is read as text; cleaning happens afterwards.
    pub fn read_raw(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Ok(df)
    }

    /// Load and clean the dataset.
    pub fn load_dataset(path: &Path) -> Result<Dataset, LoaderError> {
        let started = Instant::now();
        let df = Self::read_raw(path)?;
        log::debug!(
            "read {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );

        let rows = DataProcessor::clean(&df)?;
        log::info!(
            "loaded {} restaurants from {} in {:.2?}",
            rows.len(),
            path.display(),
            started.elapsed()
        );

        Ok(Dataset::new(path.to_path_buf(), rows))
    }

    /// Write cleaned rows as CSV.
    pub fn write_csv<'a, I>(rows: I, path: &Path) -> Result<usize, LoaderError>
    where
        I: IntoIterator<Item = &'a Restaurant>,
    {
        let mut df = DataProcessor::to_dataframe(rows)?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        log::info!("exported {} rows to {}", df.height(), path.display());
        Ok(df.height())
    }
}
