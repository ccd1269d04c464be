//! Historical production dataset
//!
//! Read once at start-up. Backs the data preview, the high-risk table and,
//! for categorical fields the model card gives no vocabulary for, the
//! form's select options. The inference core never sees it.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// `1` marks a defective run
pub const DEFECT_COLUMN: &str = "Defect";

/// Rows shown on the preview page
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset has no {0} column")]
    MissingColumn(String),
}

/// Header plus rows, cells kept as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => DatasetError::NotFound(path.to_path_buf()),
            _ => DatasetError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Self::from_reader(file)
    }

    /// Ragged rows are an error.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .deserialize::<Vec<String>>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Distinct non-empty values of `name` in first-seen order. Empty when
    /// the column does not exist.
    pub fn distinct(&self, name: &str) -> Vec<String> {
        let Some(index) = self.column(name) else {
            return Vec::new();
        };

        let mut values: Vec<String> = Vec::new();
        for cell in self.rows.iter().filter_map(|row| row.get(index)) {
            if !cell.is_empty() && !values.contains(cell) {
                values.push(cell.clone());
            }
        }
        values
    }

    /// Rows whose `Defect` column is 1.
    pub fn high_risk(&self) -> Result<Vec<&[String]>, DatasetError> {
        let index = self
            .column(DEFECT_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn(DEFECT_COLUMN.to_string()))?;

        Ok(self
            .rows
            .iter()
            .filter(|row| {
                row.get(index)
                    .and_then(|cell| cell.parse::<f64>().ok())
                    .is_some_and(|flag| flag == 1.0)
            })
            .map(Vec::as_slice)
            .collect())
    }
}
