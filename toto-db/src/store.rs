use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, TotoError};
use crate::models::{CANONICAL_COLUMNS, DATE_COLUMN, DRAW_SIZE, DrawTable, RESULTS_COLUMNS};
use crate::validate::{ValidationReport, clean_rows};

pub const DEFAULT_RESULTS_FILE: &str = "toto_results.csv";
pub const DEFAULT_SIMULATED_FILE: &str = "simulated_draws.csv";

/// Header layout a file was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSchema {
    /// Published results export (`Winning Number 1`, `2`..`6`, `Additional Number`).
    Results,
    /// `Num1`..`Num7`, as written by the generator.
    Canonical,
}

impl std::fmt::Display for SourceSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSchema::Results => write!(f, "published results"),
            SourceSchema::Canonical => write!(f, "Num1-Num7"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: u64,
    pub date: Option<String>,
    /// Unparsed `Num1`..`Num7` fields; absent fields are empty.
    pub fields: [String; DRAW_SIZE],
}

#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub schema: SourceSchema,
    pub rows: Vec<RawRow>,
}

fn find_columns(headers: &csv::StringRecord, names: &[&str; DRAW_SIZE]) -> std::result::Result<[usize; DRAW_SIZE], Vec<String>> {
    let mut indices = [0usize; DRAW_SIZE];
    let mut missing = Vec::new();
    for (slot, name) in indices.iter_mut().zip(names.iter()) {
        match headers.iter().position(|h| h.trim() == *name) {
            Some(idx) => *slot = idx,
            None => missing.push(name.to_string()),
        }
    }
    if missing.is_empty() { Ok(indices) } else { Err(missing) }
}

/// The bare `2`..`6` headers are too generic to identify the results export.
fn looks_like_results(headers: &csv::StringRecord) -> bool {
    let markers = [RESULTS_COLUMNS[0], RESULTS_COLUMNS[DRAW_SIZE - 1]];
    headers.iter().any(|h| markers.iter().any(|m| *m == h.trim()))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TotoError::NotFound {
            path: path.to_path_buf(),
        },
        _ => TotoError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Reads every data row of a draw CSV without validating the numbers.
pub fn load_raw(path: &Path) -> Result<RawTable> {
    let file = open(path)?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let csv_err = |source: csv::Error| TotoError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(csv_err)?.clone();

    let (schema, indices) = match find_columns(&headers, &RESULTS_COLUMNS) {
        Ok(indices) => (SourceSchema::Results, indices),
        Err(results_missing) => match find_columns(&headers, &CANONICAL_COLUMNS) {
            Ok(indices) => (SourceSchema::Canonical, indices),
            Err(canonical_missing) => {
                let missing = if looks_like_results(&headers) {
                    results_missing
                } else {
                    canonical_missing
                };
                return Err(TotoError::Schema {
                    path: path.to_path_buf(),
                    missing,
                });
            }
        },
    };
    let date_idx = headers.iter().position(|h| h.trim() == DATE_COLUMN);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let fields = indices.map(|idx| record.get(idx).unwrap_or("").trim().to_string());
        let date = date_idx
            .and_then(|idx| record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        rows.push(RawRow {
            line: i as u64 + 1,
            date,
            fields,
        });
    }

    log::info!("loaded {} rows ({} schema) from {}", rows.len(), schema, path.display());
    Ok(RawTable {
        path: path.to_path_buf(),
        schema,
        rows,
    })
}

/// Loads and validates a draw CSV, dropping invalid rows.
pub fn load_clean(path: &Path) -> Result<(DrawTable, ValidationReport)> {
    let raw = load_raw(path)?;
    Ok(clean_rows(&raw))
}

/// Writes the table with the `Num1`..`Num7` header.
pub fn save_table(path: &Path, table: &DrawTable) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| TotoError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |source: csv::Error| TotoError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(CANONICAL_COLUMNS).map_err(csv_err)?;
    for draw in table {
        writer
            .write_record(draw.numbers().iter().map(|n| n.to_string()))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| TotoError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("wrote {} draws to {}", table.len(), path.display());
    Ok(())
}
