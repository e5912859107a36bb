use csv::{Reader, ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::constants::REQUIRED_COLUMNS;
use crate::error::{IngestError, Result};

/// One data row of the source, before any normalization.
///
/// Empty fields and fields missing from short rows both read as `None`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawFilm {
    pub title: Option<String>,
    pub year: Option<String>,
    pub genres: Option<String>,
    pub cast: Option<String>,
    pub synopsis: Option<String>,
}

/// A films CSV whose header has been checked against the required columns.
pub struct FilmSource {
    reader: Reader<File>,
    columns: Vec<String>,
}

impl FilmSource {
    /// Open `path`, failing with `NotFound` when it is absent and `Schema`
    /// when the header lacks a required column. No rows are read here.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IngestError::NotFound {
                path: path.display().to_string(),
            });
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        check_columns(&columns)?;
        debug!(path = %path.display(), ?columns, "Opened films source");

        Ok(Self { reader, columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in file order.
    pub fn rows(&mut self) -> impl Iterator<Item = Result<RawFilm>> + '_ {
        let headers = StringRecord::from(self.columns.clone());
        self.reader
            .records()
            .map(move |record| -> Result<RawFilm> { Ok(record?.deserialize(Some(&headers))?) })
    }
}

/// Verify the header carries every required column.
pub fn check_columns(columns: &[String]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::Schema {
            missing,
            present: columns.to_vec(),
        })
    }
}
