use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::normalize::{clean_text, normalize_list_field, parse_year, CellValue};
use crate::source::{FilmSource, RawFilm};
use crate::storage::{open_store, FilmStore};
use crate::types::{FilmRecord, IngestReport};

/// Rows read from a source, normalized and ready for the store.
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub rows_read: usize,
    pub films: Vec<FilmRecord>,
}

/// Normalize one source row. Rows without a usable title yield `None`.
pub fn to_film_record(raw: RawFilm) -> Option<FilmRecord> {
    let title = clean_text(raw.title.as_deref())?;

    Some(FilmRecord {
        title,
        year: parse_year(raw.year.as_deref()),
        genres: normalize_list_field(&CellValue::from(raw.genres)),
        cast: normalize_list_field(&CellValue::from(raw.cast)),
        synopsis: clean_text(raw.synopsis.as_deref()),
        metadata: None,
    })
}

/// Read and normalize every row of the CSV at `path`, in file order.
///
/// Fails before touching any row if the file is missing or lacks a required
/// column. Rows without a title are dropped silently.
pub fn prepare_batch(path: &Path) -> Result<PreparedBatch> {
    info!(path = %path.display(), "Reading CSV file");
    let mut source = FilmSource::open(path)?;

    let mut rows_read = 0usize;
    let mut films = Vec::new();
    for row in source.rows() {
        rows_read += 1;
        match to_film_record(row?) {
            Some(film) => films.push(film),
            None => debug!(row = rows_read, "Dropping row without title"),
        }
    }

    info!(rows_read, "Films read from CSV");
    info!(prepared = films.len(), "Preparing films for insertion");
    Ok(PreparedBatch { rows_read, films })
}

/// Insert `films` with duplicate suppression, then count the table.
///
/// Returns `(inserted, total)`; the count runs after the insert commits.
pub async fn load_batch(store: &mut dyn FilmStore, films: &[FilmRecord]) -> Result<(u64, u64)> {
    let inserted = store.insert_or_skip(films).await?;
    info!(inserted, "Films inserted into table 'films'");

    let total = store.count().await?;
    info!(total, "Total films in database");
    Ok((inserted, total))
}

/// Runs the CSV to store ingestion against the configured store.
pub struct Loader<'a> {
    config: &'a Config,
    init_schema: bool,
}

impl<'a> Loader<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            init_schema: false,
        }
    }

    /// Create the `films` table before inserting if it does not exist yet.
    pub fn with_schema_init(mut self, init_schema: bool) -> Self {
        self.init_schema = init_schema;
        self
    }

    /// Ingest the CSV at `source_path`.
    ///
    /// The store is only connected once the source has passed its existence
    /// and column checks, and the connection is released on every path.
    #[instrument(skip_all, fields(source = %source_path.display()))]
    pub async fn ingest(&self, source_path: &Path) -> Result<IngestReport> {
        let batch = prepare_batch(source_path)?;

        let mut store = open_store(&self.config.store).await?;
        let outcome = self.write(store.as_mut(), &batch.films).await;
        if let Err(e) = store.close().await {
            warn!("Failed to release store connection: {}", e);
        }
        let (inserted, total) = outcome?;

        let report = IngestReport {
            rows_read: batch.rows_read,
            rows_prepared: batch.films.len(),
            inserted,
            total,
            completed_at: Utc::now(),
        };
        info!(
            completed_at = %report.completed_at.to_rfc3339(),
            rows_read = report.rows_read,
            inserted,
            total,
            "Ingestion complete"
        );
        Ok(report)
    }

    async fn write(&self, store: &mut dyn FilmStore, films: &[FilmRecord]) -> Result<(u64, u64)> {
        if self.init_schema {
            store.ensure_schema().await?;
        }
        load_batch(store, films).await
    }
}
