use chrono::{DateTime, Utc};

/// A validated, normalized film row ready for the `films` table.
///
/// `title` is always trimmed and non-empty; rows without one never become a
/// `FilmRecord`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmRecord {
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub synopsis: Option<String>,
    /// Stored in the `meta` column. Nothing populates it yet.
    pub metadata: Option<serde_json::Value>,
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Data rows read from the source
    pub rows_read: usize,
    /// Rows that survived title validation and were sent to the store
    pub rows_prepared: usize,
    /// Rows the store actually inserted (duplicates excluded)
    pub inserted: u64,
    /// Rows in the store after the insert committed
    pub total: u64,
    pub completed_at: DateTime<Utc>,
}
