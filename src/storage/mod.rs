//! Persistent store for canonical film records.

use async_trait::async_trait;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::types::FilmRecord;

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::PgFilmStore;
pub use sqlite::SqliteFilmStore;

/// A connection to the `films` table, held for one ingestion run.
#[async_trait]
pub trait FilmStore: Send {
    /// Create the `films` table and its `(title, year)` unique index if absent.
    async fn ensure_schema(&mut self) -> Result<()>;

    /// Insert `films` in a single transaction, skipping rows whose
    /// `(title, year)` already exists. Returns the number of rows inserted.
    async fn insert_or_skip(&mut self, films: &[FilmRecord]) -> Result<u64>;

    /// Number of rows currently in the table.
    async fn count(&mut self) -> Result<u64>;

    /// Release the connection. Dropping the store releases it as well.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Connect to the configured store.
pub async fn open_store(config: &StoreConfig) -> Result<Box<dyn FilmStore>> {
    match config {
        #[cfg(feature = "postgres")]
        StoreConfig::Postgres(settings) => {
            info!(host = %settings.host, port = settings.port, db = %settings.dbname, "Connecting to Postgres");
            Ok(Box::new(PgFilmStore::connect(settings).await?))
        }
        #[cfg(not(feature = "postgres"))]
        StoreConfig::Postgres(_) => Err(crate::error::IngestError::Config(
            "Postgres support is not compiled in; rebuild with the `postgres` feature or set FILMS_SQLITE_PATH"
                .to_string(),
        )),
        StoreConfig::Sqlite { path } => {
            info!(path = %path.display(), "Opening SQLite store");
            Ok(Box::new(SqliteFilmStore::open(path)?))
        }
    }
}
