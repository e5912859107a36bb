use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

use super::FilmStore;
use crate::error::{IngestError, Result};
use crate::types::FilmRecord;

const SCHEMA_SQL: &str = include_str!("../../schema/sqlite_films.sql");

const INSERT_SQL: &str = r#"
    INSERT INTO films (title, year, genres, "cast", synopsis, meta)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT DO NOTHING
"#;

/// Local file-backed store. List columns are JSON-encoded text.
pub struct SqliteFilmStore {
    conn: Connection,
}

impl SqliteFilmStore {
    /// Open (creating if needed) the database at `path` and bootstrap the table.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path.as_ref())
            .map_err(|e| IngestError::store("Failed to open SQLite database", e))?;
        Self::with_connection(conn)
    }

    /// In-memory store, gone when dropped.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| IngestError::store("Failed to open SQLite database", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let mut store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(|e| IngestError::store("Failed to create films table", e))
    }

    fn insert_batch(&mut self, films: &[FilmRecord]) -> Result<u64> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| IngestError::store("Failed to begin transaction", e))?;

        let mut inserted = 0u64;
        {
            let mut stmt = tx
                .prepare(INSERT_SQL)
                .map_err(|e| IngestError::store("Failed to prepare insert", e))?;
            for film in films {
                let genres = to_json(&film.genres)?;
                let cast = to_json(&film.cast)?;
                let meta = film.metadata.as_ref().map(to_json).transpose()?;
                let changed = stmt
                    .execute(params![film.title, film.year, genres, cast, film.synopsis, meta])
                    .map_err(|e| IngestError::store("Failed to insert films", e))?;
                inserted += changed as u64;
            }
        }

        tx.commit()
            .map_err(|e| IngestError::store("Failed to commit films", e))?;
        debug!(inserted, batch = films.len(), "SQLite batch committed");
        Ok(inserted)
    }

    fn count_rows(&self) -> Result<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM films", [], |row| row.get(0))
            .map_err(|e| IngestError::store("Failed to count films", e))?;
        Ok(total as u64)
    }

    /// Stored rows in insertion order, decoded back into records.
    pub fn films(&self) -> Result<Vec<FilmRecord>> {
        let mut stmt = self
            .conn
            .prepare(r#"SELECT title, year, genres, "cast", synopsis, meta FROM films ORDER BY id"#)
            .map_err(|e| IngestError::store("Failed to query films", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<i32>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })
            .map_err(|e| IngestError::store("Failed to query films", e))?;

        let mut films = Vec::new();
        for row in rows {
            let (title, year, genres, cast, synopsis, meta) =
                row.map_err(|e| IngestError::store("Failed to read film row", e))?;
            films.push(FilmRecord {
                title,
                year,
                genres: from_json(&genres)?,
                cast: from_json(&cast)?,
                synopsis,
                metadata: meta.as_deref().map(from_json).transpose()?,
            });
        }
        Ok(films)
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| IngestError::store("Failed to encode column", e))
}

fn from_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| IngestError::store("Failed to decode column", e))
}

#[async_trait]
impl FilmStore for SqliteFilmStore {
    async fn ensure_schema(&mut self) -> Result<()> {
        self.create_schema()
    }

    async fn insert_or_skip(&mut self, films: &[FilmRecord]) -> Result<u64> {
        if films.is_empty() {
            return Ok(0);
        }
        self.insert_batch(films)
    }

    async fn count(&mut self) -> Result<u64> {
        self.count_rows()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| IngestError::store("Failed to close SQLite database", e))
    }
}
