use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::types::Json;
use sqlx::{Connection, Executor, Postgres, QueryBuilder};
use tracing::debug;

use super::FilmStore;
use crate::config::PgSettings;
use crate::constants::INSERT_PAGE_SIZE;
use crate::error::{IngestError, Result};
use crate::types::FilmRecord;

const SCHEMA_SQL: &str = include_str!("../../schema/postgres_films.sql");

/// Postgres store over a single connection. `genres` and `"cast"` are `TEXT[]`.
pub struct PgFilmStore {
    conn: PgConnection,
}

impl PgFilmStore {
    pub async fn connect(settings: &PgSettings) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.dbname)
            .username(&settings.user)
            .password(&settings.password);

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| IngestError::store("Failed to connect to database", e))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl FilmStore for PgFilmStore {
    async fn ensure_schema(&mut self) -> Result<()> {
        Executor::execute(&mut self.conn, sqlx::raw_sql(SCHEMA_SQL))
            .await
            .map_err(|e| IngestError::store("Failed to create films table", e))?;
        Ok(())
    }

    async fn insert_or_skip(&mut self, films: &[FilmRecord]) -> Result<u64> {
        if films.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| IngestError::store("Failed to begin transaction", e))?;

        let mut inserted = 0u64;
        for page in films.chunks(INSERT_PAGE_SIZE) {
            let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO films (title, year, genres, "cast", synopsis, meta) "#,
            );
            query.push_values(page, |mut row, film| {
                row.push_bind(&film.title)
                    .push_bind(film.year)
                    .push_bind(&film.genres)
                    .push_bind(&film.cast)
                    .push_bind(&film.synopsis)
                    .push_bind(film.metadata.as_ref().map(Json));
            });
            query.push(" ON CONFLICT DO NOTHING");

            let result = query
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| IngestError::store("Failed to insert films", e))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| IngestError::store("Failed to commit films", e))?;
        debug!(inserted, batch = films.len(), "Postgres batch committed");
        Ok(inserted)
    }

    async fn count(&mut self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM films")
            .fetch_one(&mut self.conn)
            .await
            .map_err(|e| IngestError::store("Failed to count films", e))?;
        Ok(total as u64)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| IngestError::store("Failed to close database connection", e))
    }
}
