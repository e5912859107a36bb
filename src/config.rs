use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{IngestError, Result};

/// Runtime configuration, built once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
}

/// Which persistent store the loader writes to.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Postgres(PgSettings),
    Sqlite { path: PathBuf },
}

#[derive(Clone)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for PgSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Shape of the optional TOML config file.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub database: DatabaseSection,
    pub sqlite: Option<SqliteSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SqliteSection {
    pub path: PathBuf,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            IngestError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let parsed: FileConfig = toml::from_str(&content)?;
        Ok(parsed)
    }
}

impl Config {
    /// Load from an optional TOML file, then let the process environment
    /// (including a `.env` file) override it.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let file = match config_path {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge file values with variables from `lookup`; `lookup` wins.
    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sqlite_path = env(ENV_SQLITE_PATH)
            .map(PathBuf::from)
            .or(file.sqlite.map(|s| s.path));
        if let Some(path) = sqlite_path {
            return Ok(Config {
                store: StoreConfig::Sqlite { path },
            });
        }

        let db = file.database;
        let host = env(ENV_DB_HOST)
            .or(db.host)
            .unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
        let port = match env(ENV_DB_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                IngestError::Config(format!("{ENV_DB_PORT} must be a port number, got '{raw}'"))
            })?,
            None => db.port.unwrap_or(DEFAULT_DB_PORT),
        };
        let dbname = env(ENV_DB_NAME)
            .or(db.name)
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        let user = env(ENV_DB_USER).or(db.user).filter(|v| !v.trim().is_empty());
        let password = env(ENV_DB_PASSWORD).or(db.password).filter(|v| !v.trim().is_empty());

        let (user, password) = match (user, password) {
            (Some(user), Some(password)) => (user, password),
            _ => {
                return Err(IngestError::Config(format!(
                    "{ENV_DB_USER} and {ENV_DB_PASSWORD} are required.\n\
                     Example: export {ENV_DB_USER}=postgres && export {ENV_DB_PASSWORD}=your_password"
                )))
            }
        };

        Ok(Config {
            store: StoreConfig::Postgres(PgSettings {
                host,
                port,
                dbname,
                user,
                password,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_credentials_given() {
        let config = Config::from_sources(
            FileConfig::default(),
            lookup(&[("DB_USER", "postgres"), ("DB_PASSWORD", "secret")]),
        )
        .unwrap();

        match config.store {
            StoreConfig::Postgres(pg) => {
                assert_eq!(pg.host, "localhost");
                assert_eq!(pg.port, 5432);
                assert_eq!(pg.dbname, "filmsrec");
                assert_eq!(pg.user, "postgres");
            }
            other => panic!("expected postgres store, got {other:?}"),
        }
    }

    #[test]
    fn missing_password_is_config_error() {
        let err = Config::from_sources(FileConfig::default(), lookup(&[("DB_USER", "postgres")]))
            .unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
        assert!(err.to_string().contains("DB_PASSWORD"));
    }

    #[test]
    fn blank_user_counts_as_missing() {
        let err = Config::from_sources(
            FileConfig::default(),
            lookup(&[("DB_USER", "  "), ("DB_PASSWORD", "secret")]),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }

    #[test]
    fn bad_port_is_config_error() {
        let err = Config::from_sources(
            FileConfig::default(),
            lookup(&[
                ("DB_USER", "postgres"),
                ("DB_PASSWORD", "secret"),
                ("DB_PORT", "fivefour"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let file: FileConfig = toml::from_str(
            r#"
            [database]
            host = "db.internal"
            port = 6543
            user = "file_user"
            password = "file_pass"
            "#,
        )
        .unwrap();

        let config = Config::from_sources(file, lookup(&[("DB_USER", "env_user")])).unwrap();
        match config.store {
            StoreConfig::Postgres(pg) => {
                assert_eq!(pg.host, "db.internal");
                assert_eq!(pg.port, 6543);
                assert_eq!(pg.user, "env_user");
                assert_eq!(pg.password, "file_pass");
            }
            other => panic!("expected postgres store, got {other:?}"),
        }
    }

    #[test]
    fn sqlite_path_needs_no_credentials() {
        let config =
            Config::from_sources(FileConfig::default(), lookup(&[("FILMS_SQLITE_PATH", "films.db")]))
                .unwrap();
        assert!(matches!(config.store, StoreConfig::Sqlite { ref path } if path == Path::new("films.db")));
    }

    #[test]
    fn debug_output_hides_password() {
        let settings = PgSettings {
            host: "localhost".into(),
            port: 5432,
            dbname: "filmsrec".into(),
            user: "postgres".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
