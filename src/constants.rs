/// Columns the tabular source must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["title", "year", "genres", "cast", "synopsis"];

pub const DEFAULT_CSV_PATH: &str = "data/films.csv";

// Store connection defaults; user and password have none
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "filmsrec";

/// Years accepted from the source; anything outside reads as absent.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Rows per INSERT statement inside the batch transaction.
pub const INSERT_PAGE_SIZE: usize = 100;

// Environment variables read by `Config::load`
pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_SQLITE_PATH: &str = "FILMS_SQLITE_PATH";
