pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{IngestError, Result};
pub use normalize::{normalize_list_field, CellValue};
pub use pipeline::Loader;
pub use types::{FilmRecord, IngestReport};
