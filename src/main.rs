use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use films_ingest::constants::DEFAULT_CSV_PATH;
use films_ingest::{logging, Config, IngestReport, Loader};

#[derive(Parser)]
#[command(name = "films_ingest")]
#[command(about = "Ingest films from a CSV file into the films table")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the CSV file
    #[arg(long, default_value = DEFAULT_CSV_PATH)]
    csv: PathBuf,

    /// Optional TOML file with [database] or [sqlite] settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Create the films table and its (title, year) index if missing
    #[arg(long)]
    init_schema: bool,
}

async fn run(cli: &Cli) -> anyhow::Result<IngestReport> {
    let config = Config::load(cli.config.as_deref())?;
    let report = Loader::new(&config)
        .with_schema_init(cli.init_schema)
        .ingest(&cli.csv)
        .await?;
    Ok(report)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let guard = logging::init_logging();

    match run(&cli).await {
        Ok(report) => {
            println!("✅ {} films inserted into table 'films'.", report.inserted);
            println!("Total films in database: {}", report.total);
        }
        Err(e) => {
            error!("Ingestion failed: {:#}", e);
            eprintln!("❌ Error: {:#}", e);
            drop(guard);
            std::process::exit(1);
        }
    }
}
