use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use import_api::config::ImportConfig;
use import_api::db::run_migrations;
use import_api::import::ImportStatus;
use import_api::postgres_pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "import-file",
    about = "Import organizations from a JSON file straight into the database"
)]
struct Args {
    /// Path to a JSON array of organizations.
    path: PathBuf,

    /// Operator recorded in the import history.
    #[arg(long)]
    username: String,

    /// Postgres connection string (falls back to DATABASE_URL).
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let payload = match std::fs::read(&args.path) {
        Ok(bytes) => bytes,
        Err(err) => {
            writeln!(io::stderr(), "error: cannot read {}: {err}", args.path.display())?;
            std::process::exit(2);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&args.database_url)
        .await?;
    run_migrations(&pool).await?;

    let pipeline = postgres_pipeline(pool, ImportConfig::from_env());

    let history = match pipeline.run_payload(&payload, &args.username).await {
        Ok(history) => history,
        Err(err) if err.is_caller_error() => {
            writeln!(io::stderr(), "error: {err}")?;
            std::process::exit(2);
        }
        Err(err) => return Err(err.into()),
    };

    println!("{}", serde_json::to_string_pretty(&history)?);

    if history.status != ImportStatus::Success {
        std::process::exit(1);
    }
    Ok(())
}
