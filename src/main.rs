mod cleanup;
mod config;
mod db;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use db::Database;

/// Strip stray trailing page numbers from recipe names.
#[derive(Parser, Debug)]
#[command(name = "recipe-tidy")]
struct Cli {
    /// Configuration file (default: <config_dir>/recipe-tidy/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Recipes database, overrides the configured path
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Only recipes with book_id below this are cleaned, overrides the
    /// configured cutoff
    #[arg(long, value_name = "N")]
    threshold: Option<i64>,

    /// Report what would change without writing
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    let db_path = cli.db.unwrap_or(config.database_path);
    let threshold = cli.threshold.unwrap_or(config.book_id_threshold);

    let mut db = Database::open(&db_path)?;
    let report = cleanup::run(&mut db, threshold, cli.dry_run)?;

    println!(
        "{} {} of {} recipe name(s)",
        if cli.dry_run { "would tidy" } else { "tidied" },
        report.renamed,
        report.scanned
    );

    Ok(())
}
