#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use log::{LevelFilter, info, warn};
use services::{AppServices, IdSource, LoadReport, LoadSource};
use storage::keys::CORRUPT_SUBJECTS_KEY;

mod cli;
mod commands;
mod config;
mod render;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("study-valley: {err:#}");
        std::process::exit(2);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    let app = if cli.memory {
        info!("using an in-memory store");
        AppServices::in_memory(IdSource::random(), cli.theme_default).await?
    } else {
        // Open + migrate SQLite in the binary glue so the library crates stay storage-agnostic.
        let db_url = config::normalize_sqlite_url(&cli.db);
        config::prepare_sqlite_file(&db_url)?;
        info!("opening {db_url}");
        AppServices::new_sqlite(&db_url, IdSource::random(), cli.theme_default)
            .await
            .with_context(|| format!("failed to open {db_url}"))?
    };
    report_load(app.load_report());

    commands::dispatch(cli.command, &app, cli.format).await
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn report_load(report: &LoadReport) {
    match &report.source {
        LoadSource::Persisted => {}
        LoadSource::Seeded => info!("first run: added {} starter subjects", report.subjects.len()),
        LoadSource::Recovered { reason } => {
            warn!("saved subjects were unreadable ({reason})");
            eprintln!(
                "note: saved subjects could not be read; restored the starter set \
                 (the old value is kept under `{CORRUPT_SUBJECTS_KEY}`)"
            );
        }
    }
}
