pub mod cli;
pub mod compare;
pub mod connect;
pub mod db;
pub mod manifest;
pub mod model;
pub mod report;
pub mod run;
pub mod sql;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("table_audit", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    match cli.command {
        Commands::Compare(args) => run::execute(&args),
        Commands::Manifest(args) => handle_manifest(&args),
        Commands::Ping(args) => handle_ping(&args),
    }
}

fn handle_manifest(args: &cli::ManifestArgs) -> Result<()> {
    let delimiter = manifest::resolve_delimiter(&args.manifest, args.delimiter);
    let specs = manifest::load(&args.manifest, delimiter)
        .with_context(|| format!("Loading manifest {:?}", args.manifest))?;
    if specs.is_empty() {
        bail!(
            "Manifest {:?} contains no usable table specs",
            args.manifest
        );
    }
    let headers = vec!["table".to_string(), "key_columns".to_string()];
    let rows = specs
        .iter()
        .map(|spec| vec![spec.table.clone(), spec.key_columns.join(", ")])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    info!("Manifest contains {} usable table spec(s)", specs.len());
    Ok(())
}

fn handle_ping(args: &cli::PingArgs) -> Result<()> {
    let environment = connect::resolve_environment(
        "target",
        &args.url,
        args.user.as_deref(),
        args.password.as_deref(),
        "DB_USER",
        "DB_PASSWORD",
    )?;
    let mut client = environment.connect()?;
    connect::ping(&mut client)?;
    info!(
        "Connected to {}:{}/{} as '{}'",
        environment.host, environment.port, environment.database, environment.user
    );
    Ok(())
}
