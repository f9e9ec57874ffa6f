//! The `compare` subcommand: connect both environments, walk the manifest,
//! and compare each table in sequence.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use postgres::Client;

use crate::{
    cli::CompareArgs,
    compare::{self, TableReport},
    connect, db, manifest,
    manifest::TableSpec,
    report::{self, RunSummary},
    sql::QualifiedTable,
};

/// Run context: both live connections plus the settings shared by every
/// table comparison. Connections are used strictly sequentially, QA before
/// Prod.
struct Session {
    qa: Client,
    prod: Client,
    schema: String,
    preview_rows: usize,
    export_dir: Option<PathBuf>,
}

pub fn execute(args: &CompareArgs) -> Result<()> {
    let delimiter = manifest::resolve_delimiter(&args.manifest, args.delimiter);
    let mut specs = manifest::load(&args.manifest, delimiter)
        .with_context(|| format!("Loading manifest {:?}", args.manifest))?;
    if !args.tables.is_empty() {
        for requested in &args.tables {
            if !specs
                .iter()
                .any(|spec| spec.table.eq_ignore_ascii_case(requested))
            {
                warn!("Requested table '{requested}' is not in the manifest");
            }
        }
        specs.retain(|spec| {
            args.tables
                .iter()
                .any(|requested| requested.eq_ignore_ascii_case(&spec.table))
        });
    }
    if specs.is_empty() {
        bail!("No usable table specs to compare");
    }

    let qa_environment = connect::resolve_environment(
        "QA",
        &args.qa_url,
        args.qa_user.as_deref(),
        args.qa_password.as_deref(),
        "QA_USER",
        "QA_PASSWORD",
    )?;
    let prod_environment = connect::resolve_environment(
        "Prod",
        &args.prod_url,
        args.prod_user.as_deref(),
        args.prod_password.as_deref(),
        "PROD_USER",
        "PROD_PASSWORD",
    )?;

    // Both connections are opened before any comparison starts; either side
    // failing stops the run here.
    info!(
        "Connecting to QA {}:{}/{}",
        qa_environment.host, qa_environment.port, qa_environment.database
    );
    let qa = qa_environment.connect()?;
    info!(
        "Connecting to Prod {}:{}/{}",
        prod_environment.host, prod_environment.port, prod_environment.database
    );
    let prod = prod_environment.connect()?;

    let mut session = Session {
        qa,
        prod,
        schema: args.schema.clone(),
        preview_rows: args.preview_rows,
        export_dir: args.export_dir.clone(),
    };

    let mut summary = RunSummary::default();
    for spec in &specs {
        info!("Comparing table '{}'", spec.table);
        let outcome = compare_one(&mut session, spec).and_then(|table_report| {
            report::print_report(&table_report, session.preview_rows);
            export(&session, spec, &table_report)?;
            summary.compared += 1;
            if !table_report.is_clean() {
                summary.mismatched += 1;
            }
            Ok(())
        });
        if let Err(err) = outcome {
            error!("Table '{}' failed: {err:#}", spec.table);
            summary.failed += 1;
        }
    }
    report::print_summary(&summary);
    Ok(())
}

fn compare_one(session: &mut Session, spec: &TableSpec) -> Result<TableReport> {
    let table = QualifiedTable::parse(&spec.table, &session.schema)?;

    let qa_kinds = db::column_kinds(&mut session.qa, &table)?;
    if qa_kinds.is_empty() {
        bail!("Table {} not found on the QA side", table.display());
    }
    let prod_kinds = db::column_kinds(&mut session.prod, &table)?;
    if prod_kinds.is_empty() {
        bail!("Table {} not found on the Prod side", table.display());
    }
    let columns = db::resolve_key_columns(&spec.key_columns, &qa_kinds, &prod_kinds)?;

    let qa_count = db::row_count(&mut session.qa, &table)?;
    let prod_count = db::row_count(&mut session.prod, &table)?;

    let qa_data = db::fetch_projection(&mut session.qa, &table, &columns)?;
    let prod_data = db::fetch_projection(&mut session.prod, &table, &columns)?;

    compare::build_report(table.display(), qa_count, prod_count, &qa_data, &prod_data)
}

fn export(session: &Session, spec: &TableSpec, table_report: &TableReport) -> Result<()> {
    let Some(dir) = &session.export_dir else {
        return Ok(());
    };
    let stem = QualifiedTable::parse(&spec.table, &session.schema)?.file_stem();
    let files = report::export_mismatches(table_report, &stem, dir)?;
    for file in &files {
        info!("Wrote mismatch export {file:?}");
    }
    Ok(())
}
