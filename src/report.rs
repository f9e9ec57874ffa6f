//! Report rendering and CSV export of the one-sided mismatch sets.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use csv::QuoteStyle;

use crate::{
    compare::TableReport,
    table::{print_table, render_table},
};

#[derive(Debug, Default)]
pub struct RunSummary {
    pub compared: usize,
    pub mismatched: usize,
    pub failed: usize,
}

pub fn print_report(report: &TableReport, preview_rows: usize) {
    println!("== {} ==", report.table);
    println!(
        "QA count: {} | Prod count: {} -> {}",
        report.qa_count,
        report.prod_count,
        if report.counts_match() {
            "match"
        } else {
            "MISMATCH"
        }
    );

    if report.has_key_mismatch() {
        print_side("Rows only in QA", &report.qa_only, report, preview_rows);
        print_side("Rows only in Prod", &report.prod_only, report, preview_rows);
    } else {
        println!("Key sets match.");
    }

    println!("Null counts:");
    let headers = vec![
        "column".to_string(),
        "qa_nulls".to_string(),
        "prod_nulls".to_string(),
    ];
    let rows = report
        .null_counts
        .iter()
        .map(|entry| {
            vec![
                entry.column.clone(),
                entry.qa_nulls.to_string(),
                entry.prod_nulls.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&headers, &rows);

    if report.aggregates.is_empty() {
        println!("No numeric key columns to aggregate.");
    } else {
        println!("Aggregates:");
        let headers = vec![
            "column".to_string(),
            "qa_sum".to_string(),
            "prod_sum".to_string(),
            "qa_mean".to_string(),
            "prod_mean".to_string(),
        ];
        let rows = report
            .aggregates
            .iter()
            .map(|entry| {
                vec![
                    entry.column.clone(),
                    entry.qa.sum.render(),
                    entry.prod.sum.render(),
                    entry.qa.mean.map(|m| m.render()).unwrap_or_default(),
                    entry.prod.mean.map(|m| m.render()).unwrap_or_default(),
                ]
            })
            .collect::<Vec<_>>();
        print_table(&headers, &rows);
    }
    println!();
}

fn print_side(
    label: &str,
    rows: &[Vec<Option<String>>],
    report: &TableReport,
    preview_rows: usize,
) {
    if rows.is_empty() {
        println!("{label}: none");
        return;
    }
    println!("{label}: {} row(s)", rows.len());
    let preview = rows
        .iter()
        .take(preview_rows)
        .map(|row| row.iter().map(render_cell).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    print!("{}", render_table(&report.columns, &preview));
    if rows.len() > preview_rows {
        println!("... {} more row(s) not shown", rows.len() - preview_rows);
    }
}

/// Write the non-empty one-sided sets as `<stem>_qa_only.csv` and
/// `<stem>_prod_only.csv` under `dir`, headers identical to the key-column
/// projection. Returns the paths written.
pub fn export_mismatches(report: &TableReport, stem: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Creating export directory {dir:?}"))?;
    let mut written = Vec::new();
    for (suffix, rows) in [("qa_only", &report.qa_only), ("prod_only", &report.prod_only)] {
        if rows.is_empty() {
            continue;
        }
        let path = dir.join(format!("{stem}_{suffix}.csv"));
        write_mismatch_csv(&path, &report.columns, rows)?;
        written.push(path);
    }
    Ok(written)
}

fn write_mismatch_csv(
    path: &Path,
    columns: &[String],
    rows: &[Vec<Option<String>>],
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("Creating export file {path:?}"))?;
    writer
        .write_record(columns)
        .context("Writing export headers")?;
    for row in rows {
        writer
            .write_record(row.iter().map(render_cell))
            .context("Writing export row")?;
    }
    writer.flush().context("Flushing export file")?;
    Ok(())
}

fn render_cell(cell: &Option<String>) -> String {
    cell.clone().unwrap_or_default()
}

pub fn print_summary(summary: &RunSummary) {
    println!(
        "Run complete: {} table(s) compared, {} with mismatches, {} failed",
        summary.compared, summary.mismatched, summary.failed
    );
}
