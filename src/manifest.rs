//! Manifest loading: the user-supplied list of tables and key columns.
//!
//! The manifest is a CSV with `Table Name` and `Key Columns` headers (the
//! spreadsheet schema of the original tooling). Header matching tolerates
//! case and space/underscore variation, so `table_name` works too.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::StringRecord;
use log::warn;
use serde::Deserialize;

pub const DEFAULT_DELIMITER: u8 = b',';

const TABLE_HEADER: &str = "Table Name";
const KEYS_HEADER: &str = "Key Columns";

/// One table to compare, with the ordered key columns identifying its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub table: String,
    pub key_columns: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ManifestRow {
    #[serde(rename = "Table Name")]
    table: String,
    #[serde(rename = "Key Columns")]
    key_columns: String,
}

pub fn resolve_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => DEFAULT_DELIMITER,
    })
}

/// Load and validate the manifest. Rows missing a table name or declaring no
/// key columns are skipped with a warning; a duplicate table name replaces the
/// earlier declaration. Missing required headers fail the load outright.
pub fn load(path: &Path, delimiter: u8) -> Result<Vec<TableSpec>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Opening manifest {path:?}"))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Reading manifest headers from {path:?}"))?
        .clone();
    let canonical = canonical_headers(&headers)?;

    let mut specs: Vec<TableSpec> = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading manifest row {}", row_idx + 2))?;
        let row: ManifestRow = record
            .deserialize(Some(&canonical))
            .with_context(|| format!("Parsing manifest row {}", row_idx + 2))?;

        let table = row.table.trim().to_string();
        if table.is_empty() {
            warn!("Skipping manifest row {}: empty table name", row_idx + 2);
            continue;
        }
        let key_columns = split_key_columns(&row.key_columns);
        if key_columns.is_empty() {
            warn!("Skipping table '{table}': no key columns declared");
            continue;
        }

        let spec = TableSpec { table, key_columns };
        if let Some(existing) = specs.iter_mut().find(|s| s.table == spec.table) {
            warn!(
                "Manifest declares table '{}' more than once; keeping the later row",
                spec.table
            );
            *existing = spec;
        } else {
            specs.push(spec);
        }
    }
    Ok(specs)
}

/// Split a comma-separated key-column declaration, trimming each name and
/// dropping empties.
pub fn split_key_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Map the file's headers onto the canonical names, so serde sees `Table
/// Name` / `Key Columns` regardless of the variant spelling in the file.
fn canonical_headers(headers: &StringRecord) -> Result<StringRecord> {
    let mut canonical = Vec::with_capacity(headers.len());
    let mut saw_table = false;
    let mut saw_keys = false;
    for header in headers {
        let normalized = normalize_header(header);
        if normalized == normalize_header(TABLE_HEADER) {
            canonical.push(TABLE_HEADER);
            saw_table = true;
        } else if normalized == normalize_header(KEYS_HEADER) {
            canonical.push(KEYS_HEADER);
            saw_keys = true;
        } else {
            canonical.push(header);
        }
    }
    if !saw_table || !saw_keys {
        return Err(anyhow!(
            "Manifest must declare '{TABLE_HEADER}' and '{KEYS_HEADER}' columns (found: {})",
            headers.iter().collect::<Vec<_>>().join(", ")
        ));
    }
    Ok(StringRecord::from(canonical))
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_columns_are_split_and_trimmed() {
        assert_eq!(
            split_key_columns("order_id, region ,  sku"),
            vec!["order_id", "region", "sku"]
        );
        assert_eq!(split_key_columns(" , ,"), Vec::<String>::new());
        assert_eq!(split_key_columns(""), Vec::<String>::new());
    }

    #[test]
    fn header_normalization_tolerates_variants() {
        assert_eq!(normalize_header("Table Name"), "tablename");
        assert_eq!(normalize_header("table_name"), "tablename");
        assert_eq!(normalize_header("KEY COLUMNS"), "keycolumns");
    }
}
