//! Fetch layer: the queries one comparison issues against a live connection.

use anyhow::{Context, Result, anyhow};
use postgres::Client;

use crate::{
    model::{ColumnKind, ColumnMeta, TableData},
    sql::{self, QualifiedTable},
};

/// Declared kinds for every column of a table, in ordinal order. An empty
/// result means the table does not exist in that side's schema.
pub fn column_kinds(client: &mut Client, table: &QualifiedTable) -> Result<Vec<(String, ColumnKind)>> {
    let rows = client
        .query(sql::COLUMN_KINDS, &[&table.schema, &table.table])
        .with_context(|| format!("Reading column metadata for {}", table.display()))?;
    let mut kinds = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.try_get(0)?;
        let declared: String = row.try_get(1)?;
        kinds.push((name, ColumnKind::from_declared(&declared)));
    }
    Ok(kinds)
}

/// Resolve the declared key columns against both sides' metadata. Every key
/// must exist on both sides for the outer-join comparison to be meaningful;
/// the kind (and canonical casing) comes from the QA side.
pub fn resolve_key_columns(
    declared: &[String],
    qa: &[(String, ColumnKind)],
    prod: &[(String, ColumnKind)],
) -> Result<Vec<ColumnMeta>> {
    let mut resolved = Vec::with_capacity(declared.len());
    for name in declared {
        let (qa_name, kind) = find_column(qa, name)
            .ok_or_else(|| anyhow!("Key column '{name}' not found on the QA side"))?;
        find_column(prod, name)
            .ok_or_else(|| anyhow!("Key column '{name}' not found on the Prod side"))?;
        resolved.push(ColumnMeta::new(qa_name.clone(), *kind));
    }
    Ok(resolved)
}

fn find_column<'a>(
    columns: &'a [(String, ColumnKind)],
    name: &str,
) -> Option<&'a (String, ColumnKind)> {
    columns
        .iter()
        .find(|(candidate, _)| candidate == name)
        .or_else(|| {
            columns
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        })
}

pub fn row_count(client: &mut Client, table: &QualifiedTable) -> Result<i64> {
    let query = sql::count_query(table)?;
    let row = client
        .query_one(&query, &[])
        .with_context(|| format!("Counting rows in {}", table.display()))?;
    Ok(row.try_get(0)?)
}

/// Fetch the key-column projection, every cell as text.
pub fn fetch_projection(
    client: &mut Client,
    table: &QualifiedTable,
    columns: &[ColumnMeta],
) -> Result<TableData> {
    let names = columns.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
    let query = sql::projection_query(table, &names)?;
    let fetched = client
        .query(&query, &[])
        .with_context(|| format!("Fetching key projection from {}", table.display()))?;

    let mut rows = Vec::with_capacity(fetched.len());
    for row in &fetched {
        let mut cells = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            cells.push(row.try_get::<_, Option<String>>(idx)?);
        }
        rows.push(cells);
    }
    Ok(TableData::new(columns.to_vec(), rows))
}
