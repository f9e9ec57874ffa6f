//! SQL text assembly with quoted identifiers.
//!
//! Table, schema, and column names originate from the user-supplied manifest,
//! so nothing here interpolates a name into query text without double-quote
//! escaping. Values never travel through this module; the only parameterized
//! query (column metadata) binds its inputs server-side.

use anyhow::{Result, anyhow};

/// Declared types for a table's columns, bound as ($1 schema, $2 table).
pub const COLUMN_KINDS: &str = "SELECT column_name, data_type \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(anyhow!("Identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(anyhow!("Identifier contains a NUL byte"));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// A table reference with its schema qualifier resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedTable {
    pub schema: String,
    pub table: String,
}

impl QualifiedTable {
    /// Resolve a manifest table name against the default schema. A name of the
    /// form `schema.table` carries its own qualifier.
    pub fn parse(raw: &str, default_schema: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Table name cannot be empty"));
        }
        let (schema, table) = match trimmed.split_once('.') {
            Some((schema, table)) => (schema.trim(), table.trim()),
            None => (default_schema.trim(), trimmed),
        };
        if schema.is_empty() || table.is_empty() {
            return Err(anyhow!("Malformed table name '{raw}'"));
        }
        Ok(Self {
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }

    /// Quoted `"schema"."table"` form for query text.
    pub fn qualified(&self) -> Result<String> {
        Ok(format!(
            "{}.{}",
            quote_ident(&self.schema)?,
            quote_ident(&self.table)?
        ))
    }

    /// Human-readable `schema.table` form for logs and reports.
    pub fn display(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Filesystem-safe stem for export file names.
    pub fn file_stem(&self) -> String {
        let mut stem = String::with_capacity(self.schema.len() + self.table.len() + 1);
        for ch in self.display().chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                stem.push(ch);
            } else {
                stem.push('_');
            }
        }
        stem
    }
}

pub fn count_query(table: &QualifiedTable) -> Result<String> {
    Ok(format!("SELECT COUNT(*) FROM {}", table.qualified()?))
}

/// Key-column projection with every column cast to text, so rows decode
/// uniformly and NULL survives as NULL.
pub fn projection_query(table: &QualifiedTable, columns: &[String]) -> Result<String> {
    if columns.is_empty() {
        return Err(anyhow!("Projection requires at least one column"));
    }
    let mut select_list = Vec::with_capacity(columns.len());
    for column in columns {
        let quoted = quote_ident(column)?;
        select_list.push(format!("{quoted}::text"));
    }
    Ok(format!(
        "SELECT {} FROM {}",
        select_list.join(", "),
        table.qualified()?
    ))
}
