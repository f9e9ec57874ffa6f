//! Typed view of a fetched key-column projection.
//!
//! Every cell travels from the server as SQL text (the projection casts each
//! column to `text`), so rows are `Vec<Option<String>>` with `None` standing
//! for NULL. Declared column types come from `information_schema.columns` and
//! are folded into the coarse [`ColumnKind`] buckets the comparator cares
//! about.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Numeric,
    Boolean,
    Date,
    Timestamp,
    Text,
}

impl ColumnKind {
    /// Fold an `information_schema.columns.data_type` string into a kind.
    /// Unrecognized declared types compare as text.
    pub fn from_declared(data_type: &str) -> Self {
        let lowered = data_type.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "smallint" | "integer" | "bigint" | "int2" | "int4" | "int8" => ColumnKind::Integer,
            "real" | "double precision" | "float4" | "float8" => ColumnKind::Float,
            "boolean" => ColumnKind::Boolean,
            "date" => ColumnKind::Date,
            other if other.starts_with("numeric") || other.starts_with("decimal") => {
                ColumnKind::Numeric
            }
            other if other.starts_with("timestamp") => ColumnKind::Timestamp,
            _ => ColumnKind::Text,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnKind::Integer | ColumnKind::Float | ColumnKind::Numeric
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// One side's key-column projection, fully fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableData {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
