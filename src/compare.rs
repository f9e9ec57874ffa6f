//! The table comparison procedure.
//!
//! Pure functions over two fully-fetched key-column projections: the
//! one-sided key diff, per-column null counts, and per-numeric-column
//! sum/mean. Nothing here touches a connection, which keeps the whole
//! procedure testable without a database.
//!
//! The key diff compares key *presence*, not full-row equality: the
//! projection is exactly the declared key columns, so a row appearing in both
//! sides has nothing further to compare. That scope limit is inherited from
//! the original tool and documented rather than widened.

use std::collections::HashSet;
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use rust_decimal::Decimal;

use crate::model::{ColumnKind, TableData};

/// Everything reported for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub table: String,
    pub columns: Vec<String>,
    pub qa_count: i64,
    pub prod_count: i64,
    pub qa_only: Vec<Vec<Option<String>>>,
    pub prod_only: Vec<Vec<Option<String>>>,
    pub null_counts: Vec<NullCount>,
    pub aggregates: Vec<AggregateRow>,
}

impl TableReport {
    pub fn counts_match(&self) -> bool {
        self.qa_count == self.prod_count
    }

    pub fn has_key_mismatch(&self) -> bool {
        !self.qa_only.is_empty() || !self.prod_only.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.counts_match() && !self.has_key_mismatch()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullCount {
    pub column: String,
    pub qa_nulls: usize,
    pub prod_nulls: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub column: String,
    pub qa: SideAggregate,
    pub prod: SideAggregate,
}

/// Sum and mean over one side's non-null cells in a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct SideAggregate {
    pub count: usize,
    pub sum: AggValue,
    pub mean: Option<AggValue>,
}

/// Exact decimal for integer/numeric columns, f64 for float columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggValue {
    Decimal(Decimal),
    Float(f64),
}

impl AggValue {
    pub fn render(&self) -> String {
        match self {
            AggValue::Decimal(value) => value.normalize().to_string(),
            AggValue::Float(value) => format_float(*value),
        }
    }
}

/// Assemble the full per-table report from both fetched sides.
pub fn build_report(
    table: String,
    qa_count: i64,
    prod_count: i64,
    qa: &TableData,
    prod: &TableData,
) -> Result<TableReport> {
    if qa.column_names() != prod.column_names() {
        bail!(
            "Projection columns differ between sides: QA {:?} vs Prod {:?}",
            qa.column_names(),
            prod.column_names()
        );
    }
    let (qa_only, prod_only) = key_diff(qa, prod);
    let null_counts = null_counts(qa, prod);
    let aggregates = aggregates(qa, prod)?;
    Ok(TableReport {
        table,
        columns: qa.column_names(),
        qa_count,
        prod_count,
        qa_only,
        prod_only,
        null_counts,
        aggregates,
    })
}

/// One-sided sets of the full outer comparison on the key tuple. A row lands
/// in `qa_only` when its tuple never appears on the Prod side, and
/// symmetrically. Occurrence order and duplicates are preserved.
pub fn key_diff(
    qa: &TableData,
    prod: &TableData,
) -> (Vec<Vec<Option<String>>>, Vec<Vec<Option<String>>>) {
    let qa_keys: HashSet<&[Option<String>]> = qa.rows.iter().map(|row| row.as_slice()).collect();
    let prod_keys: HashSet<&[Option<String>]> =
        prod.rows.iter().map(|row| row.as_slice()).collect();

    let qa_only = qa
        .rows
        .iter()
        .filter(|row| !prod_keys.contains(row.as_slice()))
        .cloned()
        .collect();
    let prod_only = prod
        .rows
        .iter()
        .filter(|row| !qa_keys.contains(row.as_slice()))
        .cloned()
        .collect();
    (qa_only, prod_only)
}

/// NULL cells per projected column, each side counted independently.
pub fn null_counts(qa: &TableData, prod: &TableData) -> Vec<NullCount> {
    qa.columns
        .iter()
        .enumerate()
        .map(|(idx, column)| NullCount {
            column: column.name.clone(),
            qa_nulls: count_nulls(&qa.rows, idx),
            prod_nulls: count_nulls(&prod.rows, idx),
        })
        .collect()
}

fn count_nulls(rows: &[Vec<Option<String>>], idx: usize) -> usize {
    rows.iter()
        .filter(|row| matches!(row.get(idx), Some(None)))
        .count()
}

/// Sum and mean per declared-numeric column, each side computed independently
/// from the fetched projection. Non-numeric columns are skipped.
pub fn aggregates(qa: &TableData, prod: &TableData) -> Result<Vec<AggregateRow>> {
    let mut rows = Vec::new();
    for (idx, column) in qa.columns.iter().enumerate() {
        if !column.kind.is_numeric() {
            continue;
        }
        rows.push(AggregateRow {
            column: column.name.clone(),
            qa: side_aggregate(&column.name, column.kind, &qa.rows, idx)?,
            prod: side_aggregate(&column.name, column.kind, &prod.rows, idx)?,
        });
    }
    Ok(rows)
}

fn side_aggregate(
    column: &str,
    kind: ColumnKind,
    rows: &[Vec<Option<String>>],
    idx: usize,
) -> Result<SideAggregate> {
    let mut accumulator = NumericAccumulator::new(kind);
    for row in rows {
        if let Some(Some(raw)) = row.get(idx) {
            accumulator.ingest(column, raw)?;
        }
    }
    accumulator.finish(column)
}

struct NumericAccumulator {
    kind: ColumnKind,
    count: usize,
    decimal_sum: Decimal,
    float_sum: f64,
}

impl NumericAccumulator {
    fn new(kind: ColumnKind) -> Self {
        Self {
            kind,
            count: 0,
            decimal_sum: Decimal::ZERO,
            float_sum: 0.0,
        }
    }

    fn ingest(&mut self, column: &str, raw: &str) -> Result<()> {
        let trimmed = raw.trim();
        match self.kind {
            ColumnKind::Float => {
                let value = trimmed.parse::<f64>().map_err(|_| {
                    anyhow!("Column '{column}': cannot parse '{raw}' as a float value")
                })?;
                self.float_sum += value;
            }
            _ => {
                let value = parse_decimal(trimmed).ok_or_else(|| {
                    anyhow!("Column '{column}': cannot parse '{raw}' as a numeric value")
                })?;
                self.decimal_sum = self
                    .decimal_sum
                    .checked_add(value)
                    .ok_or_else(|| anyhow!("Column '{column}': sum overflowed"))?;
            }
        }
        self.count += 1;
        Ok(())
    }

    fn finish(self, column: &str) -> Result<SideAggregate> {
        let (sum, mean) = match self.kind {
            ColumnKind::Float => {
                let mean = (self.count > 0).then(|| AggValue::Float(self.float_sum / self.count as f64));
                (AggValue::Float(self.float_sum), mean)
            }
            _ => {
                let mean = if self.count > 0 {
                    let divided = self
                        .decimal_sum
                        .checked_div(Decimal::from(self.count as u64))
                        .ok_or_else(|| anyhow!("Column '{column}': mean overflowed"))?;
                    Some(AggValue::Decimal(divided))
                } else {
                    None
                };
                (AggValue::Decimal(self.decimal_sum), mean)
            }
        };
        Ok(SideAggregate {
            count: self.count,
            sum,
            mean,
        })
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}
