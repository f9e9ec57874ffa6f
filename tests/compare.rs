use std::collections::HashSet;

use proptest::prelude::*;
use rust_decimal::Decimal;

use table_audit::{
    compare::{self, AggValue},
    model::{ColumnKind, ColumnMeta, TableData},
};

fn keyed_side(names: &[&str], rows: &[&[Option<&str>]]) -> TableData {
    let columns = names
        .iter()
        .map(|name| ColumnMeta::new(*name, ColumnKind::Text))
        .collect();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.map(str::to_string)).collect())
        .collect();
    TableData::new(columns, rows)
}

fn integer_side(values: &[i64]) -> TableData {
    let columns = vec![ColumnMeta::new("id", ColumnKind::Integer)];
    let rows = values
        .iter()
        .map(|value| vec![Some(value.to_string())])
        .collect();
    TableData::new(columns, rows)
}

// The scenario from the tool's contract: equal counts and key drift are
// independent signals.
#[test]
fn count_match_with_key_drift() {
    let qa = keyed_side(
        &["id", "name"],
        &[&[Some("1"), Some("a")], &[Some("2"), Some("b")]],
    );
    let prod = keyed_side(
        &["id", "name"],
        &[&[Some("2"), Some("b")], &[Some("3"), Some("c")]],
    );
    let report = compare::build_report("public.t".to_string(), 2, 2, &qa, &prod).expect("report");

    assert!(report.counts_match());
    assert_eq!(
        report.qa_only,
        vec![vec![Some("1".to_string()), Some("a".to_string())]]
    );
    assert_eq!(
        report.prod_only,
        vec![vec![Some("3".to_string()), Some("c".to_string())]]
    );
}

#[test]
fn identical_sides_produce_a_clean_report() {
    let qa = keyed_side(&["id"], &[&[Some("1")], &[Some("2")]]);
    let report = compare::build_report("public.t".to_string(), 2, 2, &qa, &qa).expect("report");
    assert!(report.is_clean());
    assert!(report.qa_only.is_empty());
    assert!(report.prod_only.is_empty());
}

#[test]
fn null_count_is_total_minus_non_null() {
    let qa = keyed_side(
        &["code"],
        &[&[Some("x")], &[None], &[None], &[Some("y")], &[None]],
    );
    let prod = keyed_side(&["code"], &[&[Some("x")], &[Some("y")]]);
    let report = compare::build_report("public.t".to_string(), 5, 2, &qa, &prod).expect("report");
    // 5 total rows, 2 non-null on the QA side.
    assert_eq!(report.null_counts[0].qa_nulls, 5 - 2);
    assert_eq!(report.null_counts[0].prod_nulls, 0);
}

#[test]
fn aggregates_match_direct_computation() {
    let columns = vec![ColumnMeta::new("amount", ColumnKind::Numeric)];
    let qa_values = ["10.25", "0.75", "4.00"];
    let qa = TableData::new(
        columns.clone(),
        qa_values
            .iter()
            .map(|v| vec![Some(v.to_string())])
            .collect(),
    );
    let prod = TableData::new(columns, vec![vec![Some("15.00".to_string())]]);

    let rows = compare::aggregates(&qa, &prod).expect("aggregates");
    let expected_sum: Decimal = qa_values.iter().map(|v| v.parse::<Decimal>().unwrap()).sum();
    let expected_mean = expected_sum / Decimal::from(qa_values.len() as u64);

    assert_eq!(rows[0].qa.sum, AggValue::Decimal(expected_sum));
    assert_eq!(rows[0].qa.mean, Some(AggValue::Decimal(expected_mean)));
    assert_eq!(rows[0].prod.sum, AggValue::Decimal(Decimal::new(1500, 2)));
}

proptest! {
    // Full outer comparison partition: every row lands on its own side's
    // mismatch set exactly when its key is absent from the other side, and
    // never on both sides.
    #[test]
    fn key_diff_partitions_rows(
        qa_values in proptest::collection::vec(0i64..20, 0..40),
        prod_values in proptest::collection::vec(0i64..20, 0..40),
    ) {
        let qa = integer_side(&qa_values);
        let prod = integer_side(&prod_values);
        let (qa_only, prod_only) = compare::key_diff(&qa, &prod);

        let qa_set: HashSet<i64> = qa_values.iter().copied().collect();
        let prod_set: HashSet<i64> = prod_values.iter().copied().collect();

        let expected_qa_only = qa_values
            .iter()
            .filter(|value| !prod_set.contains(value))
            .count();
        let expected_prod_only = prod_values
            .iter()
            .filter(|value| !qa_set.contains(value))
            .count();
        prop_assert_eq!(qa_only.len(), expected_qa_only);
        prop_assert_eq!(prod_only.len(), expected_prod_only);

        for row in &qa_only {
            let key: i64 = row[0].as_deref().unwrap().parse().unwrap();
            prop_assert!(qa_set.contains(&key));
            prop_assert!(!prod_set.contains(&key));
        }
        for row in &prod_only {
            let key: i64 = row[0].as_deref().unwrap().parse().unwrap();
            prop_assert!(prod_set.contains(&key));
            prop_assert!(!qa_set.contains(&key));
        }

        let qa_only_keys: HashSet<i64> = qa_only
            .iter()
            .map(|row| row[0].as_deref().unwrap().parse().unwrap())
            .collect();
        let prod_only_keys: HashSet<i64> = prod_only
            .iter()
            .map(|row| row[0].as_deref().unwrap().parse().unwrap())
            .collect();
        prop_assert!(qa_only_keys.is_disjoint(&prod_only_keys));
    }

    // Null counts and aggregates always agree with a direct pass over the
    // fetched cells.
    #[test]
    fn null_counts_match_direct_scan(
        qa_cells in proptest::collection::vec(proptest::option::of(0i64..100), 0..60),
        prod_cells in proptest::collection::vec(proptest::option::of(0i64..100), 0..60),
    ) {
        let to_side = |cells: &[Option<i64>]| {
            TableData::new(
                vec![ColumnMeta::new("v", ColumnKind::Integer)],
                cells.iter().map(|c| vec![c.map(|v| v.to_string())]).collect(),
            )
        };
        let qa = to_side(&qa_cells);
        let prod = to_side(&prod_cells);

        let counts = compare::null_counts(&qa, &prod);
        prop_assert_eq!(counts[0].qa_nulls, qa_cells.iter().filter(|c| c.is_none()).count());
        prop_assert_eq!(counts[0].prod_nulls, prod_cells.iter().filter(|c| c.is_none()).count());

        let rows = compare::aggregates(&qa, &prod).unwrap();
        let qa_sum: i64 = qa_cells.iter().flatten().sum();
        prop_assert_eq!(rows[0].qa.sum, AggValue::Decimal(Decimal::from(qa_sum)));
    }
}
