use tempfile::tempdir;

use table_audit::{
    compare::TableReport,
    report,
};

fn sample_report() -> TableReport {
    TableReport {
        table: "public.orders".to_string(),
        columns: vec!["order_id".to_string(), "region".to_string()],
        qa_count: 3,
        prod_count: 2,
        qa_only: vec![
            vec![Some("1".to_string()), Some("east".to_string())],
            vec![Some("4".to_string()), None],
        ],
        prod_only: vec![vec![Some("9".to_string()), Some("west".to_string())]],
        null_counts: Vec::new(),
        aggregates: Vec::new(),
    }
}

fn read_csv(path: &std::path::Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .expect("open exported csv");
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (headers, rows)
}

#[test]
fn export_round_trips_rows_and_columns() {
    let temp = tempdir().expect("temp dir");
    let written = report::export_mismatches(&sample_report(), "public_orders", temp.path())
        .expect("export");
    assert_eq!(written.len(), 2);

    let qa_path = temp.path().join("public_orders_qa_only.csv");
    let (headers, rows) = read_csv(&qa_path);
    assert_eq!(headers, vec!["order_id", "region"]);
    assert_eq!(
        rows,
        vec![
            vec!["1".to_string(), "east".to_string()],
            // NULL exports as an empty cell.
            vec!["4".to_string(), String::new()],
        ]
    );

    let prod_path = temp.path().join("public_orders_prod_only.csv");
    let (headers, rows) = read_csv(&prod_path);
    assert_eq!(headers, vec!["order_id", "region"]);
    assert_eq!(rows, vec![vec!["9".to_string(), "west".to_string()]]);
}

#[test]
fn empty_sides_produce_no_files() {
    let temp = tempdir().expect("temp dir");
    let mut clean = sample_report();
    clean.qa_only.clear();
    clean.prod_only.clear();
    let written =
        report::export_mismatches(&clean, "public_orders", temp.path()).expect("export");
    assert!(written.is_empty());
    assert!(!temp.path().join("public_orders_qa_only.csv").exists());
    assert!(!temp.path().join("public_orders_prod_only.csv").exists());
}

#[test]
fn export_creates_the_directory() {
    let temp = tempdir().expect("temp dir");
    let nested = temp.path().join("exports").join("run-1");
    let written =
        report::export_mismatches(&sample_report(), "public_orders", &nested).expect("export");
    assert_eq!(written.len(), 2);
    assert!(nested.join("public_orders_qa_only.csv").exists());
}
