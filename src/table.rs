//! Elastic text-table rendering for report sections.

use std::fmt::Write as _;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(1)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_row(&mut output, headers, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut output, &separator, &widths);
    for row in rows {
        push_row(&mut output, row, &widths);
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn push_row(output: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        let padding = width.saturating_sub(cell.chars().count());
        for _ in 0..padding {
            line.push(' ');
        }
    }
    let _ = writeln!(output, "{}", line.trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_expand_to_widest_cell() {
        let headers = vec!["column".to_string(), "qa".to_string()];
        let rows = vec![vec!["order_id".to_string(), "12".to_string()]];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "column    qa");
        assert_eq!(lines[1], "--------  --");
        assert_eq!(lines[2], "order_id  12");
    }

    #[test]
    fn short_rows_render_without_panic() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec!["x".to_string()]];
        let rendered = render_table(&headers, &rows);
        assert!(rendered.lines().count() == 3);
    }
}
