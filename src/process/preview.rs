use arrow::util::pretty::pretty_format_batches;
use tracing::warn;

use crate::process::{schema::summarize_columns, RecordSet};

/// Print the first `rows` rows, the column list, and per-column type/non-null counts.
///
/// Purely observational: formatting problems are logged and never stop the run.
pub fn print_preview(records: &RecordSet, rows: usize) {
    let head = records.batch().slice(0, rows.min(records.num_rows()));
    println!("\nDataset Preview (first {} rows):", rows);
    match pretty_format_batches(&[head]) {
        Ok(table) => println!("{}", table),
        Err(e) => warn!("could not format preview: {}", e),
    }

    println!("\nColumns in the dataset:");
    println!("{:?}", records.column_names());

    println!("\nDataset Info (data types and non-null counts):");
    print!("{}", format_info(records));
}

/// `df.info()`-style listing: one line per column.
pub fn format_info(records: &RecordSet) -> String {
    let summary = summarize_columns(records);
    let width = summary
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("Column".len());

    let mut out = format!(
        "RangeIndex: {} entries\nData columns (total {} columns):\n",
        records.num_rows(),
        summary.len()
    );
    out.push_str(&format!(
        " #   {:<width$}  Non-Null Count  Dtype\n",
        "Column",
        width = width
    ));
    for (i, col) in summary.iter().enumerate() {
        out.push_str(&format!(
            " {:<3} {:<width$}  {:>5} non-null  {}\n",
            i,
            col.name,
            col.non_null,
            col.inferred_type,
            width = width
        ));
    }
    out
}
