//! Grouping and counting over the derived record set.
//!
//! Every function here is pure: it reads the record set and returns the aggregated data for
//! one chart, or an [`AnalysisError`] explaining why that chart has nothing to show.

use arrow::array::{Array, Int32Array, StringArray};
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::charts::data::{
    BarSeries, HeatmapGrid, PieSlice, PieSlices, YearlyDistribution, MONTH_ABBREVIATIONS,
};
use crate::process::{
    convert::{MONTH_COLUMN, YEAR_COLUMN},
    utils::non_blank,
    RecordSet,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{column}' is not {expected}")]
    WrongType {
        column: String,
        expected: &'static str,
    },

    #[error("no data to aggregate: {0}")]
    Empty(String),
}

type Result<T> = core::result::Result<T, AnalysisError>;

fn text_column<'a>(records: &'a RecordSet, column: &str) -> Result<&'a StringArray> {
    if !records.has_column(column) {
        return Err(AnalysisError::MissingColumn(column.to_string()));
    }
    records
        .string_column(column)
        .ok_or_else(|| AnalysisError::WrongType {
            column: column.to_string(),
            expected: "text",
        })
}

fn int_column<'a>(records: &'a RecordSet, column: &str) -> Result<&'a Int32Array> {
    if !records.has_column(column) {
        return Err(AnalysisError::MissingColumn(column.to_string()));
    }
    records
        .int_column(column)
        .ok_or_else(|| AnalysisError::WrongType {
            column: column.to_string(),
            expected: "an integer column",
        })
}

/// Count each distinct non-blank value; most frequent first, ties by value.
pub fn value_counts(values: &StringArray) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for v in values.iter().flatten().filter_map(non_blank) {
        *counts.entry(v).or_default() += 1;
    }
    let mut sorted: Vec<(String, u64)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Count rows per (year, month) and pivot years × months.
pub fn month_year_grid(records: &RecordSet) -> Result<HeatmapGrid> {
    let years = int_column(records, YEAR_COLUMN)?;
    let months = int_column(records, MONTH_COLUMN)?;

    let mut counts: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for (y, m) in years.iter().zip(months.iter()) {
        if let (Some(y), Some(m)) = (y, m) {
            *counts.entry((y, m as u32)).or_default() += 1;
        }
    }
    if counts.is_empty() {
        return Err(AnalysisError::Empty(
            "no rows with a valid year and month".into(),
        ));
    }

    let mut year_axis: Vec<i32> = counts.keys().map(|(y, _)| *y).collect();
    year_axis.dedup();
    let mut month_axis: Vec<u32> = counts.keys().map(|(_, m)| *m).collect();
    month_axis.sort_unstable();
    month_axis.dedup();

    let cells = year_axis
        .iter()
        .map(|y| {
            month_axis
                .iter()
                .map(|m| counts.get(&(*y, *m)).copied())
                .collect()
        })
        .collect();

    Ok(HeatmapGrid {
        years: year_axis,
        months: month_axis,
        cells,
    })
}

/// The `n` most frequent values of `column`, descending.
pub fn top_values(records: &RecordSet, column: &str, n: usize) -> Result<BarSeries> {
    let counts = value_counts(text_column(records, column)?);
    if counts.is_empty() {
        return Err(AnalysisError::Empty(format!("column '{}' has no values", column)));
    }
    let (labels, values) = counts.into_iter().take(n).unzip();
    Ok(BarSeries { labels, values })
}

/// Share of each distinct value of `column`, as pie slices.
pub fn value_shares(records: &RecordSet, column: &str) -> Result<PieSlices> {
    let counts = value_counts(text_column(records, column)?);
    let total: u64 = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Err(AnalysisError::Empty(format!("column '{}' has no values", column)));
    }
    let slices = counts
        .into_iter()
        .map(|(label, count)| PieSlice {
            label,
            count,
            percent: count as f64 * 100.0 / total as f64,
        })
        .collect();
    Ok(PieSlices { slices })
}

/// Registrations per calendar day, grouped by the day's year.
pub fn daily_counts_by_year(records: &RecordSet, date_column: &str) -> Result<YearlyDistribution> {
    if !records.has_column(date_column) {
        return Err(AnalysisError::MissingColumn(date_column.to_string()));
    }
    let dates = records
        .date_column(date_column)
        .ok_or_else(|| AnalysisError::WrongType {
            column: date_column.to_string(),
            expected: "a parsed date column",
        })?;

    let mut per_day = BTreeMap::new();
    for i in 0..dates.len() {
        if dates.is_null(i) {
            continue;
        }
        if let Some(day) = dates.value_as_date(i) {
            *per_day.entry(day).or_insert(0u64) += 1;
        }
    }
    if per_day.is_empty() {
        return Err(AnalysisError::Empty("no rows with a valid date".into()));
    }

    let mut groups: BTreeMap<i32, Vec<u64>> = BTreeMap::new();
    for (day, count) in per_day {
        groups.entry(day.year()).or_default().push(count);
    }
    Ok(YearlyDistribution {
        groups: groups.into_iter().collect(),
    })
}

/// Rows per calendar month across all years: always 12 bars, Jan..Dec.
pub fn month_totals(records: &RecordSet) -> Result<BarSeries> {
    let months = int_column(records, MONTH_COLUMN)?;
    let mut values = vec![0u64; 12];
    for m in months.iter().flatten() {
        if (1..=12).contains(&m) {
            values[(m - 1) as usize] += 1;
        }
    }
    if values.iter().all(|v| *v == 0) {
        return Err(AnalysisError::Empty("no rows with a valid month".into()));
    }
    Ok(BarSeries {
        labels: MONTH_ABBREVIATIONS.iter().map(|m| m.to_string()).collect(),
        values,
    })
}

/// Rows per year, ascending.
pub fn year_totals(records: &RecordSet) -> Result<BarSeries> {
    let years = int_column(records, YEAR_COLUMN)?;
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for y in years.iter().flatten() {
        *counts.entry(y).or_default() += 1;
    }
    if counts.is_empty() {
        return Err(AnalysisError::Empty("no rows with a valid year".into()));
    }
    let (labels, values) = counts
        .into_iter()
        .map(|(y, c)| (y.to_string(), c))
        .unzip();
    Ok(BarSeries { labels, values })
}
