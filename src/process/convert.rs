use arrow::{
    array::{Array, ArrayRef, Date32Array, Date32Builder, Int32Builder, StringArray},
    datatypes::{DataType, Date32Type, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::Datelike;
use std::{collections::BTreeSet, sync::Arc};
use thiserror::Error;
use tracing::{debug, info};

use crate::process::{date_parser::parse_registration_date, RecordSet};

pub const YEAR_COLUMN: &str = "year";
pub const MONTH_COLUMN: &str = "month";

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error("column '{0}' not found, date-related analyses cannot run")]
    MissingColumn(String),

    #[error("error processing '{column}': {reason}")]
    Structural { column: String, reason: String },
}

/// Outcome of date derivation, reported once after the columns are added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateDerivation {
    pub unique_years: Vec<i32>,
    pub missing_dates: usize,
}

/// Parse `date_column` into `Date32` and append `year` and `month` columns.
///
/// Values that match none of `formats` become nulls in all three columns, so every row keeps
/// either a full (year, month) pair or neither. The row count never changes.
#[tracing::instrument(level = "info", skip(records, formats))]
pub fn derive_date_fields<S: AsRef<str>>(
    records: &mut RecordSet,
    date_column: &str,
    formats: &[S],
) -> Result<DateDerivation, DeriveError> {
    let batch = records.batch();
    let idx = batch
        .schema()
        .index_of(date_column)
        .map_err(|_| DeriveError::MissingColumn(date_column.to_string()))?;

    let col = batch.column(idx);
    let dates: Date32Array = match col.data_type() {
        DataType::Utf8 => {
            let sarr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| structural(date_column, "Utf8 column is not a StringArray"))?;
            let mut b = Date32Builder::with_capacity(sarr.len());
            for opt in sarr.iter() {
                let parsed = opt.and_then(|s| parse_registration_date(s, formats));
                b.append_option(parsed.map(Date32Type::from_naive_date));
            }
            b.finish()
        }
        // already derived on an earlier pass
        DataType::Date32 => col
            .as_any()
            .downcast_ref::<Date32Array>()
            .cloned()
            .ok_or_else(|| structural(date_column, "Date32 column is not a Date32Array"))?,
        other => {
            return Err(structural(
                date_column,
                &format!("expected a text column, found {}", other),
            ))
        }
    };

    let mut years = Int32Builder::with_capacity(dates.len());
    let mut months = Int32Builder::with_capacity(dates.len());
    let mut unique_years = BTreeSet::new();
    for i in 0..dates.len() {
        match dates.is_valid(i).then(|| dates.value_as_date(i)).flatten() {
            Some(d) => {
                unique_years.insert(d.year());
                years.append_value(d.year());
                months.append_value(d.month() as i32);
            }
            None => {
                years.append_null();
                months.append_null();
            }
        }
    }
    let missing_dates = dates.null_count();

    // rebuild: replace the date column, drop any stale year/month, append the derived pair
    let mut fields: Vec<Field> = Vec::with_capacity(batch.num_columns() + 2);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns() + 2);
    for (i, (field, arr)) in batch
        .schema()
        .fields()
        .iter()
        .zip(batch.columns())
        .enumerate()
    {
        if i == idx {
            fields.push(Field::new(date_column, DataType::Date32, true));
            columns.push(Arc::new(dates.clone()) as ArrayRef);
        } else if field.name() != YEAR_COLUMN && field.name() != MONTH_COLUMN {
            fields.push(field.as_ref().clone());
            columns.push(arr.clone());
        } else {
            debug!(column = %field.name(), "replacing existing derived column");
        }
    }
    fields.push(Field::new(YEAR_COLUMN, DataType::Int32, true));
    columns.push(Arc::new(years.finish()) as ArrayRef);
    fields.push(Field::new(MONTH_COLUMN, DataType::Int32, true));
    columns.push(Arc::new(months.finish()) as ArrayRef);

    let rebuilt = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .map_err(|e| structural(date_column, &e.to_string()))?;
    records.replace_batch(rebuilt);

    let derivation = DateDerivation {
        unique_years: unique_years.into_iter().collect(),
        missing_dates,
    };
    info!("Date preprocessing successful.");
    info!("Unique years: {:?}", derivation.unique_years);
    info!("Missing dates: {}", derivation.missing_dates);
    Ok(derivation)
}

fn structural(column: &str, reason: &str) -> DeriveError {
    DeriveError::Structural {
        column: column.to_string(),
        reason: reason.to_string(),
    }
}
