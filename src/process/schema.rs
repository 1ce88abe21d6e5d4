use arrow::{
    array::{Array, StringArray},
    datatypes::DataType,
};
use serde::Serialize;

use crate::config::ColumnNames;
use crate::diagnostics::Diagnostics;
use crate::process::{utils::clean_str, RecordSet};

/// Per-column type and non-null count, as shown in the dataset info.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub inferred_type: DataType,
    pub non_null: usize,
}

/// Summarize every column of the record set.
///
/// Utf8 columns report the narrowest type all of their values would fit, so a column of
/// integers read as text shows up as `Int64`. Already-typed columns report their own type.
pub fn summarize_columns(records: &RecordSet) -> Vec<ColumnSummary> {
    let batch = records.batch();
    batch
        .schema()
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, col)| {
            let inferred_type = match col.as_any().downcast_ref::<StringArray>() {
                Some(sarr) => infer_column_type(sarr),
                None => col.data_type().clone(),
            };
            ColumnSummary {
                name: field.name().clone(),
                inferred_type,
                non_null: col.len() - col.null_count(),
            }
        })
        .collect()
}

/// Infer the narrowest type of a text column from its non-null values.
pub fn infer_column_type(sarr: &StringArray) -> DataType {
    let mut seen = false;
    let (mut all_int, mut all_float, mut all_bool) = (true, true, true);

    for raw in sarr.iter().flatten() {
        let cleaned = clean_str(raw);
        seen = true;
        all_int &= cleaned.parse::<i64>().is_ok();
        all_float &= cleaned.parse::<f64>().is_ok();
        all_bool &= matches!(cleaned.to_ascii_lowercase().as_str(), "true" | "false");
        if !(all_int || all_float || all_bool) {
            return DataType::Utf8;
        }
    }

    if !seen {
        DataType::Null
    } else if all_int {
        DataType::Int64
    } else if all_float {
        DataType::Float64
    } else if all_bool {
        DataType::Boolean
    } else {
        DataType::Utf8
    }
}

/// Which configured columns exist in the loaded header.
///
/// Computed once after loading; chart attempts consult it instead of probing the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnPresence {
    pub registration_date: bool,
    pub district: bool,
    pub company_class: bool,
}

/// Check the configured column names against the actual header.
///
/// Missing required columns (registration date, company class) are warnings; a missing
/// district column is a note. Nothing here halts the run.
pub fn validate_columns(
    records: &RecordSet,
    columns: &ColumnNames,
    diagnostics: &mut Diagnostics,
) -> ColumnPresence {
    let header = records.column_names();
    for required in [&columns.registration_date, &columns.company_class] {
        if !records.has_column(required) {
            diagnostics.warn(format!(
                "Column '{}' not found. Please update to the correct column name from: {:?}",
                required, header
            ));
        }
    }

    let district = records.has_column(&columns.district);
    if !district {
        diagnostics.note(format!(
            "Column '{}' not found. District analysis will be skipped.",
            columns.district
        ));
    }

    ColumnPresence {
        registration_date: records.has_column(&columns.registration_date),
        district,
        company_class: records.has_column(&columns.company_class),
    }
}
