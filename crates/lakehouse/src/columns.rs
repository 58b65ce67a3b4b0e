// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Typed column access for batches coming back from DataFusion or Delta.
//!
//! Query results may carry `Utf8View`, `Int32` vs `Int64` counts, and so on
//! depending on the scan path. Every accessor casts to one canonical type
//! before downcasting, so callers see a single representation.

use crate::error::{LakehouseError, Result};
use arrow::compute::cast;
use arrow_array::cast::AsArray;
use arrow_array::types::{Date32Type, Float64Type, Int32Type, Int64Type, TimestampMicrosecondType};
use arrow_array::{Array, ArrayRef, RecordBatch};
use arrow_schema::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDate, Utc};

fn column_as(batch: &RecordBatch, name: &str, data_type: &DataType) -> Result<ArrayRef> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| LakehouseError::MissingColumn {
            column: name.to_string(),
        })?;
    Ok(cast(column, data_type)?)
}

fn null_at(name: &str, row: usize) -> LakehouseError {
    LakehouseError::NullValue {
        column: name.to_string(),
        row,
    }
}

/// Non-null strings of a column
pub(crate) fn strings(batch: &RecordBatch, name: &str) -> Result<Vec<String>> {
    let array = column_as(batch, name, &DataType::Utf8)?;
    let array = array.as_string::<i32>();
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Err(null_at(name, i))
            } else {
                Ok(array.value(i).to_string())
            }
        })
        .collect()
}

pub(crate) fn int32s(batch: &RecordBatch, name: &str) -> Result<Vec<i32>> {
    let array = column_as(batch, name, &DataType::Int32)?;
    let array = array.as_primitive::<Int32Type>();
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Err(null_at(name, i))
            } else {
                Ok(array.value(i))
            }
        })
        .collect()
}

pub(crate) fn int64s(batch: &RecordBatch, name: &str) -> Result<Vec<i64>> {
    let array = column_as(batch, name, &DataType::Int64)?;
    let array = array.as_primitive::<Int64Type>();
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Err(null_at(name, i))
            } else {
                Ok(array.value(i))
            }
        })
        .collect()
}

pub(crate) fn float64s(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    let array = column_as(batch, name, &DataType::Float64)?;
    let array = array.as_primitive::<Float64Type>();
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Err(null_at(name, i))
            } else {
                Ok(array.value(i))
            }
        })
        .collect()
}

pub(crate) fn dates(batch: &RecordBatch, name: &str) -> Result<Vec<NaiveDate>> {
    let array = column_as(batch, name, &DataType::Date32)?;
    let array = array.as_primitive::<Date32Type>();
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                return Err(null_at(name, i));
            }
            array.value_as_date(i).ok_or_else(|| null_at(name, i))
        })
        .collect()
}

pub(crate) fn timestamps(batch: &RecordBatch, name: &str) -> Result<Vec<DateTime<Utc>>> {
    let array = column_as(
        batch,
        name,
        &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
    )?;
    let array = array.as_primitive::<TimestampMicrosecondType>();
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                return Err(null_at(name, i));
            }
            DateTime::from_timestamp_micros(array.value(i)).ok_or_else(|| null_at(name, i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Int64Array, StringArray, StringViewArray};
    use arrow_schema::{Field, Schema};
    use std::sync::Arc;

    #[test]
    fn test_string_view_is_normalized() {
        let schema = Arc::new(Schema::new(vec![Field::new("city", DataType::Utf8View, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringViewArray::from(vec!["Chicago", "Phoenix"]))],
        )
        .unwrap();

        assert_eq!(strings(&batch, "city").unwrap(), vec!["Chicago", "Phoenix"]);
    }

    #[test]
    fn test_int64_count_casts_down() {
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![2_i64, 3]))]).unwrap();

        assert_eq!(int32s(&batch, "n").unwrap(), vec![2, 3]);
        assert_eq!(float64s(&batch, "n").unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_missing_column_and_null() {
        let schema = Arc::new(Schema::new(vec![Field::new("name", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec![Some("a"), None]))],
        )
        .unwrap();

        assert!(matches!(
            strings(&batch, "nope"),
            Err(LakehouseError::MissingColumn { .. })
        ));
        assert!(matches!(
            strings(&batch, "name"),
            Err(LakehouseError::NullValue { row: 1, .. })
        ));
    }
}
