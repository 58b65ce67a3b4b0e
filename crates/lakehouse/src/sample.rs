// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Fixed demonstration dataset.

use crate::error::{LakehouseError, Result};
use crate::schema::Employee;
use arrow_array::RecordBatch;
use chrono::NaiveDate;

const SAMPLE_ROWS: [(i32, &str, i32, &str, f64, &str); 5] = [
    (1, "John Doe", 30, "New York", 75000.0, "2023-01-15"),
    (2, "Jane Smith", 25, "Los Angeles", 65000.0, "2023-02-20"),
    (3, "Mike Johnson", 35, "Chicago", 80000.0, "2023-03-10"),
    (4, "Sarah Wilson", 28, "Houston", 70000.0, "2023-04-05"),
    (5, "David Brown", 32, "Phoenix", 72000.0, "2023-05-12"),
];

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| LakehouseError::InvalidDate {
        value: value.to_string(),
    })
}

pub fn sample_employees() -> Result<Vec<Employee>> {
    SAMPLE_ROWS
        .iter()
        .map(|&(id, name, age, city, salary, created)| {
            Ok(Employee {
                id,
                name: name.to_string(),
                age,
                city: city.to_string(),
                salary,
                created_date: parse_date(created)?,
            })
        })
        .collect()
}

/// The sample dataset as a single batch
pub fn sample_batch() -> Result<RecordBatch> {
    Employee::to_record_batch(&sample_employees()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_five_rows() {
        let rows = sample_employees().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].name, "Mike Johnson");
        assert_eq!(rows[2].created_date, NaiveDate::from_ymd_opt(2023, 3, 10).unwrap());
        assert_eq!(sample_batch().unwrap().num_rows(), 5);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2023-13-01").is_err());
        assert!(matches!(
            parse_date("15/01/2023"),
            Err(LakehouseError::InvalidDate { .. })
        ));
    }
}
