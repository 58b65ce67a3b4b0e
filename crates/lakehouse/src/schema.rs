// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Record types stored in the employee table and their Arrow schemas.

use crate::columns;
use crate::error::Result;
use arrow_array::{Date32Array, Float64Array, Int32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, FieldRef, Schema, SchemaRef, TimeUnit};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Column names of the employee table
pub mod column {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const AGE: &str = "age";
    pub const CITY: &str = "city";
    pub const SALARY: &str = "salary";
    pub const CREATED_DATE: &str = "created_date";
    pub const SALARY_CATEGORY: &str = "salary_category";
    pub const AGE_GROUP: &str = "age_group";
    pub const PROCESSED_TIMESTAMP: &str = "processed_timestamp";
}

/// Trait for record types that have a fixed Arrow representation
pub trait ForArrow {
    fn for_arrow() -> Vec<FieldRef>;

    fn arrow_schema() -> SchemaRef {
        Arc::new(Schema::new(Self::for_arrow()))
    }
}

/// One row of source data
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub city: String,
    pub salary: f64,
    pub created_date: NaiveDate,
}

impl ForArrow for Employee {
    fn for_arrow() -> Vec<FieldRef> {
        vec![
            Arc::new(Field::new(column::ID, DataType::Int32, true)),
            Arc::new(Field::new(column::NAME, DataType::Utf8, true)),
            Arc::new(Field::new(column::AGE, DataType::Int32, true)),
            Arc::new(Field::new(column::CITY, DataType::Utf8, true)),
            Arc::new(Field::new(column::SALARY, DataType::Float64, true)),
            Arc::new(Field::new(column::CREATED_DATE, DataType::Date32, true)),
        ]
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = DateTime::<Utc>::UNIX_EPOCH.date_naive();
    date.signed_duration_since(epoch).num_days() as i32
}

impl Employee {
    pub fn to_record_batch(rows: &[Employee]) -> Result<RecordBatch> {
        let batch = RecordBatch::try_new(
            Self::arrow_schema(),
            vec![
                Arc::new(Int32Array::from(rows.iter().map(|r| r.id).collect::<Vec<_>>())),
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                )),
                Arc::new(Int32Array::from(rows.iter().map(|r| r.age).collect::<Vec<_>>())),
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.city.as_str()).collect::<Vec<_>>(),
                )),
                Arc::new(Float64Array::from(
                    rows.iter().map(|r| r.salary).collect::<Vec<_>>(),
                )),
                Arc::new(Date32Array::from(
                    rows.iter()
                        .map(|r| days_since_epoch(r.created_date))
                        .collect::<Vec<_>>(),
                )),
            ],
        )?;
        Ok(batch)
    }
}

/// A source row plus the columns derived by the transform step
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEmployee {
    pub employee: Employee,
    pub salary_category: String,
    pub age_group: String,
    pub processed_timestamp: DateTime<Utc>,
}

impl ForArrow for EnrichedEmployee {
    fn for_arrow() -> Vec<FieldRef> {
        let mut fields = Employee::for_arrow();
        fields.extend([
            Arc::new(Field::new(column::SALARY_CATEGORY, DataType::Utf8, false)),
            Arc::new(Field::new(column::AGE_GROUP, DataType::Utf8, false)),
            Arc::new(Field::new(
                column::PROCESSED_TIMESTAMP,
                DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
                false,
            )),
        ]);
        fields
    }
}

impl EnrichedEmployee {
    /// Decode rows from any batches carrying the enriched columns, in batch order.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Vec<EnrichedEmployee>> {
        let mut rows = Vec::new();
        for batch in batches {
            let ids = columns::int32s(batch, column::ID)?;
            let names = columns::strings(batch, column::NAME)?;
            let ages = columns::int32s(batch, column::AGE)?;
            let cities = columns::strings(batch, column::CITY)?;
            let salaries = columns::float64s(batch, column::SALARY)?;
            let created = columns::dates(batch, column::CREATED_DATE)?;
            let salary_categories = columns::strings(batch, column::SALARY_CATEGORY)?;
            let age_groups = columns::strings(batch, column::AGE_GROUP)?;
            let processed = columns::timestamps(batch, column::PROCESSED_TIMESTAMP)?;

            for i in 0..batch.num_rows() {
                rows.push(EnrichedEmployee {
                    employee: Employee {
                        id: ids[i],
                        name: names[i].clone(),
                        age: ages[i],
                        city: cities[i].clone(),
                        salary: salaries[i],
                        created_date: created[i],
                    },
                    salary_category: salary_categories[i].clone(),
                    age_group: age_groups[i].clone(),
                    processed_timestamp: processed[i],
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_conversion() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(days_since_epoch(date), 19372);
        assert_eq!(days_since_epoch(DateTime::<Utc>::UNIX_EPOCH.date_naive()), 0);
    }

    #[test]
    fn test_employee_batch_schema() {
        let rows = vec![Employee {
            id: 7,
            name: "Ada".to_string(),
            age: 41,
            city: "Boston".to_string(),
            salary: 99000.0,
            created_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        }];
        let batch = Employee::to_record_batch(&rows).unwrap();

        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.schema(), Employee::arrow_schema());
        assert_eq!(
            columns::dates(&batch, column::CREATED_DATE).unwrap(),
            vec![NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()]
        );
    }

    #[test]
    fn test_enriched_schema_extends_employee() {
        let names: Vec<String> = EnrichedEmployee::for_arrow()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names.len(), 9);
        assert_eq!(names[..6], ["id", "name", "age", "city", "salary", "created_date"]);
        assert_eq!(
            names[6..],
            ["salary_category", "age_group", "processed_timestamp"]
        );
    }
}
