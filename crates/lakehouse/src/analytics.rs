// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Grouped statistics over the employee table.

use crate::catalog::TableIdent;
use crate::columns;
use crate::error::Result;
use crate::schema::column;
use arrow_array::RecordBatch;
use datafusion::prelude::{DataFrame, SessionContext};

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryCategoryStats {
    pub salary_category: String,
    pub count: i64,
    pub avg_salary: f64,
    pub avg_age: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityStats {
    pub city: String,
    pub employee_count: i64,
    pub avg_salary: f64,
}

/// Typed rows plus the batches they were decoded from, kept for display
#[derive(Debug, Clone)]
pub struct Stats<T> {
    pub rows: Vec<T>,
    pub batches: Vec<RecordBatch>,
}

pub async fn total_records(df: DataFrame) -> Result<usize> {
    Ok(df.count().await?)
}

async fn run_sql(ctx: &SessionContext, sql: &str) -> Result<Vec<RecordBatch>> {
    diagnostics::debug!("executing SQL: {sql}", sql: sql);
    Ok(ctx.sql(sql).await?.collect().await?)
}

/// Count, mean salary and mean age per salary tier, ordered by tier name
pub async fn salary_category_stats(
    ctx: &SessionContext,
    ident: &TableIdent,
) -> Result<Stats<SalaryCategoryStats>> {
    let sql = format!(
        r#"
        SELECT
            {category} AS salary_category,
            COUNT(*) AS "count",
            AVG({salary}) AS avg_salary,
            AVG({age}) AS avg_age
        FROM {table}
        GROUP BY {category}
        ORDER BY {category}
        "#,
        category = column::SALARY_CATEGORY,
        salary = column::SALARY,
        age = column::AGE,
        table = ident.table(),
    );
    let batches = run_sql(ctx, &sql).await?;

    let mut rows = Vec::new();
    for batch in &batches {
        let categories = columns::strings(batch, "salary_category")?;
        let counts = columns::int64s(batch, "count")?;
        let salaries = columns::float64s(batch, "avg_salary")?;
        let ages = columns::float64s(batch, "avg_age")?;
        for i in 0..batch.num_rows() {
            rows.push(SalaryCategoryStats {
                salary_category: categories[i].clone(),
                count: counts[i],
                avg_salary: salaries[i],
                avg_age: ages[i],
            });
        }
    }
    Ok(Stats { rows, batches })
}

/// Headcount and mean salary per city, highest mean salary first
pub async fn city_stats(ctx: &SessionContext, ident: &TableIdent) -> Result<Stats<CityStats>> {
    let sql = format!(
        r#"
        SELECT
            {city} AS city,
            COUNT(*) AS employee_count,
            AVG({salary}) AS avg_salary
        FROM {table}
        GROUP BY {city}
        ORDER BY avg_salary DESC, city
        "#,
        city = column::CITY,
        salary = column::SALARY,
        table = ident.table(),
    );
    let batches = run_sql(ctx, &sql).await?;

    let mut rows = Vec::new();
    for batch in &batches {
        let cities = columns::strings(batch, "city")?;
        let counts = columns::int64s(batch, "employee_count")?;
        let salaries = columns::float64s(batch, "avg_salary")?;
        for i in 0..batch.num_rows() {
            rows.push(CityStats {
                city: cities[i].clone(),
                employee_count: counts[i],
                avg_salary: salaries[i],
            });
        }
    }
    Ok(Stats { rows, batches })
}
