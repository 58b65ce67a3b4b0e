// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Derived columns: salary tier, age tier, processing timestamp.
//!
//! The tier boundaries live in one place and feed both the plain Rust
//! classifiers and the DataFusion `CASE` expressions applied to the frame.

use crate::error::Result;
use crate::schema::column;
use chrono::{DateTime, Utc};
use datafusion::logical_expr::{Expr, col, lit, when};
use datafusion::prelude::DataFrame;
use datafusion::scalar::ScalarValue;
use std::fmt;

/// Salaries at or above this are `High`
pub const HIGH_SALARY_THRESHOLD: f64 = 75000.0;
/// Salaries at or above this (and below `HIGH_SALARY_THRESHOLD`) are `Medium`
pub const MEDIUM_SALARY_THRESHOLD: f64 = 65000.0;
/// Ages below this are `Young`
pub const YOUNG_AGE_LIMIT: i32 = 30;
/// Ages below this (and at least `YOUNG_AGE_LIMIT`) are `Mid`
pub const MID_AGE_LIMIT: i32 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SalaryCategory {
    High,
    Medium,
    Low,
}

impl SalaryCategory {
    pub fn from_salary(salary: f64) -> Self {
        if salary >= HIGH_SALARY_THRESHOLD {
            Self::High
        } else if salary >= MEDIUM_SALARY_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for SalaryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Young,
    Mid,
    Senior,
}

impl AgeGroup {
    pub fn from_age(age: i32) -> Self {
        if age < YOUNG_AGE_LIMIT {
            Self::Young
        } else if age < MID_AGE_LIMIT {
            Self::Mid
        } else {
            Self::Senior
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Young => "Young",
            Self::Mid => "Mid",
            Self::Senior => "Senior",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `CASE` expression producing the salary tier. Null salaries fall through to `Low`.
pub fn salary_category_expr() -> Result<Expr> {
    let expr = when(
        col(column::SALARY).gt_eq(lit(HIGH_SALARY_THRESHOLD)),
        lit(SalaryCategory::High.as_str()),
    )
    .when(
        col(column::SALARY).gt_eq(lit(MEDIUM_SALARY_THRESHOLD)),
        lit(SalaryCategory::Medium.as_str()),
    )
    .otherwise(lit(SalaryCategory::Low.as_str()))?;
    Ok(expr)
}

/// `CASE` expression producing the age tier. Null ages fall through to `Senior`.
pub fn age_group_expr() -> Result<Expr> {
    let expr = when(
        col(column::AGE).lt(lit(YOUNG_AGE_LIMIT)),
        lit(AgeGroup::Young.as_str()),
    )
    .when(
        col(column::AGE).lt(lit(MID_AGE_LIMIT)),
        lit(AgeGroup::Mid.as_str()),
    )
    .otherwise(lit(AgeGroup::Senior.as_str()))?;
    Ok(expr)
}

fn timestamp_literal(at: DateTime<Utc>) -> Expr {
    lit(ScalarValue::TimestampMicrosecond(
        Some(at.timestamp_micros()),
        Some("UTC".into()),
    ))
}

/// Add the derived columns. Every row of one run shares `processed_at`.
pub fn transform(df: DataFrame, processed_at: DateTime<Utc>) -> Result<DataFrame> {
    let df = df
        .with_column(column::SALARY_CATEGORY, salary_category_expr()?)?
        .with_column(column::AGE_GROUP, age_group_expr()?)?
        .with_column(column::PROCESSED_TIMESTAMP, timestamp_literal(processed_at))?;
    Ok(df)
}
