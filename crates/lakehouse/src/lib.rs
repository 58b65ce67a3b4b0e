// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Lakehouse - a demonstration ETL job over a Delta Lake warehouse
//!
//! The job builds a small employee dataset, derives salary and age tiers,
//! replaces a managed Delta table with the result, reads it back for grouped
//! statistics, and reports the table's commit history.
//!
//! Set LAKEHOUSE_LOG to control logging (see the `diagnostics` crate).

pub mod analytics;
pub mod catalog;
mod columns;
pub mod config;
pub mod error;
pub mod job;
pub mod metadata;
pub mod sample;
pub mod schema;
pub mod table;
pub mod transform;

pub use catalog::{Catalog, TableIdent};
pub use config::{ConfigOverrides, JobConfig};
pub use error::{LakehouseError, Result};
pub use job::{EtlJob, JobArgs, JobReport, JobRun};
pub use schema::{Employee, EnrichedEmployee, ForArrow};
pub use table::CommitMetadata;
pub use transform::{AgeGroup, SalaryCategory};
