// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The five-step ETL job: sample data, transform, write, analyze, inspect.

use crate::analytics::{self, CityStats, SalaryCategoryStats};
use crate::catalog::{Catalog, TableIdent};
use crate::config::JobConfig;
use crate::error::{LakehouseError, Result};
use crate::metadata::{self, HistoryEntry, SnapshotEntry};
use crate::sample;
use crate::table::{self, CommitMetadata};
use crate::transform;
use arrow::util::pretty::pretty_format_batches;
use arrow_array::RecordBatch;
use chrono::{DateTime, Utc};
use datafusion::prelude::SessionContext;
use std::io::Write;
use std::time::{Duration, Instant};

/// Arguments resolved from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobArgs {
    pub job_name: String,
}

impl JobArgs {
    pub fn new(job_name: impl Into<String>) -> Result<Self> {
        let job_name = job_name.into();
        if job_name.trim().is_empty() {
            return Err(LakehouseError::Config {
                message: "job name cannot be empty".to_string(),
            });
        }
        Ok(Self { job_name })
    }
}

/// One execution of a named job
#[derive(Debug, Clone)]
pub struct JobRun {
    pub job_name: String,
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl JobRun {
    pub fn start(args: &JobArgs) -> Self {
        let run = Self {
            job_name: args.job_name.clone(),
            run_id: uuid7::uuid7().to_string(),
            started_at: Utc::now(),
            started: Instant::now(),
        };
        diagnostics::info!(
            "job {job_name} run {run_id} started",
            job_name: run.job_name.as_str(),
            run_id: run.run_id.as_str()
        );
        run
    }

    pub fn commit_metadata(&self) -> CommitMetadata {
        CommitMetadata::new(self.job_name.as_str(), self.run_id.as_str())
    }

    /// Mark the run finished and return its wall-clock duration
    pub fn commit(&self) -> Duration {
        let elapsed = self.started.elapsed();
        diagnostics::info!(
            "job {job_name} run {run_id} committed after {duration_ms}ms",
            job_name: self.job_name.as_str(),
            run_id: self.run_id.as_str(),
            duration_ms: elapsed.as_millis() as u64
        );
        elapsed
    }
}

/// Row count observed when reading an earlier table version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTravelRead {
    pub version: i64,
    pub rows: usize,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_name: String,
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub table: TableIdent,
    pub source_rows: usize,
    pub written_version: i64,
    pub total_records: usize,
    pub salary_stats: Vec<SalaryCategoryStats>,
    pub city_stats: Vec<CityStats>,
    pub history: Vec<HistoryEntry>,
    pub snapshots: Vec<SnapshotEntry>,
    pub time_travel: Option<TimeTravelRead>,
    pub duration: Duration,
}

/// Render batches as a text table, or a placeholder when there are no rows
pub fn show<W: Write>(out: &mut W, batches: &[RecordBatch]) -> Result<()> {
    if batches.iter().all(|b| b.num_rows() == 0) {
        writeln!(out, "(no rows)")?;
        return Ok(());
    }
    writeln!(out, "{}", pretty_format_batches(batches)?)?;
    Ok(())
}

pub struct EtlJob {
    run: JobRun,
    catalog: Catalog,
    ident: TableIdent,
    processed_at: Option<DateTime<Utc>>,
}

impl EtlJob {
    pub fn new(config: &JobConfig, args: &JobArgs) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            run: JobRun::start(args),
            catalog: Catalog::new(&config.warehouse)?,
            ident: config.table_ident()?,
            processed_at: None,
        })
    }

    /// Pin the processing timestamp instead of taking the clock at step 2
    pub fn with_processed_at(mut self, at: DateTime<Utc>) -> Self {
        self.processed_at = Some(at);
        self
    }

    pub fn run_info(&self) -> &JobRun {
        &self.run
    }

    /// Run every step. Any failure is logged and reported once, then returned.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<JobReport> {
        match self.run_steps(out).await {
            Ok(report) => Ok(report),
            Err(err) => {
                let message = err.to_string();
                diagnostics::error!("Error in ETL job: {message}", message: message.as_str());
                // Reporting is best effort
                _ = writeln!(out, "Error in ETL job: {}", message);
                Err(err)
            }
        }
    }

    async fn run_steps<W: Write>(&self, out: &mut W) -> Result<JobReport> {
        writeln!(
            out,
            "Starting ETL job {} (run {}, started {})...",
            self.run.job_name,
            self.run.run_id,
            self.run.started_at.to_rfc3339()
        )?;
        let ctx = SessionContext::new();
        let table_name = self.ident.to_string();

        // Step 1
        writeln!(out, "Step 1: Creating sample data...")?;
        diagnostics::info!("step 1: creating sample data");
        let source = sample::sample_batch()?;
        let source_rows = source.num_rows();
        show(out, std::slice::from_ref(&source))?;

        // Step 2
        writeln!(out, "Step 2: Transforming data...")?;
        diagnostics::info!("step 2: transforming {rows} rows", rows: source_rows);
        let processed_at = self.processed_at.unwrap_or_else(Utc::now);
        let transformed = transform::transform(ctx.read_batch(source)?, processed_at)?
            .collect()
            .await?;
        show(out, &transformed)?;

        // Step 3
        writeln!(out, "Step 3: Writing to Delta table...")?;
        diagnostics::info!("step 3: writing {table}", table: table_name.as_str());
        self.catalog
            .create_database_if_not_exists(self.ident.database())?;
        let written = table::create_or_replace(
            &self.catalog,
            &self.ident,
            transformed,
            &self.run.commit_metadata(),
        )
        .await?;
        let written_version = table::current_version(&written).unwrap_or(0);
        writeln!(
            out,
            "Data written to table: {} (version {})",
            self.ident, written_version
        )?;

        // Step 4
        writeln!(out, "Step 4: Reading back and performing analytics...")?;
        diagnostics::info!("step 4: analytics on {table}", table: table_name.as_str());
        let df = table::read_table(&ctx, &self.catalog, &self.ident).await?;

        writeln!(out, "=== Data Analytics ===")?;
        let total_records = analytics::total_records(df).await?;
        writeln!(out, "Total records: {}", total_records)?;

        let salary = analytics::salary_category_stats(&ctx, &self.ident).await?;
        writeln!(out, "Salary Category Statistics:")?;
        show(out, &salary.batches)?;

        let city = analytics::city_stats(&ctx, &self.ident).await?;
        writeln!(out, "City Statistics:")?;
        show(out, &city.batches)?;

        // Step 5
        writeln!(out, "Step 5: Demonstrating time travel...")?;
        diagnostics::info!("step 5: history and snapshots of {table}", table: table_name.as_str());
        let current = self.catalog.load_table(&self.ident).await?;
        let commits = metadata::versioned_commits(&current).await?;
        let history = metadata::history_entries(&commits);
        let snapshots = metadata::snapshot_entries(&commits)?;

        writeln!(out, "Table History:")?;
        show(out, &[metadata::to_record_batch(&history)?])?;
        writeln!(out, "Table Snapshots:")?;
        show(out, &[metadata::to_record_batch(&snapshots)?])?;

        let time_travel = match history.last() {
            Some(oldest) => {
                let rows =
                    table::row_count_at_version(&self.catalog, &self.ident, oldest.version).await?;
                writeln!(out, "Version {} holds {} rows", oldest.version, rows)?;
                Some(TimeTravelRead {
                    version: oldest.version,
                    rows,
                })
            }
            None => None,
        };

        writeln!(out, "ETL job completed successfully!")?;
        let duration = self.run.commit();

        Ok(JobReport {
            job_name: self.run.job_name.clone(),
            run_id: self.run.run_id.clone(),
            started_at: self.run.started_at,
            table: self.ident.clone(),
            source_rows,
            written_version,
            total_records,
            salary_stats: salary.rows,
            city_stats: city.rows,
            history,
            snapshots,
            time_travel,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_args_require_name() {
        assert!(JobArgs::new("nightly").is_ok());
        assert!(matches!(
            JobArgs::new("   "),
            Err(LakehouseError::Config { .. })
        ));
    }

    #[test]
    fn test_runs_get_distinct_ids() {
        let args = JobArgs::new("nightly").unwrap();
        let a = JobRun::start(&args);
        let b = JobRun::start(&args);
        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.commit_metadata().job_name, "nightly");
    }

    #[test]
    fn test_show_empty() {
        let mut out = Vec::new();
        show(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no rows)\n");
    }
}
