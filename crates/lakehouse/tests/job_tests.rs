// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use chrono::DateTime;
use datafusion::prelude::{SessionContext, col};
use lakehouse::sample::sample_batch;
use lakehouse::schema::EnrichedEmployee;
use lakehouse::{Catalog, CommitMetadata, EtlJob, JobArgs, JobConfig, TableIdent, table, transform};
use tempfile::tempdir;

fn config_for(warehouse: &std::path::Path) -> JobConfig {
    JobConfig {
        warehouse: warehouse.to_string_lossy().to_string(),
        ..JobConfig::default()
    }
}

#[tokio::test]
async fn test_write_then_read_preserves_rows() -> Result<()> {
    let dir = tempdir()?;
    let catalog = Catalog::new(&dir.path().to_string_lossy())?;
    let ident = TableIdent::new("hr", "people")?;
    let processed_at = DateTime::from_timestamp(1_700_000_000, 123_000).unwrap();

    let ctx = SessionContext::new();
    let transformed = transform::transform(ctx.read_batch(sample_batch()?)?, processed_at)?
        .collect()
        .await?;
    let expected = EnrichedEmployee::from_batches(&transformed)?;

    catalog.create_database_if_not_exists(ident.database())?;
    let written = table::create_or_replace(
        &catalog,
        &ident,
        transformed,
        &CommitMetadata::new("roundtrip", "run-1"),
    )
    .await?;
    assert_eq!(table::current_version(&written), Some(0));

    let read_ctx = SessionContext::new();
    let df = table::read_table(&read_ctx, &catalog, &ident).await?;
    let batches = df.sort(vec![col("id").sort(true, false)])?.collect().await?;
    let actual = EnrichedEmployee::from_batches(&batches)?;

    assert_eq!(actual.len(), 5);
    assert_eq!(actual, expected);
    Ok(())
}

#[tokio::test]
async fn test_full_job_run() -> Result<()> {
    let dir = tempdir()?;
    let config = config_for(dir.path());
    let args = JobArgs::new("employee-etl")?;

    let job = EtlJob::new(&config, &args)?;
    let mut out = Vec::new();
    let report = job.run(&mut out).await?;
    let text = String::from_utf8(out)?;

    assert_eq!(report.run_id, job.run_info().run_id);
    assert_eq!(report.started_at, job.run_info().started_at);
    assert!(report.started_at <= chrono::Utc::now());
    assert!(text.starts_with(&format!(
        "Starting ETL job employee-etl (run {}, started {})",
        report.run_id,
        report.started_at.to_rfc3339()
    )));
    assert_eq!(report.source_rows, 5);
    assert_eq!(report.total_records, 5);
    assert_eq!(report.written_version, 0);
    assert_eq!(report.table.to_string(), "dev_lake_db.employee_data");

    let tiers: Vec<(&str, i64)> = report
        .salary_stats
        .iter()
        .map(|s| (s.salary_category.as_str(), s.count))
        .collect();
    assert_eq!(tiers, vec![("High", 2), ("Medium", 3)]);
    assert_eq!(report.city_stats[0].city, "Chicago");
    assert_eq!(report.city_stats[4].city, "Los Angeles");

    assert_eq!(report.history.len(), 1);
    assert_eq!(report.history[0].version, 0);
    assert_eq!(report.history[0].parent_version, None);
    assert_eq!(report.snapshots[0].job_name.as_deref(), Some("employee-etl"));
    assert_eq!(report.snapshots[0].run_id.as_deref(), Some(report.run_id.as_str()));

    let time_travel = report.time_travel.expect("oldest version should be readable");
    assert_eq!((time_travel.version, time_travel.rows), (0, 5));

    for line in [
        "Step 1: Creating sample data...",
        "Step 2: Transforming data...",
        "Step 3: Writing to Delta table...",
        "Data written to table: dev_lake_db.employee_data (version 0)",
        "Total records: 5",
        "Salary Category Statistics:",
        "City Statistics:",
        "Table History:",
        "Table Snapshots:",
        "ETL job completed successfully!",
    ] {
        assert!(text.contains(line), "missing '{line}' in output:\n{text}");
    }

    assert!(dir.path().join("dev_lake_db.db").join("employee_data").join("_delta_log").is_dir());
    Ok(())
}

#[tokio::test]
async fn test_rerun_replaces_table_and_keeps_history() -> Result<()> {
    let dir = tempdir()?;
    let config = config_for(dir.path());

    let first = EtlJob::new(&config, &JobArgs::new("first")?)?
        .run(&mut Vec::new())
        .await?;
    let second = EtlJob::new(&config, &JobArgs::new("second")?)?
        .run(&mut Vec::new())
        .await?;

    // Replace, not append
    assert_eq!(second.total_records, 5);
    assert_eq!(second.written_version, first.written_version + 1);

    let versions: Vec<i64> = second.history.iter().map(|h| h.version).collect();
    assert_eq!(versions, vec![1, 0]);
    assert_eq!(second.history[0].parent_version, Some(0));
    assert!(second.history[0].made_current_at >= second.history[1].made_current_at);

    let jobs: Vec<Option<&str>> = second
        .snapshots
        .iter()
        .map(|s| s.job_name.as_deref())
        .collect();
    assert_eq!(jobs, vec![Some("second"), Some("first")]);

    let time_travel = second.time_travel.expect("version 0 should still be readable");
    assert_eq!((time_travel.version, time_travel.rows), (0, 5));
    Ok(())
}

#[tokio::test]
async fn test_failure_is_reported_and_returned() -> Result<()> {
    let dir = tempdir()?;
    // A regular file where the warehouse directory should be
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied")?;

    let job = EtlJob::new(&config_for(&blocker), &JobArgs::new("doomed")?)?;
    let mut out = Vec::new();
    let result = job.run(&mut out).await;
    let text = String::from_utf8(out)?;

    assert!(result.is_err());
    assert!(text.contains("Step 3: Writing to Delta table..."));
    assert!(text.contains("Error in ETL job:"));
    assert!(!text.contains("ETL job completed successfully!"));
    Ok(())
}

#[tokio::test]
async fn test_digit_leading_table_rejected_before_write() -> Result<()> {
    let dir = tempdir()?;
    let config = JobConfig {
        database: "hr".to_string(),
        table: "2024_staff".to_string(),
        ..config_for(dir.path())
    };

    let result = EtlJob::new(&config, &JobArgs::new("staff")?);
    assert!(matches!(
        result,
        Err(lakehouse::LakehouseError::InvalidIdentifier { kind: "table", .. })
    ));
    assert!(!dir.path().join("hr.db").exists());
    Ok(())
}

#[tokio::test]
async fn test_keyword_table_names_run() -> Result<()> {
    let dir = tempdir()?;
    for name in ["order", "user"] {
        let config = JobConfig {
            database: "hr".to_string(),
            table: name.to_string(),
            ..config_for(dir.path())
        };
        let report = EtlJob::new(&config, &JobArgs::new("keywords")?)?
            .run(&mut Vec::new())
            .await?;
        assert_eq!(report.total_records, 5);
    }
    Ok(())
}
