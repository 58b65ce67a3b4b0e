// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::Result;
use lakehouse::{EtlJob, JobArgs, JobReport};

use crate::common::WarehouseContext;

/// Run the ETL job once under `job_name`, writing progress to `out`
pub async fn run_command<W: Write>(
    context: &WarehouseContext,
    job_name: &str,
    out: &mut W,
) -> Result<JobReport> {
    let command_line = context.original_args.join(" ");
    diagnostics::debug!(
        "run_command called with args {args}",
        args: command_line.as_str()
    );

    let args = JobArgs::new(job_name)?;
    let job = EtlJob::new(&context.config, &args)?;
    let run = job.run_info();
    diagnostics::info!(
        "run {run_id} of {job_name} targets warehouse {warehouse}",
        run_id: run.run_id.as_str(),
        job_name: run.job_name.as_str(),
        warehouse: context.config.warehouse.as_str()
    );
    let report = job.run(out).await?;

    let table = report.table.to_string();
    diagnostics::info!(
        "run {run_id} wrote {table} version {version} in {duration_ms}ms",
        run_id: report.run_id.as_str(),
        table: table.as_str(),
        version: report.written_version,
        duration_ms: report.duration.as_millis() as u64
    );
    Ok(report)
}
