// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Result, anyhow};
use arrow::record_batch::RecordBatch;
use arrow_csv::WriterBuilder;
use datafusion::prelude::SessionContext;
use futures::StreamExt;
use lakehouse::{metadata, table};

use crate::common::{OutputFormat, WarehouseContext};

/// Suffix of the view exposing the table's version history
pub const HISTORY_SUFFIX: &str = "_history";
/// Suffix of the view exposing the table's commits
pub const SNAPSHOTS_SUFFIX: &str = "_snapshots";

/// Register the table and its metadata views in a fresh session.
///
/// For a table `employee_data` the session holds `employee_data`,
/// `employee_data_history` and `employee_data_snapshots`.
pub async fn query_context(context: &WarehouseContext) -> Result<SessionContext> {
    let catalog = context.catalog()?;
    let ident = context.ident()?;
    let ctx = SessionContext::new();

    let loaded = catalog.load_table(&ident).await?;
    let history = metadata::to_record_batch(&metadata::history(&loaded).await?)?;
    let snapshots = metadata::to_record_batch(&metadata::snapshots(&loaded).await?)?;
    table::register(&ctx, &ident, loaded)?;

    for (suffix, batch) in [(HISTORY_SUFFIX, history), (SNAPSHOTS_SUFFIX, snapshots)] {
        let name = format!("{}{}", ident.table(), suffix);
        ctx.register_table(name.as_str(), ctx.read_batch(batch)?.into_view())?;
    }
    Ok(ctx)
}

/// Execute SQL against the table and its metadata views
pub async fn query_command<W: Write>(
    context: &WarehouseContext,
    sql: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    diagnostics::debug!("query_command called with sql: {sql}", sql: sql);

    let ctx = query_context(context).await?;
    let df = ctx
        .sql(sql)
        .await
        .map_err(|e| anyhow!("Failed to parse SQL query: {}", e))?;
    let schema = df.schema().inner().clone();
    let mut stream = df
        .execute_stream()
        .await
        .map_err(|e| anyhow!("Failed to execute query: {}", e))?;

    match format {
        OutputFormat::Table => {
            let mut batches = Vec::new();
            while let Some(batch) = stream.next().await {
                batches.push(batch.map_err(|e| anyhow!("Error collecting results: {}", e))?);
            }
            if batches.iter().all(|b| b.num_rows() == 0) {
                writeln!(out, "No results found.")?;
                return Ok(());
            }
            let formatted = arrow::util::pretty::pretty_format_batches(&batches)
                .map_err(|e| anyhow!("Failed to format results as table: {}", e))?;
            writeln!(out, "{}", formatted)?;
        }
        OutputFormat::Csv => {
            let mut writer = WriterBuilder::new().build(&mut *out);
            let mut wrote_batch = false;
            while let Some(batch) = stream.next().await {
                let batch = batch.map_err(|e| anyhow!("Error in query stream: {}", e))?;
                writer
                    .write(&batch)
                    .map_err(|e| anyhow!("Failed to write CSV: {}", e))?;
                wrote_batch = true;
            }
            // The header is emitted with the first batch
            if !wrote_batch {
                writer
                    .write(&RecordBatch::new_empty(schema))
                    .map_err(|e| anyhow!("Failed to write CSV: {}", e))?;
            }
        }
        OutputFormat::Count => {
            let mut total_rows = 0;
            while let Some(batch) = stream.next().await {
                let batch = batch.map_err(|e| anyhow!("Error in query stream: {}", e))?;
                total_rows += batch.num_rows();
            }
            writeln!(out, "{}", total_rows)?;
        }
    }
    Ok(())
}
