// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::Result;
use lakehouse::job::show;
use lakehouse::metadata;

use crate::common::WarehouseContext;

/// Print the version history of the table
pub async fn history_command<W: Write>(context: &WarehouseContext, out: &mut W) -> Result<()> {
    let catalog = context.catalog()?;
    let ident = context.ident()?;
    let table = catalog.load_table(&ident).await?;

    let history = metadata::history(&table).await?;
    diagnostics::debug!("{count} history entries", count: history.len());

    writeln!(out, "History of {}:", ident)?;
    show(out, &[metadata::to_record_batch(&history)?])?;
    Ok(())
}

/// Print one row per commit, with its operation and job metadata
pub async fn snapshots_command<W: Write>(context: &WarehouseContext, out: &mut W) -> Result<()> {
    let catalog = context.catalog()?;
    let ident = context.ident()?;
    let table = catalog.load_table(&ident).await?;

    let snapshots = metadata::snapshots(&table).await?;
    diagnostics::debug!("{count} snapshots", count: snapshots.len());

    writeln!(out, "Snapshots of {}:", ident)?;
    show(out, &[metadata::to_record_batch(&snapshots)?])?;
    Ok(())
}
