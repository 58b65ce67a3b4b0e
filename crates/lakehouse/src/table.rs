// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Writing and reading the managed Delta table.

use crate::catalog::{Catalog, TableIdent};
use crate::error::Result;
use arrow_array::RecordBatch;
use datafusion::prelude::{DataFrame, SessionContext};
use deltalake::kernel::transaction::CommitProperties;
use deltalake::operations::write::SchemaMode;
use deltalake::protocol::SaveMode;
use deltalake::{DeltaOps, DeltaTable};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Application metadata attached to every commit made by the job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMetadata {
    pub job_name: String,
    pub run_id: String,
}

impl CommitMetadata {
    pub const JOB_NAME_KEY: &'static str = "lakehouse.job_name";
    pub const RUN_ID_KEY: &'static str = "lakehouse.run_id";

    pub fn new(job_name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            run_id: run_id.into(),
        }
    }

    pub fn to_delta_metadata(&self) -> HashMap<String, Value> {
        HashMap::from([
            (Self::JOB_NAME_KEY.to_string(), Value::from(self.job_name.as_str())),
            (Self::RUN_ID_KEY.to_string(), Value::from(self.run_id.as_str())),
        ])
    }

    /// Recover the metadata from a commit's `info` map. Commits made by
    /// other writers have no job metadata and yield `None`.
    pub fn from_commit_info(info: &HashMap<String, Value>) -> Option<Self> {
        let job_name = info.get(Self::JOB_NAME_KEY)?.as_str()?;
        let run_id = info.get(Self::RUN_ID_KEY)?.as_str()?;
        Some(Self::new(job_name, run_id))
    }
}

/// Latest committed version of a loaded table, `None` before the first commit
pub fn current_version(table: &DeltaTable) -> Option<i64> {
    let version = table.version();
    (version >= 0).then_some(version)
}

/// Write `batches` as the full content of the table, creating it when absent.
///
/// Existing data and schema are replaced in a single commit; earlier
/// versions stay reachable through time travel.
pub async fn create_or_replace(
    catalog: &Catalog,
    ident: &TableIdent,
    batches: Vec<RecordBatch>,
    metadata: &CommitMetadata,
) -> Result<DeltaTable> {
    let uri = catalog.table_uri(ident);
    if catalog.is_local() {
        std::fs::create_dir_all(&uri)?;
    }

    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    diagnostics::debug!("writing {rows} rows to {uri}", rows: rows, uri: uri.as_str());

    let properties =
        CommitProperties::default().with_metadata(metadata.to_delta_metadata().into_iter());

    let table = DeltaOps::try_from_uri(&uri)
        .await?
        .write(batches)
        .with_save_mode(SaveMode::Overwrite)
        .with_schema_mode(SchemaMode::Overwrite)
        .with_commit_properties(properties)
        .await?;

    let version = current_version(&table).unwrap_or(0);
    let table_name = ident.to_string();
    diagnostics::info!(
        "replaced {table} with {rows} rows at version {version}",
        table: table_name.as_str(),
        rows: rows,
        version: version
    );
    Ok(table)
}

/// Register `table` in `ctx` under the table name, replacing any earlier registration.
pub fn register(ctx: &SessionContext, ident: &TableIdent, table: DeltaTable) -> Result<()> {
    ctx.deregister_table(ident.table())?;
    ctx.register_table(ident.table(), Arc::new(table))?;
    Ok(())
}

/// Load the latest version of the table and expose it as a DataFrame
pub async fn read_table(
    ctx: &SessionContext,
    catalog: &Catalog,
    ident: &TableIdent,
) -> Result<DataFrame> {
    let table = catalog.load_table(ident).await?;
    register(ctx, ident, table)?;
    Ok(ctx.table(ident.table()).await?)
}

/// Count the rows of the table as of `version`
pub async fn row_count_at_version(
    catalog: &Catalog,
    ident: &TableIdent,
    version: i64,
) -> Result<usize> {
    let table = catalog.load_table_at_version(ident, version).await?;
    let ctx = SessionContext::new();
    register(&ctx, ident, table)?;
    Ok(ctx.table(ident.table()).await?.count().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_metadata_roundtrip_through_info() {
        let metadata = CommitMetadata::new("nightly", "0190f0aa-0000-7000-8000-000000000000");
        let info = metadata.to_delta_metadata();
        assert_eq!(CommitMetadata::from_commit_info(&info), Some(metadata));
    }

    #[test]
    fn test_foreign_commit_has_no_metadata() {
        let info = HashMap::from([("operationMetrics".to_string(), Value::Null)]);
        assert_eq!(CommitMetadata::from_commit_info(&info), None);
    }
}
