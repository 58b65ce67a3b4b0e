// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Table history and snapshot views built from the Delta commit log.
//!
//! Every Delta commit is a snapshot. History lists when each version became
//! current; snapshots add the operation and a summary of what it did.

use crate::error::Result;
use crate::schema::ForArrow;
use crate::table::{CommitMetadata, current_version};
use arrow_array::RecordBatch;
use arrow_schema::{DataType, Field, FieldRef, TimeUnit};
use deltalake::DeltaTable;
use deltalake::kernel::CommitInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const OPERATION_METRICS_KEY: &str = "operationMetrics";

/// A commit together with the table version it produced
#[derive(Debug, Clone)]
pub struct VersionedCommit {
    pub version: i64,
    pub info: CommitInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Milliseconds since epoch
    pub made_current_at: i64,
    pub version: i64,
    pub parent_version: Option<i64>,
    pub is_current_ancestor: bool,
}

impl ForArrow for HistoryEntry {
    fn for_arrow() -> Vec<FieldRef> {
        vec![
            Arc::new(Field::new(
                "made_current_at",
                DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
                false,
            )),
            Arc::new(Field::new("version", DataType::Int64, false)),
            Arc::new(Field::new("parent_version", DataType::Int64, true)),
            Arc::new(Field::new("is_current_ancestor", DataType::Boolean, false)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Milliseconds since epoch
    pub committed_at: i64,
    pub version: i64,
    pub parent_version: Option<i64>,
    pub operation: String,
    pub job_name: Option<String>,
    pub run_id: Option<String>,
    /// JSON object of operation parameters and metrics
    pub summary: String,
}

impl ForArrow for SnapshotEntry {
    fn for_arrow() -> Vec<FieldRef> {
        vec![
            Arc::new(Field::new(
                "committed_at",
                DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
                false,
            )),
            Arc::new(Field::new("version", DataType::Int64, false)),
            Arc::new(Field::new("parent_version", DataType::Int64, true)),
            Arc::new(Field::new("operation", DataType::Utf8, false)),
            Arc::new(Field::new("job_name", DataType::Utf8, true)),
            Arc::new(Field::new("run_id", DataType::Utf8, true)),
            Arc::new(Field::new("summary", DataType::Utf8, false)),
        ]
    }
}

/// Commits of the table, newest first, each tagged with its version.
///
/// The Delta history is returned newest first and is contiguous, so the
/// n-th entry belongs to `current_version - n`.
pub async fn versioned_commits(table: &DeltaTable) -> Result<Vec<VersionedCommit>> {
    let Some(current) = current_version(table) else {
        return Ok(Vec::new());
    };
    let commits = table.history(None).await?;
    Ok(commits
        .into_iter()
        .enumerate()
        .map(|(i, info)| VersionedCommit {
            version: current - i as i64,
            info,
        })
        .collect())
}

fn parent_of(version: i64) -> Option<i64> {
    (version > 0).then_some(version - 1)
}

pub fn history_entries(commits: &[VersionedCommit]) -> Vec<HistoryEntry> {
    commits
        .iter()
        .map(|c| HistoryEntry {
            made_current_at: c.info.timestamp.unwrap_or_default(),
            version: c.version,
            parent_version: parent_of(c.version),
            // Delta history is linear: every retained commit is an ancestor of the head
            is_current_ancestor: true,
        })
        .collect()
}

fn summarize(info: &CommitInfo) -> Result<String> {
    let mut summary = BTreeMap::new();
    if let Some(params) = &info.operation_parameters {
        for (key, value) in params {
            summary.insert(key.clone(), value.clone());
        }
    }
    match info.info.get(OPERATION_METRICS_KEY) {
        Some(Value::Object(metrics)) => {
            for (key, value) in metrics {
                summary.insert(key.clone(), value.clone());
            }
        }
        Some(other) => {
            summary.insert(OPERATION_METRICS_KEY.to_string(), other.clone());
        }
        None => {}
    }
    Ok(serde_json::to_string(&summary)?)
}

pub fn snapshot_entries(commits: &[VersionedCommit]) -> Result<Vec<SnapshotEntry>> {
    commits
        .iter()
        .map(|c| {
            let job = CommitMetadata::from_commit_info(&c.info.info);
            Ok(SnapshotEntry {
                committed_at: c.info.timestamp.unwrap_or_default(),
                version: c.version,
                parent_version: parent_of(c.version),
                operation: c
                    .info
                    .operation
                    .clone()
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                job_name: job.as_ref().map(|j| j.job_name.clone()),
                run_id: job.map(|j| j.run_id),
                summary: summarize(&c.info)?,
            })
        })
        .collect()
}

pub async fn history(table: &DeltaTable) -> Result<Vec<HistoryEntry>> {
    Ok(history_entries(&versioned_commits(table).await?))
}

pub async fn snapshots(table: &DeltaTable) -> Result<Vec<SnapshotEntry>> {
    snapshot_entries(&versioned_commits(table).await?)
}

/// Arrow form of any metadata rows, for display or SQL registration
pub fn to_record_batch<T: ForArrow + Serialize>(entries: &[T]) -> Result<RecordBatch> {
    Ok(serde_arrow::to_record_batch(&T::for_arrow(), &entries)?)
}
