// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

// Error types for lakehouse job operations
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LakehouseError {
    #[error("Delta Lake error: {0}")]
    Delta(#[from] deltalake::DeltaTableError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_arrow::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Invalid {kind} identifier '{name}': start with a letter or underscore, then letters, digits and underscores")]
    InvalidIdentifier { kind: &'static str, name: String },

    #[error("Column '{column}' not found in batch")]
    MissingColumn { column: String },

    #[error("Column '{column}' has a null value at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Table {table} does not exist in the warehouse")]
    TableNotFound { table: String },
}

pub type Result<T> = std::result::Result<T, LakehouseError>;
