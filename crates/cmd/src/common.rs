// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use lakehouse::{Catalog, ConfigOverrides, JobConfig, TableIdent};

/// Location of the managed table, shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct WarehouseArgs {
    /// Warehouse root: a local directory or an object store URL
    #[arg(long)]
    pub warehouse: Option<String>,

    /// Database (namespace) holding the table
    #[arg(long)]
    pub database: Option<String>,

    /// Table name
    #[arg(long)]
    pub table: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Output format for query results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Count,
}

/// Resolved configuration plus the command line that produced it
#[derive(Debug, Clone)]
pub struct WarehouseContext {
    pub config: JobConfig,
    pub original_args: Vec<String>,
}

impl WarehouseContext {
    pub fn new(args: &WarehouseArgs, original_args: Vec<String>) -> Result<Self> {
        let overrides = ConfigOverrides {
            warehouse: args.warehouse.clone(),
            database: args.database.clone(),
            table: args.table.clone(),
        };
        let config = JobConfig::resolve(args.config.as_deref(), &overrides)
            .context("Failed to resolve configuration")?;
        diagnostics::debug!(
            "using warehouse {warehouse}",
            warehouse: config.warehouse.as_str()
        );
        Ok(Self {
            config,
            original_args,
        })
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Ok(Catalog::new(&self.config.warehouse)?)
    }

    pub fn ident(&self) -> Result<TableIdent> {
        Ok(self.config.table_ident()?)
    }
}
