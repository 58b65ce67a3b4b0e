// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands::{history_command, query_command, run_command, snapshots_command};
use cmd::common::{OutputFormat, WarehouseArgs, WarehouseContext};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "lakehouse-etl")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sample data, replace the table, and report on it
    Run {
        /// Name recorded with every commit of this run
        #[arg(long = "job-name", alias = "JOB_NAME")]
        job_name: String,

        #[command(flatten)]
        warehouse: WarehouseArgs,
    },
    /// Show when each table version became current
    History {
        #[command(flatten)]
        warehouse: WarehouseArgs,
    },
    /// Show every commit with its operation and job metadata
    Snapshots {
        #[command(flatten)]
        warehouse: WarehouseArgs,
    },
    /// Run SQL against the table and its <table>_history and <table>_snapshots views
    Query {
        /// SQL query to execute
        sql: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        #[command(flatten)]
        warehouse: WarehouseArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init();

    let original_args: Vec<String> = std::env::args().collect();
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Run {
            job_name,
            warehouse,
        } => {
            let context = WarehouseContext::new(&warehouse, original_args)?;
            run_command(&context, &job_name, &mut out).await.map(|_| ())
        }
        Commands::History { warehouse } => {
            let context = WarehouseContext::new(&warehouse, original_args)?;
            history_command(&context, &mut out).await
        }
        Commands::Snapshots { warehouse } => {
            let context = WarehouseContext::new(&warehouse, original_args)?;
            snapshots_command(&context, &mut out).await
        }
        Commands::Query {
            sql,
            format,
            warehouse,
        } => {
            let context = WarehouseContext::new(&warehouse, original_args)?;
            query_command(&context, &sql, format, &mut out).await
        }
    }
}
