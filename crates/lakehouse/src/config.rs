// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Job configuration.
//!
//! Resolution order, lowest to highest precedence:
//! built-in defaults, YAML config file, `LAKEHOUSE_WAREHOUSE`, explicit overrides.

use crate::catalog::TableIdent;
use crate::error::{LakehouseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the warehouse location
pub const WAREHOUSE_ENV: &str = "LAKEHOUSE_WAREHOUSE";

pub const DEFAULT_WAREHOUSE: &str = "warehouse/";
pub const DEFAULT_DATABASE: &str = "dev_lake_db";
pub const DEFAULT_TABLE: &str = "employee_data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Root of the warehouse: a local directory or an object store URL
    #[serde(default = "default_warehouse")]
    pub warehouse: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_warehouse() -> String {
    DEFAULT_WAREHOUSE.to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            warehouse: default_warehouse(),
            database: default_database(),
            table: default_table(),
        }
    }
}

/// Values that take precedence over the file and environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub table: Option<String>,
}

impl JobConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content).map_err(|source| LakehouseError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the effective configuration from all sources
    pub fn resolve(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let env_warehouse = std::env::var(WAREHOUSE_ENV).ok();
        Self::resolve_with_env(file, env_warehouse, overrides)
    }

    pub(crate) fn resolve_with_env(
        file: Option<&Path>,
        env_warehouse: Option<String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        if let Some(warehouse) = env_warehouse.filter(|w| !w.trim().is_empty()) {
            diagnostics::debug!("warehouse taken from {env}", env: WAREHOUSE_ENV);
            config.warehouse = warehouse;
        }
        if let Some(warehouse) = &overrides.warehouse {
            config.warehouse = warehouse.clone();
        }
        if let Some(database) = &overrides.database {
            config.database = database.clone();
        }
        if let Some(table) = &overrides.table {
            config.table = table.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.warehouse.trim().is_empty() {
            return Err(LakehouseError::Config {
                message: "warehouse cannot be empty".to_string(),
            });
        }
        self.table_ident().map(|_| ())
    }

    pub fn table_ident(&self) -> Result<TableIdent> {
        TableIdent::new(&self.database, &self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = JobConfig::resolve_with_env(None, None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config, JobConfig::default());
        assert_eq!(config.table_ident().unwrap().to_string(), "dev_lake_db.employee_data");
    }

    #[test]
    fn test_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "warehouse: /from/file\ntable: people").unwrap();

        let config =
            JobConfig::resolve_with_env(Some(file.path()), None, &ConfigOverrides::default())
                .unwrap();
        assert_eq!(config.warehouse, "/from/file");
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.table, "people");

        let config = JobConfig::resolve_with_env(
            Some(file.path()),
            Some("/from/env".to_string()),
            &ConfigOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.warehouse, "/from/env");

        let overrides = ConfigOverrides {
            warehouse: Some("/from/cli".to_string()),
            ..Default::default()
        };
        let config =
            JobConfig::resolve_with_env(Some(file.path()), Some("/from/env".to_string()), &overrides)
                .unwrap();
        assert_eq!(config.warehouse, "/from/cli");
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "warehous: typo").unwrap();
        assert!(matches!(
            JobConfig::resolve_with_env(Some(file.path()), None, &ConfigOverrides::default()),
            Err(LakehouseError::ConfigParse { .. })
        ));

        let overrides = ConfigOverrides {
            database: Some("bad-name".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            JobConfig::resolve_with_env(None, None, &overrides),
            Err(LakehouseError::InvalidIdentifier { .. })
        ));
    }
}
