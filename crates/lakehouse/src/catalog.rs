// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Warehouse catalog: maps `database.table` names to Delta table locations.
//!
//! Layout follows the usual warehouse convention, one directory (or object
//! prefix) per database suffixed with `.db`:
//!
//! ```text
//! <warehouse>/<database>.db/<table>/_delta_log/...
//! ```

use crate::error::{LakehouseError, Result};
use deltalake::{DeltaTable, DeltaTableError};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// A validated `database.table` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdent {
    database: String,
    table: String,
}

/// Names are embedded unquoted in generated SQL, so they must lex as plain identifiers
fn validate_identifier(kind: &'static str, name: &str) -> Result<()> {
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid = starts_ok && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LakehouseError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

impl TableIdent {
    pub fn new(database: &str, table: &str) -> Result<Self> {
        validate_identifier("database", database)?;
        validate_identifier("table", table)?;
        Ok(Self {
            database: database.to_string(),
            table: table.to_string(),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Warehouse {
    Local(PathBuf),
    Remote(Url),
}

#[derive(Debug, Clone)]
pub struct Catalog {
    warehouse: Warehouse,
}

#[cfg(feature = "s3")]
fn register_object_stores() {
    static REGISTER: std::sync::Once = std::sync::Once::new();
    REGISTER.call_once(|| deltalake::aws::register_handlers(None));
}

#[cfg(not(feature = "s3"))]
fn register_object_stores() {}

impl Catalog {
    /// Open a catalog rooted at a local directory or an object store URL.
    pub fn new(warehouse: &str) -> Result<Self> {
        register_object_stores();

        // Single-letter schemes are Windows drive letters, not URLs
        let warehouse = match Url::parse(warehouse) {
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| LakehouseError::Config {
                    message: format!("unusable file URL '{}'", warehouse),
                })?;
                Warehouse::Local(path)
            }
            Ok(url) if url.scheme().len() > 1 => Warehouse::Remote(url),
            _ => Warehouse::Local(std::path::absolute(warehouse)?),
        };

        let description = format!("{:?}", warehouse);
        diagnostics::debug!("catalog warehouse {description}", description: description.as_str());
        Ok(Self { warehouse })
    }

    pub fn is_local(&self) -> bool {
        matches!(self.warehouse, Warehouse::Local(_))
    }

    fn database_location(&self, database: &str) -> String {
        let dir = format!("{}.db", database);
        match &self.warehouse {
            Warehouse::Local(root) => root.join(dir).to_string_lossy().to_string(),
            Warehouse::Remote(url) => format!("{}/{}", url.as_str().trim_end_matches('/'), dir),
        }
    }

    /// Location of the Delta table backing `ident`
    pub fn table_uri(&self, ident: &TableIdent) -> String {
        let database = self.database_location(ident.database());
        match &self.warehouse {
            Warehouse::Local(_) => PathBuf::from(database)
                .join(ident.table())
                .to_string_lossy()
                .to_string(),
            Warehouse::Remote(_) => format!("{}/{}", database, ident.table()),
        }
    }

    /// Object stores have no directories to create, so this only touches local warehouses.
    pub fn create_database_if_not_exists(&self, database: &str) -> Result<()> {
        validate_identifier("database", database)?;
        let location = self.database_location(database);
        if self.is_local() {
            std::fs::create_dir_all(&location)?;
        }
        diagnostics::info!("database {database} ready at {location}", database: database, location: location.as_str());
        Ok(())
    }

    pub async fn table_exists(&self, ident: &TableIdent) -> Result<bool> {
        let uri = self.table_uri(ident);
        if self.is_local() {
            return Ok(PathBuf::from(&uri).join("_delta_log").is_dir());
        }
        match deltalake::open_table(&uri).await {
            Ok(_) => Ok(true),
            Err(DeltaTableError::NotATable(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the latest version of a table
    pub async fn load_table(&self, ident: &TableIdent) -> Result<DeltaTable> {
        if !self.table_exists(ident).await? {
            return Err(LakehouseError::TableNotFound {
                table: ident.to_string(),
            });
        }
        let uri = self.table_uri(ident);
        diagnostics::debug!("opening table {uri}", uri: uri.as_str());
        Ok(deltalake::open_table(&uri).await?)
    }

    /// Load a table as of an earlier version (time travel)
    pub async fn load_table_at_version(
        &self,
        ident: &TableIdent,
        version: i64,
    ) -> Result<DeltaTable> {
        if !self.table_exists(ident).await? {
            return Err(LakehouseError::TableNotFound {
                table: ident.to_string(),
            });
        }
        let uri = self.table_uri(ident);
        diagnostics::debug!("opening table {uri} at version {version}", uri: uri.as_str(), version: version);
        Ok(deltalake::open_table_with_version(&uri, version).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(TableIdent::new("dev_lake_db", "employee_data").is_ok());
        assert!(TableIdent::new("", "t").is_err());
        assert!(TableIdent::new("db", "a.b").is_err());
        assert!(TableIdent::new("db;drop", "t").is_err());
    }

    #[test]
    fn test_identifier_must_not_start_with_digit() {
        assert!(matches!(
            TableIdent::new("hr", "2024_staff"),
            Err(LakehouseError::InvalidIdentifier { kind: "table", .. })
        ));
        assert!(matches!(
            TableIdent::new("2024", "staff"),
            Err(LakehouseError::InvalidIdentifier { kind: "database", .. })
        ));
        assert!(TableIdent::new("hr", "staff_2024").is_ok());
        assert!(TableIdent::new("hr", "_staging").is_ok());
    }

    #[test]
    fn test_remote_layout() {
        let catalog = Catalog::new("s3://bucket/warehouse/").unwrap();
        let ident = TableIdent::new("sales", "orders").unwrap();
        assert!(!catalog.is_local());
        assert_eq!(catalog.table_uri(&ident), "s3://bucket/warehouse/sales.db/orders");
    }

    #[test]
    fn test_local_layout_and_database_creation() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(&dir.path().to_string_lossy()).unwrap();
        let ident = TableIdent::new("sales", "orders").unwrap();

        assert!(catalog.is_local());
        assert_eq!(
            PathBuf::from(catalog.table_uri(&ident)),
            dir.path().join("sales.db").join("orders")
        );

        catalog.create_database_if_not_exists("sales").unwrap();
        catalog.create_database_if_not_exists("sales").unwrap();
        assert!(dir.path().join("sales.db").is_dir());
    }

    #[test]
    fn test_file_url_is_local() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_directory_path(dir.path()).unwrap();
        let catalog = Catalog::new(url.as_str()).unwrap();
        assert!(catalog.is_local());
    }

    #[tokio::test]
    async fn test_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(&dir.path().to_string_lossy()).unwrap();
        let ident = TableIdent::new("sales", "orders").unwrap();

        assert!(!catalog.table_exists(&ident).await.unwrap());
        assert!(matches!(
            catalog.load_table(&ident).await,
            Err(LakehouseError::TableNotFound { .. })
        ));
    }
}
