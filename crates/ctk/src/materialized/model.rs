//! Materialized view definitions.

use serde::{Deserialize, Serialize};

use cratedb_toolkit_core::model::{TableAddress, quote_ident};

/// A materialized view, emulated by a table rebuilt from `sql`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedView {
    pub table_schema: Option<String>,
    pub table_name: Option<String>,
    /// The SELECT statement defining the view.
    pub sql: Option<String>,
    pub id: Option<String>,
}

impl MaterializedView {
    pub fn new(target: &TableAddress, sql: impl Into<String>) -> Self {
        Self {
            table_schema: target.schema.clone(),
            table_name: target.table.clone(),
            sql: Some(sql.into()),
            id: None,
        }
    }

    pub fn table_fullname(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(self.table_schema.as_deref().unwrap_or_default()),
            quote_ident(self.table_name.as_deref().unwrap_or_default()),
        )
    }

    /// The staging table lives in the same schema: tables cannot be renamed
    /// across schemas.
    pub fn staging_table_fullname(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(self.table_schema.as_deref().unwrap_or_default()),
            quote_ident(&format!(
                "{}-staging",
                self.table_name.as_deref().unwrap_or_default()
            )),
        )
    }
}

/// Runtime settings of materialized view management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedViewSettings {
    /// Address of the management table.
    pub materialized_table: TableAddress,
    /// Log statements instead of running them.
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        let view = MaterializedView::new(&TableAddress::new("testdrive", "foo"), "SELECT 1");
        assert_eq!(view.table_fullname(), r#""testdrive"."foo""#);
        assert_eq!(view.staging_table_fullname(), r#""testdrive"."foo-staging""#);
    }
}
