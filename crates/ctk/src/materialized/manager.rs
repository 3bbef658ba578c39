//! Refreshing materialized views.

use tracing::info;

use cratedb_toolkit_core::model::{TableAddress, quote_ident};

use super::model::MaterializedView;
use super::store::MaterializedViewStore;
use crate::error::{MaterializedError, ViewNotFoundSnafu};

/// Rebuilds materialized views through a staging table.
#[derive(Debug, Clone)]
pub struct MaterializedViewManager {
    store: MaterializedViewStore,
}

impl MaterializedViewManager {
    pub fn new(store: MaterializedViewStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MaterializedViewStore {
        &self.store
    }

    /// Refresh the view named `<schema>.<table>`.
    ///
    /// The view is rebuilt into `"<schema>"."<table>-staging"`, which then
    /// replaces the target table.
    pub async fn refresh(&self, name: &str) -> Result<MaterializedView, MaterializedError> {
        info!("Refreshing materialized view: {name}");
        let target = TableAddress::parse(name).ok_or_else(|| MaterializedError::InvalidName {
            name: name.to_string(),
        })?;

        let view = match self.store.get_by_table(&target).await {
            Err(MaterializedError::ViewNotFound { .. }) => {
                return ViewNotFoundSnafu { name }.fail();
            }
            other => other?,
        };
        info!("Loaded materialized view definition: {view:?}");
        let sql = view
            .sql
            .as_deref()
            .ok_or(MaterializedError::Incomplete { field: "sql" })?;
        let table_name = view
            .table_name
            .as_deref()
            .ok_or(MaterializedError::Incomplete {
                field: "table name",
            })?;

        let staging = view.staging_table_fullname();

        let ddl = format!("DROP TABLE IF EXISTS {staging}");
        info!("Dropping materialized view (staging): {ddl}");
        self.store.execute(&ddl, &[]).await?;

        let ddl = format!("CREATE TABLE {staging} AS (\n{sql}\n)");
        info!("Creating materialized view (staging): {ddl}");
        self.store.execute(&ddl, &[]).await?;
        self.store
            .execute(&format!("REFRESH TABLE {staging}"), &[])
            .await?;

        let ddl = format!("ALTER TABLE {staging} RENAME TO {}", quote_ident(table_name));
        info!("Activating materialized view: {ddl}");
        self.store.execute(&ddl, &[]).await?;
        self.store
            .execute(&format!("REFRESH TABLE {}", view.table_fullname()), &[])
            .await?;

        Ok(view)
    }
}
