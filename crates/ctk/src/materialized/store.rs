//! Storage of materialized view definitions in a management table.

use serde_json::{Value, json};
use tracing::info;

use cratedb_toolkit_core::model::TableAddress;
use cratedb_toolkit_core::sql::{DatabaseAdapter, SqlResponse};

use super::model::{MaterializedView, MaterializedViewSettings};
use crate::error::MaterializedError;

/// Reads and writes view definitions, and runs statements on their behalf.
#[derive(Debug, Clone)]
pub struct MaterializedViewStore {
    adapter: DatabaseAdapter,
    settings: MaterializedViewSettings,
}

impl MaterializedViewStore {
    pub fn new(adapter: DatabaseAdapter, settings: MaterializedViewSettings) -> Self {
        Self { adapter, settings }
    }

    pub fn settings(&self) -> &MaterializedViewSettings {
        &self.settings
    }

    /// Create the management table.
    pub async fn setup(&self) -> Result<(), MaterializedError> {
        let table = self.settings.materialized_table.fullname()?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n\
             \x20   \"id\" TEXT NOT NULL PRIMARY KEY,\n\
             \x20   \"table_schema\" TEXT,\n\
             \x20   \"table_name\" TEXT,\n\
             \x20   \"sql\" TEXT\n\
             )"
        );
        info!("Installing materialized view management table {table}");
        self.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Store a view definition.
    ///
    /// Errors containing `ignore` are tolerated. Views without an id get a
    /// random one generated by the database.
    pub async fn create(
        &self,
        view: &MaterializedView,
        ignore: Option<&str>,
    ) -> Result<(), MaterializedError> {
        let table = self.settings.materialized_table.fullname()?;
        let (sql, args) = match &view.id {
            Some(id) => (
                format!(
                    "INSERT INTO {table} (id, table_schema, table_name, sql) VALUES (?, ?, ?, ?)"
                ),
                vec![
                    json!(id),
                    json!(view.table_schema),
                    json!(view.table_name),
                    json!(view.sql),
                ],
            ),
            None => (
                format!(
                    "INSERT INTO {table} (id, table_schema, table_name, sql) \
                     VALUES (gen_random_text_uuid(), ?, ?, ?)"
                ),
                vec![json!(view.table_schema), json!(view.table_name), json!(view.sql)],
            ),
        };
        match self.execute(&sql, &args).await {
            Err(MaterializedError::Sql { source })
                if ignore.is_some_and(|fragment| source.mentions(fragment)) => {}
            other => {
                other?;
            }
        }
        self.synchronize().await
    }

    /// Retrieve the definition of the view materialized into `table`.
    pub async fn get_by_table(
        &self,
        table: &TableAddress,
    ) -> Result<MaterializedView, MaterializedError> {
        let management = self.settings.materialized_table.fullname()?;
        let sql = format!(
            "SELECT id, table_schema, table_name, sql FROM {management} \
             WHERE table_schema = ? AND table_name = ?"
        );
        let response = self
            .adapter
            .execute(&sql, &[json!(table.schema), json!(table.table)])
            .await?;
        let record = response.records().into_iter().next().ok_or_else(|| {
            MaterializedError::ViewNotFound {
                name: format!(
                    "{}.{}",
                    table.schema.as_deref().unwrap_or_default(),
                    table.table.as_deref().unwrap_or_default()
                ),
            }
        })?;
        serde_json::from_value(Value::Object(record))
            .map_err(|source| MaterializedError::Record { source })
    }

    /// Run a statement, or only log it in dry-run mode.
    pub async fn execute(
        &self,
        sql: &str,
        args: &[Value],
    ) -> Result<SqlResponse, MaterializedError> {
        if self.settings.dry_run {
            info!("Pretending to execute SQL statement:\n{sql}");
            return Ok(SqlResponse::default());
        }
        Ok(self.adapter.execute(sql, args).await?)
    }

    /// Make written definitions visible to subsequent reads.
    pub async fn synchronize(&self) -> Result<(), MaterializedError> {
        let table = self.settings.materialized_table.fullname()?;
        self.execute(&format!("REFRESH TABLE {table}"), &[]).await?;
        Ok(())
    }
}
