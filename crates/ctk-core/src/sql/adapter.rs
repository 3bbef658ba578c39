//! Convenience operations on top of a SQL executor.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::{SqlExecutor, SqlResponse, split_statements};
use crate::error::SqlError;
use crate::model::{TableAddress, quote_ident};

const UNKNOWN_REPOSITORY_ERRORS: &[&str] =
    &["RepositoryUnknownException", "RepositoryMissingException"];

/// High-level database access.
#[derive(Clone)]
pub struct DatabaseAdapter {
    executor: Arc<dyn SqlExecutor>,
}

impl std::fmt::Debug for DatabaseAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseAdapter").finish_non_exhaustive()
    }
}

impl DatabaseAdapter {
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    /// Run every statement of a script, returning one response per statement.
    pub async fn run_sql(&self, sql: &str) -> Result<Vec<SqlResponse>, SqlError> {
        self.run_sql_ignoring(sql, None).await
    }

    /// Like [`run_sql`](Self::run_sql), but an error whose text contains
    /// `ignore` ends the script without failing.
    pub async fn run_sql_ignoring(
        &self,
        sql: &str,
        ignore: Option<&str>,
    ) -> Result<Vec<SqlResponse>, SqlError> {
        let mut responses = Vec::new();
        for statement in split_statements(sql) {
            match self.executor.execute(&statement, &[]).await {
                Ok(response) => responses.push(response),
                Err(e) if ignore.is_some_and(|fragment| e.mentions(fragment)) => {
                    debug!(error = %e, "Ignoring SQL error");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(responses)
    }

    /// Rows of the last statement as maps keyed by column name.
    pub async fn run_sql_records(&self, sql: &str) -> Result<Vec<Map<String, Value>>, SqlError> {
        let responses = self.run_sql(sql).await?;
        Ok(responses.last().map(SqlResponse::records).unwrap_or_default())
    }

    /// Execute one statement with positional arguments.
    pub async fn execute(&self, stmt: &str, args: &[Value]) -> Result<SqlResponse, SqlError> {
        self.executor.execute(stmt, args).await
    }

    pub async fn count_records(&self, table: &TableAddress) -> Result<u64, SqlError> {
        let sql = format!("SELECT COUNT(*) AS count FROM {}", table.fullname()?);
        let response = self.executor.execute(&sql, &[]).await?;
        Ok(response.scalar().and_then(Value::as_u64).unwrap_or(0))
    }

    /// Whether the table can be selected from. Any error counts as absent.
    pub async fn table_exists(&self, table: &TableAddress) -> bool {
        let Ok(fullname) = table.fullname() else {
            return false;
        };
        let sql = format!("SELECT 1 FROM {fullname} LIMIT 1");
        match self.executor.execute(&sql, &[]).await {
            Ok(_) => true,
            Err(e) => {
                debug!(table = %fullname, error = %e, "Table not accessible");
                false
            }
        }
    }

    pub async fn refresh_table(&self, table: &TableAddress) -> Result<(), SqlError> {
        let sql = format!("REFRESH TABLE {}", table.fullname()?);
        self.executor.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Drop a snapshot repository. Unknown repositories are not an error.
    pub async fn drop_repository(&self, name: &str) -> Result<(), SqlError> {
        let sql = format!("DROP REPOSITORY {}", quote_ident(name));
        match self.executor.execute(&sql, &[]).await {
            Ok(_) => Ok(()),
            Err(e) if UNKNOWN_REPOSITORY_ERRORS.iter().any(|f| e.mentions(f)) => {
                debug!(repository = name, "Repository does not exist");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Create a filesystem snapshot repository, optionally dropping it first.
    pub async fn ensure_repository_fs(
        &self,
        name: &str,
        typename: &str,
        location: &str,
        drop: bool,
    ) -> Result<(), SqlError> {
        if drop {
            self.drop_repository(name).await?;
        }
        let sql = format!(
            "CREATE REPOSITORY {} TYPE {} WITH (location = '{}')",
            quote_ident(name),
            typename,
            location.replace('\'', "''"),
        );
        self.executor.execute(&sql, &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records statements and fails those containing a configured fragment.
    #[derive(Default)]
    struct Recorder {
        statements: Mutex<Vec<String>>,
        fail_on: Option<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl SqlExecutor for Recorder {
        async fn execute(&self, stmt: &str, _args: &[Value]) -> Result<SqlResponse, SqlError> {
            self.statements.lock().unwrap().push(stmt.to_string());
            if let Some((fragment, message)) = self.fail_on {
                if stmt.contains(fragment) {
                    return Err(SqlError::Server {
                        code: 4000,
                        message: message.to_string(),
                    });
                }
            }
            Ok(SqlResponse {
                cols: vec!["count".into()],
                rows: vec![vec![json!(42)]],
                rowcount: 1,
            })
        }
    }

    fn adapter(recorder: Recorder) -> (DatabaseAdapter, Arc<Recorder>) {
        let recorder = Arc::new(recorder);
        (DatabaseAdapter::new(recorder.clone()), recorder)
    }

    #[tokio::test]
    async fn test_run_sql_splits_script() {
        let (adapter, recorder) = adapter(Recorder::default());
        let responses = adapter.run_sql("SELECT 1; SELECT 2;").await.unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(
            *recorder.statements.lock().unwrap(),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[tokio::test]
    async fn test_ignore_fragment() {
        let (adapter, _) = adapter(Recorder {
            fail_on: Some(("CREATE", "SchemaAlreadyExistsException[exists]")),
            ..Default::default()
        });
        let result = adapter
            .run_sql_ignoring("CREATE TABLE t (a INT)", Some("AlreadyExists"))
            .await;
        assert!(result.unwrap().is_empty());

        let result = adapter
            .run_sql_ignoring("CREATE TABLE t (a INT)", Some("Unrelated"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_count_and_refresh_quote_table() {
        let (adapter, recorder) = adapter(Recorder::default());
        let table = TableAddress::new("testdrive", "demo");

        assert_eq!(adapter.count_records(&table).await.unwrap(), 42);
        adapter.refresh_table(&table).await.unwrap();
        assert_eq!(
            *recorder.statements.lock().unwrap(),
            vec![
                r#"SELECT COUNT(*) AS count FROM "testdrive"."demo""#,
                r#"REFRESH TABLE "testdrive"."demo""#,
            ]
        );
    }

    #[tokio::test]
    async fn test_table_exists_swallows_errors() {
        let (adapter, _) = adapter(Recorder {
            fail_on: Some(("SELECT", "RelationUnknown[demo]")),
            ..Default::default()
        });
        assert!(!adapter.table_exists(&TableAddress::new("doc", "demo")).await);
        assert!(!adapter.table_exists(&TableAddress::default()).await);
    }

    #[tokio::test]
    async fn test_drop_unknown_repository_is_ok() {
        let (adapter, recorder) = adapter(Recorder {
            fail_on: Some(("DROP", "RepositoryUnknownException[backup]")),
            ..Default::default()
        });
        adapter
            .ensure_repository_fs("backup", "fs", "/snapshots/it's", true)
            .await
            .unwrap();
        let statements = recorder.statements.lock().unwrap();
        assert_eq!(statements[0], r#"DROP REPOSITORY "backup""#);
        assert_eq!(
            statements[1],
            r#"CREATE REPOSITORY "backup" TYPE fs WITH (location = '/snapshots/it''s')"#
        );
    }
}
