//! SQL access to CrateDB over its HTTP endpoint.
//!
//! - `connection`: the low-level connection and the engine handle
//! - `adapter`: convenience operations on top of any [`SqlExecutor`]
//! - `bundle`: the three handles handed out for a resolved cluster
//! - `split`: multi-statement splitting

mod adapter;
mod bundle;
mod connection;
mod split;

pub use adapter::DatabaseAdapter;
pub use bundle::{ClientBundle, Credentials};
pub use connection::{Connection, DEFAULT_REQUEST_TIMEOUT, Engine};
pub use split::split_statements;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SqlError;

/// Result document of one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlResponse {
    #[serde(default)]
    pub cols: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(default = "unknown_rowcount")]
    pub rowcount: i64,
}

fn unknown_rowcount() -> i64 {
    -1
}

impl SqlResponse {
    /// Rows as maps keyed by column name.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.cols
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }

    /// First column of the first row.
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Anything that can run a single SQL statement.
///
/// Implemented by [`Connection`], [`Engine`], and test doubles.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute one statement with positional `?` arguments.
    async fn execute(&self, stmt: &str, args: &[Value]) -> Result<SqlResponse, SqlError>;
}
