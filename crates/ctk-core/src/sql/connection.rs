//! Low-level connection to the `/_sql` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use snafu::prelude::*;
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use super::{SqlExecutor, SqlResponse};
use crate::emit;
use crate::error::{
    BodySnafu, ClientBuildSnafu, ClosedSnafu, DecodeSnafu, RequestSnafu, SqlError,
};
use crate::metrics::events::SqlStatementExecuted;
use crate::model::DatabaseAddress;

/// Timeout applied to every SQL request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct ErrorDocument {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    code: i64,
}

/// A connection to one CrateDB cluster.
///
/// Stateless on the wire; "closing" it marks the handle unusable for every
/// holder of the shared `Arc`.
#[derive(Debug)]
pub struct Connection {
    client: reqwest::Client,
    endpoint: Url,
    username: Option<String>,
    password: Option<String>,
    schema: Option<String>,
    closed: AtomicBool,
}

impl Connection {
    /// Prepare a connection to the given address. No request is sent.
    pub fn open(address: &DatabaseAddress, timeout: Duration) -> Result<Self, SqlError> {
        let mut endpoint = address.http_url()?;
        // Credentials travel in the Authorization header, not the URL.
        let _ = endpoint.set_username("");
        let _ = endpoint.set_password(None);
        endpoint.set_query(None);
        endpoint.set_path("/_sql");

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context(ClientBuildSnafu)?;

        info!("Connecting to database cluster at: {}", endpoint);
        Ok(Self {
            client,
            endpoint,
            username: address.username().map(Cow::into_owned),
            password: address.password().map(Cow::into_owned),
            schema: address.schema(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// User name sent with every statement.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Password sent with every statement.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Mark the connection closed. Subsequent statements fail.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(endpoint = %self.endpoint, "Connection closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn send(&self, stmt: &str, args: &[Value]) -> Result<SqlResponse, SqlError> {
        ensure!(
            !self.is_closed(),
            ClosedSnafu {
                endpoint: self.endpoint.to_string()
            }
        );

        debug!(stmt, "Executing SQL statement");
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "stmt": stmt, "args": args }));
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }
        if let Some(schema) = &self.schema {
            request = request.header("Default-Schema", schema);
        }

        let response = request.send().await.context(RequestSnafu {
            endpoint: self.endpoint.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.context(BodySnafu)?;

        if status.is_success() {
            return serde_json::from_str(&body).context(DecodeSnafu);
        }
        match serde_json::from_str::<ErrorDocument>(&body) {
            Ok(document) => Err(SqlError::Server {
                code: document.error.code,
                message: document.error.message,
            }),
            Err(_) => Err(SqlError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl SqlExecutor for Connection {
    async fn execute(&self, stmt: &str, args: &[Value]) -> Result<SqlResponse, SqlError> {
        let started = Instant::now();
        let result = self.send(stmt, args).await;
        emit!(SqlStatementExecuted {
            success: result.is_ok(),
            duration: started.elapsed(),
        });
        result
    }
}

/// Engine handle onto a shared connection.
#[derive(Debug, Clone)]
pub struct Engine {
    connection: Arc<Connection>,
}

impl Engine {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// The underlying connection.
    pub fn connection(&self) -> Arc<Connection> {
        Arc::clone(&self.connection)
    }

    /// Close the shared connection.
    pub fn dispose(&self) {
        self.connection.close();
    }
}

#[async_trait]
impl SqlExecutor for Engine {
    async fn execute(&self, stmt: &str, args: &[Value]) -> Result<SqlResponse, SqlError> {
        self.connection.execute(stmt, args).await
    }
}
