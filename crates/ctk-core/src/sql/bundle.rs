//! Client handles for a resolved cluster.

use std::env;
use std::sync::Arc;

use super::{Connection, DEFAULT_REQUEST_TIMEOUT, DatabaseAdapter, Engine};
use crate::error::SqlError;
use crate::model::DatabaseAddress;

pub const USERNAME_ENV: &str = "CRATEDB_USERNAME";
pub const PASSWORD_ENV: &str = "CRATEDB_PASSWORD";

/// Database credentials, each part optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    /// Fill missing parts from `CRATEDB_USERNAME` and `CRATEDB_PASSWORD`.
    pub fn or_env(self) -> Self {
        Self {
            username: self.username.or_else(|| env::var(USERNAME_ENV).ok()),
            password: self.password.or_else(|| env::var(PASSWORD_ENV).ok()),
        }
    }
}

/// Three handles onto the same connection.
///
/// Closing the connection through any of them closes it for all.
#[derive(Debug, Clone)]
pub struct ClientBundle {
    pub adapter: DatabaseAdapter,
    pub connection: Arc<Connection>,
    pub engine: Engine,
}

impl ClientBundle {
    /// Connect to `address`, applying `credentials` on top of the ones it carries.
    pub fn connect(address: &DatabaseAddress, credentials: Credentials) -> Result<Self, SqlError> {
        let credentials = credentials.or_env();
        let address = address.with_credentials(
            credentials.username.as_deref(),
            credentials.password.as_deref(),
        )?;
        let connection = Arc::new(Connection::open(&address, DEFAULT_REQUEST_TIMEOUT)?);
        Ok(Self {
            adapter: DatabaseAdapter::new(connection.clone()),
            engine: Engine::new(Arc::clone(&connection)),
            connection,
        })
    }
}
