//! cratedb-toolkit-core: building blocks shared by the `ctk` crates.
//!
//! - `model` - database and table addresses, import resources
//! - `sql/` - SQL over the HTTP endpoint: connection, adapter, client bundle
//! - `config/` - YAML configuration loading with environment interpolation
//! - `metrics/` - internal events recorded through the `metrics` facade
//! - `polling` - polling loop trait and runner, settle delay
//! - `tracing` - subscriber setup for the CLI
//! - `error` - common error types

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod polling;
pub mod sql;
pub mod tracing;

// Re-export commonly used items
pub use config::{ConfigArgs, ConfigPath, Mergeable, load_from_paths};
pub use error::{AddressError, ConfigError, SqlError};
pub use model::{DEFAULT_PORT, DatabaseAddress, InputOutputResource, TableAddress};
pub use polling::{PollOutcome, PollingProcessor, run_polling_loop, settle};
pub use sql::{ClientBundle, Credentials, DatabaseAdapter, SqlExecutor, SqlResponse};
pub use tracing::init_tracing;
