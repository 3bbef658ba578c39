//! CrateDB Toolkit: cluster acquisition and data loading.
//!
//! This crate handles:
//! - Probing, deploying and starting managed clusters on CrateDB Cloud
//! - Loading data through control-plane import jobs, tracked to completion
//! - Copying data from InfluxDB and MongoDB into standalone clusters
//! - Handing out SQL client handles for a resolved cluster
//! - Refreshing materialized views

pub mod cli;
pub mod cloud;
pub mod cluster;
pub mod config;
pub mod error;
pub mod guide;
pub mod io;
pub mod job;
pub mod materialized;
pub mod toolkit;

// Re-export commonly used items
pub use cloud::{CloudApi, ClusterInformation, ControlPlane};
pub use cluster::{
    AcquisitionState, Cluster, ClusterSelector, LoadOutcome, ManagedCluster, StandaloneCluster,
};
pub use config::ToolkitConfig;
pub use error::{ClusterError, ErrorKind};
pub use job::{CloudJob, JobTracker};
pub use toolkit::Toolkit;

// Re-export from cratedb-toolkit-core
pub use cratedb_toolkit_core::{
    ClientBundle, Credentials, DatabaseAdapter, DatabaseAddress, InputOutputResource,
    TableAddress, init_tracing,
};
