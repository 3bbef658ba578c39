//! Error types for the toolkit.

use snafu::prelude::*;

pub use cratedb_toolkit_core::error::{AddressError, ConfigError, SqlError};

/// Errors reported by the cloud control plane or while talking to it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ControlPlaneError {
    /// The addressed resource does not exist.
    #[snafu(display("{resource} not found"))]
    NotFound { resource: String },

    /// The API answered with an error status.
    #[snafu(display("Control plane returned HTTP {status} for {path}: {message}"))]
    Api {
        status: u16,
        path: String,
        message: String,
    },

    /// The HTTP request failed before a response was received.
    #[snafu(display("Request to {url} failed: {source}"))]
    Request { url: String, source: reqwest::Error },

    /// The response body could not be decoded.
    #[snafu(display("Failed to decode response from {url}: {source}"))]
    Decode { url: String, source: reqwest::Error },

    /// No API key or secret is configured.
    #[snafu(display(
        "Missing control plane credentials: configure cloud.api_key/cloud.api_secret \
         or set CRATEDB_CLOUD_API_KEY/CRATEDB_CLOUD_API_SECRET"
    ))]
    MissingCredentials,

    /// The API base URL is invalid.
    #[snafu(display("Invalid control plane URL '{url}': {source}"))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// Building the HTTP client failed.
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild { source: reqwest::Error },
}

impl ControlPlaneError {
    /// Check if this error represents a "not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ControlPlaneError::NotFound { .. })
    }
}

/// Errors that can occur while running an external copy tool.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CopyError {
    /// No tool is configured for this pipeline.
    #[snafu(display("No copy tool configured for pipeline '{pipeline}'"))]
    NotConfigured { pipeline: String },

    /// The tool configuration has no program.
    #[snafu(display("Copy tool for pipeline '{pipeline}' has an empty program"))]
    EmptyProgram { pipeline: String },

    /// The tool process could not be started.
    #[snafu(display("Failed to run '{program}': {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// Classification of [`ClusterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing input. Never retried.
    Configuration,
    /// Error reported by the control plane, propagated unchanged.
    ControlPlane,
    /// The cluster is still absent after deployment.
    DeploymentFailed,
    /// A load, deploy, or connect operation failed.
    OperationFailed,
    /// The requested resource type is not supported.
    NotImplemented,
}

/// Errors of cluster acquisition and data loading.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClusterError {
    #[snafu(display(
        "Failed to address cluster: Either cluster identifier or name needs to be specified"
    ))]
    MissingIdentifier,

    #[snafu(display("Need cluster name to deploy"))]
    DeployWithoutName,

    #[snafu(display("Need cluster identifier to load table"))]
    LoadWithoutId,

    #[snafu(display(
        "Missing cluster selector: use one of --cluster-id, --cluster-name, \
         --cratedb-sqlalchemy-url, or --cratedb-http-url"
    ))]
    MissingSelector,

    #[snafu(display("Cluster selectors are mutually exclusive, got: {}", given.join(", ")))]
    ConflictingSelectors { given: Vec<String> },

    #[snafu(display("Operation requires a managed cluster"))]
    ManagedOnly,

    #[snafu(display("Invalid cluster address: {source}"))]
    InvalidAddress { source: AddressError },

    /// Control plane error raised while probing.
    #[snafu(display("{source}"))]
    ControlPlane { source: ControlPlaneError },

    #[snafu(display("Deployment of cluster failed: {name}"))]
    DeploymentFailed { name: String },

    #[snafu(display("Deploying cluster failed: {name}. Reason: {source}"))]
    DeployRequest {
        name: String,
        source: ControlPlaneError,
    },

    #[snafu(display("Connecting to cluster resource failed: {cluster_id}. Reason: {source}"))]
    ResourceConnect {
        cluster_id: String,
        source: ControlPlaneError,
    },

    /// The import job ended with status `FAILED`.
    #[snafu(display("Data loading failed: {message}{guidance}"))]
    JobFailed { message: String, guidance: String },

    #[snafu(display("Data loading failed: Unknown error"))]
    LoadFailed { source: ControlPlaneError },

    /// A copy tool reported an unsuccessful completion.
    #[snafu(display("Data loading failed"))]
    CopyFailed { pipeline: String },

    #[snafu(display("Data loading failed: {source}"))]
    Copy { source: CopyError },

    #[snafu(display("Importing resource not implemented yet: {url}"))]
    NotImplemented { url: String },

    #[snafu(display("Cluster has no URL yet: {cluster}"))]
    MissingClusterUrl { cluster: String },

    #[snafu(display("Connecting to database cluster failed: {source}"))]
    Connect { source: SqlError },
}

impl ClusterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClusterError::MissingIdentifier
            | ClusterError::DeployWithoutName
            | ClusterError::LoadWithoutId
            | ClusterError::MissingSelector
            | ClusterError::ConflictingSelectors { .. }
            | ClusterError::ManagedOnly
            | ClusterError::InvalidAddress { .. } => ErrorKind::Configuration,
            ClusterError::ControlPlane { .. } => ErrorKind::ControlPlane,
            ClusterError::DeploymentFailed { .. } => ErrorKind::DeploymentFailed,
            ClusterError::DeployRequest { .. }
            | ClusterError::ResourceConnect { .. }
            | ClusterError::JobFailed { .. }
            | ClusterError::LoadFailed { .. }
            | ClusterError::CopyFailed { .. }
            | ClusterError::Copy { .. }
            | ClusterError::MissingClusterUrl { .. }
            | ClusterError::Connect { .. } => ErrorKind::OperationFailed,
            ClusterError::NotImplemented { .. } => ErrorKind::NotImplemented,
        }
    }
}

impl From<ControlPlaneError> for ClusterError {
    fn from(source: ControlPlaneError) -> Self {
        ClusterError::ControlPlane { source }
    }
}

impl From<AddressError> for ClusterError {
    fn from(source: AddressError) -> Self {
        ClusterError::InvalidAddress { source }
    }
}

/// Errors of materialized view management.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MaterializedError {
    #[snafu(display("Materialized view not found: {name}"))]
    ViewNotFound { name: String },

    #[snafu(display("Materialized view name must be '<schema>.<table>', got '{name}'"))]
    InvalidName { name: String },

    #[snafu(display("Materialized view is missing its {field}"))]
    Incomplete { field: &'static str },

    #[snafu(display("Failed to decode materialized view record: {source}"))]
    Record { source: serde_json::Error },

    #[snafu(display("{source}"))]
    Address { source: AddressError },

    #[snafu(display("SQL error: {source}"))]
    Sql { source: SqlError },
}

impl From<SqlError> for MaterializedError {
    fn from(source: SqlError) -> Self {
        MaterializedError::Sql { source }
    }
}

impl From<AddressError> for MaterializedError {
    fn from(source: AddressError) -> Self {
        MaterializedError::Address { source }
    }
}

/// Top-level errors of the `ctk` command.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AppError {
    #[snafu(display("Configuration error: {source}"))]
    Config { source: ConfigError },

    #[snafu(display("{source}"))]
    Cluster { source: ClusterError },

    #[snafu(display("{source}"))]
    Materialized { source: MaterializedError },

    #[snafu(display("{source}"))]
    Cloud { source: ControlPlaneError },

    #[snafu(display("Failed to render output: {source}"))]
    Render { source: serde_json::Error },
}

impl From<ConfigError> for AppError {
    fn from(source: ConfigError) -> Self {
        AppError::Config { source }
    }
}

impl From<ClusterError> for AppError {
    fn from(source: ClusterError) -> Self {
        AppError::Cluster { source }
    }
}

impl From<MaterializedError> for AppError {
    fn from(source: MaterializedError) -> Self {
        AppError::Materialized { source }
    }
}

impl From<ControlPlaneError> for AppError {
    fn from(source: ControlPlaneError) -> Self {
        AppError::Cloud { source }
    }
}
