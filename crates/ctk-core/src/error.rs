//! Common error types shared by the toolkit crates.
//!
//! This module defines error types for configuration loading, database
//! addressing, and SQL execution.

use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur during configuration parsing and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML: {source}"))]
    YamlParse { source: serde_yaml::Error },

    /// Failed to read configuration file.
    #[snafu(display("Failed to read configuration file: {source}"))]
    ReadFile { source: std::io::Error },

    /// Failed to read configuration directory.
    #[snafu(display("Failed to read directory {}", path.display()))]
    ReadDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    /// Unsupported config file format.
    #[snafu(display("Unsupported config format for {}: only .yaml/.yml supported", path.display()))]
    UnsupportedFormat { path: std::path::PathBuf },

    /// The same named entry is defined by more than one config file.
    #[snafu(display("Duplicate config entries: {}", keys.join(", ")))]
    DuplicateEntries { keys: Vec<String> },

    /// Multiple configuration errors occurred.
    #[snafu(display("Multiple config errors:\n{}", errors.join("\n")))]
    MultipleErrors { errors: Vec<String> },
}

// ============ Address Errors ============

/// Errors that can occur while parsing or rewriting database addresses.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AddressError {
    /// The URL could not be parsed.
    #[snafu(display("Invalid database URL '{url}': {source}"))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// The URL has no host component.
    #[snafu(display("Database URL has no host: {url}"))]
    MissingHost { url: String },

    /// Credentials could not be applied to the URL.
    #[snafu(display("Unable to apply credentials to database URL: {url}"))]
    Credentials { url: String },

    /// A table address without schema and table cannot be rendered.
    #[snafu(display("Uninitialized table address can not be serialized"))]
    UninitializedTable,
}

// ============ SQL Errors ============

/// Errors that can occur while talking to the database over its HTTP endpoint.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SqlError {
    /// The HTTP request failed before a response was received.
    #[snafu(display("SQL request to {endpoint} failed: {source}"))]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The database rejected the statement.
    #[snafu(display("{message} (code {code})"))]
    Server { code: i64, message: String },

    /// The response body could not be read.
    #[snafu(display("Failed to read SQL response: {source}"))]
    Body { source: reqwest::Error },

    /// The response body is not a valid SQL result document.
    #[snafu(display("Failed to decode SQL response: {source}"))]
    Decode { source: serde_json::Error },

    /// The HTTP status indicated failure without a structured error body.
    #[snafu(display("SQL endpoint returned HTTP {status}: {body}"))]
    Status { status: u16, body: String },

    /// The shared connection has been closed.
    #[snafu(display("Connection to {endpoint} is closed"))]
    Closed { endpoint: String },

    /// Building the HTTP client failed.
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild { source: reqwest::Error },

    /// The database address could not be turned into an endpoint.
    #[snafu(display("Invalid database address: {source}"))]
    Address { source: AddressError },
}

impl SqlError {
    /// Check whether the error text contains the given fragment.
    ///
    /// Used to tolerate expected failures, e.g. `RepositoryUnknownException`.
    pub fn mentions(&self, fragment: &str) -> bool {
        self.to_string().contains(fragment)
    }
}

impl From<AddressError> for SqlError {
    fn from(source: AddressError) -> Self {
        SqlError::Address { source }
    }
}
