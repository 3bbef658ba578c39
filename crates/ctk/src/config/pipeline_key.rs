//! Identifier of a copy pipeline.
//!
//! Keys name the source system a pipeline reads from, e.g. `influxdb` or
//! `mongodb`, and are matched against the scheme of the source URL.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a copy pipeline in toolkit configuration.
///
/// # Examples
///
/// ```
/// use cratedb_toolkit::config::PipelineKey;
///
/// let key = PipelineKey::new("influxdb");
/// assert_eq!(key.id(), "influxdb");
///
/// assert_eq!(PipelineKey::for_url("influxdb2://localhost:8086/a/b").unwrap().id(), "influxdb");
/// assert!(PipelineKey::for_url("ftp://example.org/data.csv").is_none());
/// ```
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineKey(String);

impl PipelineKey {
    pub const INFLUXDB: &'static str = "influxdb";
    pub const MONGODB: &'static str = "mongodb";

    /// Create a new pipeline key from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying identifier string.
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Pick the pipeline responsible for a source URL by its scheme prefix.
    pub fn for_url(url: &str) -> Option<Self> {
        [Self::INFLUXDB, Self::MONGODB]
            .into_iter()
            .find(|prefix| url.starts_with(prefix))
            .map(Self::new)
    }
}

impl fmt::Display for PipelineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PipelineKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
