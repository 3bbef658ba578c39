//! Configuration for the `ctk` command and library.
//!
//! Every section is optional. Values missing from the files fall back to
//! environment variables where noted, then to the documented defaults.

mod pipeline_key;

pub use pipeline_key::PipelineKey;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::mem;
use std::time::Duration;

use cratedb_toolkit_core::config::{ConfigPath, Mergeable, load_from_paths};
use cratedb_toolkit_core::model::TableAddress;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://console.cratedb.cloud";
pub const API_URL_ENV: &str = "CRATEDB_CLOUD_API_URL";
pub const API_KEY_ENV: &str = "CRATEDB_CLOUD_API_KEY";
pub const API_SECRET_ENV: &str = "CRATEDB_CLOUD_API_SECRET";

/// Delay between requesting a deployment and probing the cluster again.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(3250);
pub const DEFAULT_JOB_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Schema of the materialized view management table.
pub const DEFAULT_EXT_SCHEMA: &str = "ext";
pub const EXT_SCHEMA_ENV: &str = "CRATEDB_EXT_SCHEMA";
pub const DEFAULT_MATERIALIZED_TABLE: &str = "materialized_view";

/// Control plane access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// HTTP client timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl CloudConfig {
    /// Configured URL, else `CRATEDB_CLOUD_API_URL`, else the public console.
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .or_else(|| env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| env::var(API_KEY_ENV).ok())
    }

    pub fn api_secret(&self) -> Option<String> {
        self.api_secret
            .clone()
            .or_else(|| env::var(API_SECRET_ENV).ok())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(30))
    }
}

/// Timing of cluster acquisition and job tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    pub settle_delay_ms: u64,
    pub job_poll_interval_ms: u64,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            job_poll_interval_ms: DEFAULT_JOB_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl ClusterSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn job_poll_interval(&self) -> Duration {
        Duration::from_millis(self.job_poll_interval_ms)
    }
}

/// Parameters for deploying a new cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub organization_id: Option<String>,
    pub project_id: Option<String>,
    pub subscription_id: Option<String>,
    pub product_name: String,
    pub product_tier: String,
    pub channel: String,
    pub version: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            organization_id: None,
            project_id: None,
            subscription_id: None,
            product_name: "crfree".to_string(),
            product_tier: "default".to_string(),
            channel: "stable".to_string(),
            version: None,
            username: None,
            password: None,
        }
    }
}

/// External tool run by a copy pipeline.
///
/// `{source}` and `{target}` in `args` are replaced by the source URL and the
/// target database URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolConfig {
    /// Tool used for `influxdb` sources unless configured otherwise.
    pub fn influxio() -> Self {
        Self {
            program: "influxio".to_string(),
            args: vec!["copy".into(), "{source}".into(), "{target}".into()],
        }
    }
}

/// Location of the materialized view management table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializedConfig {
    pub schema: Option<String>,
    pub table: Option<String>,
}

impl MaterializedConfig {
    /// Configured schema, else `CRATEDB_EXT_SCHEMA`, else [`DEFAULT_EXT_SCHEMA`].
    pub fn table_address(&self) -> TableAddress {
        let schema = self
            .schema
            .clone()
            .or_else(|| env::var(EXT_SCHEMA_ENV).ok())
            .unwrap_or_else(|| DEFAULT_EXT_SCHEMA.to_string());
        let table = self
            .table
            .clone()
            .unwrap_or_else(|| DEFAULT_MATERIALIZED_TABLE.to_string());
        TableAddress::new(schema, table)
    }
}

/// Main configuration for the toolkit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolkitConfig {
    pub cloud: CloudConfig,
    pub cluster: ClusterSettings,
    pub deploy: DeployConfig,
    /// Copy tools keyed by pipeline name.
    pub pipelines: IndexMap<PipelineKey, ToolConfig>,
    pub materialized: MaterializedConfig,
}

/// Replace `target` with `other` unless `other` is the default.
fn take_if_set<T: Default + PartialEq>(target: &mut T, other: &mut T) {
    if *other != T::default() {
        *target = mem::take(other);
    }
}

impl Mergeable for ToolkitConfig {
    type Key = PipelineKey;
    type Entry = ToolConfig;

    fn entries_mut(&mut self) -> &mut IndexMap<PipelineKey, ToolConfig> {
        &mut self.pipelines
    }

    fn merge_settings(&mut self, other: &mut Self) {
        take_if_set(&mut self.cloud, &mut other.cloud);
        take_if_set(&mut self.cluster, &mut other.cluster);
        take_if_set(&mut self.deploy, &mut other.deploy);
        take_if_set(&mut self.materialized, &mut other.materialized);
    }

    fn parse_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|source| ConfigError::YamlParse { source })
    }
}

impl ToolkitConfig {
    /// Load and merge configuration from files and directories.
    ///
    /// No paths yields the default configuration.
    pub fn from_paths(paths: &[ConfigPath]) -> Result<Self, ConfigError> {
        load_from_paths(paths)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let result = cratedb_toolkit_core::config::interpolate(contents);
        if !result.is_ok() {
            return Err(ConfigError::EnvInterpolation {
                message: result.errors.join("\n"),
            });
        }
        Self::parse_yaml(&result.text)
    }

    /// Tool for the given pipeline, falling back to the built-in defaults.
    pub fn tool(&self, key: &PipelineKey) -> Option<ToolConfig> {
        self.pipelines.get(key).cloned().or_else(|| {
            (key.id() == PipelineKey::INFLUXDB).then(ToolConfig::influxio)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ToolkitConfig::default();
        assert_eq!(config.cluster.settle_delay(), Duration::from_millis(3250));
        assert_eq!(config.deploy.product_name, "crfree");
        assert_eq!(config.cloud.timeout(), Duration::from_secs(30));
        assert!(config.pipelines.is_empty());
    }

    #[test]
    fn test_parse_sections() {
        let config = ToolkitConfig::parse(
            r#"
cloud:
  api_url: https://console.example.org
  api_key: key
cluster:
  settle_delay_ms: 10
  job_poll_interval_ms: 20
pipelines:
  mongodb:
    program: mongo-copy
    args: ["{source}", "{target}"]
materialized:
  schema: views
"#,
        )
        .unwrap();

        assert_eq!(config.cloud.api_url(), "https://console.example.org");
        assert_eq!(config.cloud.api_key().as_deref(), Some("key"));
        assert_eq!(config.cluster.job_poll_interval(), Duration::from_millis(20));
        assert_eq!(
            config.materialized.table_address(),
            TableAddress::new("views", "materialized_view")
        );
        assert_eq!(
            config.tool(&PipelineKey::new("mongodb")).unwrap().program,
            "mongo-copy"
        );
    }

    #[test]
    fn test_builtin_tools() {
        let config = ToolkitConfig::default();
        assert_eq!(
            config.tool(&PipelineKey::new("influxdb")),
            Some(ToolConfig::influxio())
        );
        assert_eq!(config.tool(&PipelineKey::new("mongodb")), None);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(ToolkitConfig::parse("clusters: {}").is_err());
    }

    #[test]
    fn test_merge_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("10-cloud.yaml");
        let second = dir.path().join("20-cluster.yaml");
        writeln!(
            std::fs::File::create(&first).unwrap(),
            "cloud:\n  api_key: key\npipelines:\n  mongodb:\n    program: a"
        )
        .unwrap();
        writeln!(
            std::fs::File::create(&second).unwrap(),
            "cluster:\n  settle_delay_ms: 5"
        )
        .unwrap();

        let config = ToolkitConfig::from_paths(&[ConfigPath::dir(dir.path())]).unwrap();
        assert_eq!(config.cloud.api_key.as_deref(), Some("key"));
        assert_eq!(config.cluster.settle_delay_ms, 5);
        assert_eq!(config.pipelines.len(), 1);
    }

    #[test]
    fn test_duplicate_pipelines_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.yaml", "b.yaml"] {
            writeln!(
                std::fs::File::create(dir.path().join(name)).unwrap(),
                "pipelines:\n  mongodb:\n    program: x"
            )
            .unwrap();
        }
        let err = ToolkitConfig::from_paths(&[ConfigPath::dir(dir.path())]).unwrap_err();
        assert!(err.to_string().contains("mongodb"));
    }
}
