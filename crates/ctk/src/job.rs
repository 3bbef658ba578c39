//! Import jobs on the control plane.
//!
//! A [`JobTracker`] submits an import job for one cluster and polls the
//! job listing until the job reaches a terminal status.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use cratedb_toolkit_core::emit;
use cratedb_toolkit_core::metrics::events::{JobCompleted, JobPolled};
use cratedb_toolkit_core::model::{InputOutputResource, TableAddress};
use cratedb_toolkit_core::polling::{PollOutcome, PollingProcessor, run_polling_loop};

use crate::cloud::{ControlPlane, ImportDestination, ImportJobRequest, ImportUrl};
use crate::error::ControlPlaneError;

pub const STATUS_SUCCEEDED: &str = "SUCCEEDED";
pub const STATUS_FAILED: &str = "FAILED";

/// An import job as reported by the control plane.
///
/// Status values other than `SUCCEEDED` and `FAILED` are non-terminal and
/// kept as opaque strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CloudJob {
    pub info: Value,
}

impl CloudJob {
    pub fn new(info: Value) -> Self {
        Self { info }
    }

    fn text(&self, pointer: &str) -> Option<&str> {
        self.info.pointer(pointer).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.text("/id")
    }

    pub fn status(&self) -> &str {
        self.text("/status").unwrap_or("UNKNOWN")
    }

    /// Progress message, which carries the failure reason of failed jobs.
    pub fn message(&self) -> &str {
        self.text("/progress/message").unwrap_or_default()
    }

    pub fn destination_table(&self) -> Option<&str> {
        self.text("/destination/table")
    }

    pub fn records(&self) -> Option<u64> {
        self.info.pointer("/progress/records").and_then(Value::as_u64)
    }

    pub fn failed_records(&self) -> Option<u64> {
        self.info
            .pointer("/progress/failed_records")
            .and_then(Value::as_u64)
    }

    pub fn success(&self) -> bool {
        self.status() == STATUS_SUCCEEDED
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status(), STATUS_SUCCEEDED | STATUS_FAILED)
    }
}

/// Build an import request for `resource`, inferring what is not given.
///
/// The format comes from the file suffix (`.csv`, `.json`, `.jsonl`,
/// `.ndjson`, `.parquet`), a trailing `.gz` means gzip, and the table name
/// defaults to the file name without suffixes.
pub fn import_request(resource: &InputOutputResource, target: &TableAddress) -> ImportJobRequest {
    let file_name = resource
        .url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mut suffixes = file_name.split('.');
    let stem = suffixes.next().unwrap_or_default().to_string();
    let suffixes: Vec<&str> = suffixes.collect();

    let compression = resource
        .compression
        .clone()
        .or_else(|| suffixes.contains(&"gz").then(|| "gzip".to_string()));
    let format = resource.format.clone().unwrap_or_else(|| {
        let format = suffixes.iter().rev().find_map(|suffix| match *suffix {
            "csv" => Some("csv"),
            "json" | "jsonl" | "ndjson" => Some("json"),
            "parquet" => Some("parquet"),
            _ => None,
        });
        format.unwrap_or("csv").to_string()
    });

    let table = target.table.clone().unwrap_or(stem);
    let table = match &target.schema {
        Some(schema) => format!("{schema}.{table}"),
        None => table,
    };

    ImportJobRequest {
        kind: "url".to_string(),
        url: ImportUrl {
            url: resource.url.clone(),
        },
        format,
        compression,
        destination: ImportDestination {
            table,
            create_table: true,
        },
    }
}

/// Import jobs of one cluster.
pub struct JobTracker {
    plane: Arc<dyn ControlPlane>,
    cluster_id: String,
    poll_interval: Duration,
}

impl JobTracker {
    /// Open the import-job resource of a cluster.
    ///
    /// Lists the jobs once, so an unreachable or unknown cluster fails here.
    pub async fn open(
        plane: Arc<dyn ControlPlane>,
        cluster_id: &str,
        poll_interval: Duration,
    ) -> Result<Self, ControlPlaneError> {
        plane.list_import_jobs(cluster_id).await?;
        Ok(Self {
            plane,
            cluster_id: cluster_id.to_string(),
            poll_interval,
        })
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub async fn list(&self) -> Result<Vec<CloudJob>, ControlPlaneError> {
        self.plane.list_import_jobs(&self.cluster_id).await
    }

    pub async fn submit(&self, request: &ImportJobRequest) -> Result<CloudJob, ControlPlaneError> {
        let job = self
            .plane
            .submit_import_job(&self.cluster_id, request)
            .await?;
        info!(
            job_id = job.id().unwrap_or("unknown"),
            status = job.status(),
            "Import job submitted"
        );
        Ok(job)
    }

    /// Current state of the job with the given id.
    pub async fn find(&self, job_id: &str) -> Result<CloudJob, ControlPlaneError> {
        self.list()
            .await?
            .into_iter()
            .find(|job| job.id() == Some(job_id))
            .ok_or_else(|| ControlPlaneError::NotFound {
                resource: format!("Import job '{job_id}'"),
            })
    }

    /// Poll until the job reaches a terminal status.
    pub async fn wait(&self, job: CloudJob) -> Result<CloudJob, ControlPlaneError> {
        if job.is_terminal() {
            return Ok(job);
        }
        let Some(job_id) = job.id().map(str::to_string) else {
            return Err(ControlPlaneError::NotFound {
                resource: "Import job without identifier".to_string(),
            });
        };
        let mut poll = JobPoll {
            tracker: self,
            job_id,
        };
        run_polling_loop(&mut poll, self.poll_interval, "import-job").await
    }

    /// Submit an import of `resource` into `target` and wait for it.
    pub async fn load_resource(
        &self,
        resource: &InputOutputResource,
        target: &TableAddress,
    ) -> Result<CloudJob, ControlPlaneError> {
        let started = Instant::now();
        let request = import_request(resource, target);
        let job = self.submit(&request).await?;
        let job = self.wait(job).await?;
        emit!(JobCompleted {
            status: job.status().to_string(),
            duration: started.elapsed(),
        });
        Ok(job)
    }
}

struct JobPoll<'a> {
    tracker: &'a JobTracker,
    job_id: String,
}

#[async_trait]
impl PollingProcessor for JobPoll<'_> {
    type Output = CloudJob;
    type Error = ControlPlaneError;

    async fn poll(&mut self) -> Result<PollOutcome<CloudJob>, ControlPlaneError> {
        let job = self.tracker.find(&self.job_id).await?;
        emit!(JobPolled {
            status: job.status().to_string(),
        });
        debug!(job_id = %self.job_id, status = job.status(), "Import job status");
        if job.is_terminal() {
            Ok(PollOutcome::Ready(job))
        } else {
            Ok(PollOutcome::Pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_accessors() {
        let job = CloudJob::new(json!({
            "id": "job-1",
            "status": "FAILED",
            "destination": {"table": "basic"},
            "progress": {"message": "Invalid CSV", "records": 10, "failed_records": 3}
        }));
        assert_eq!(job.id(), Some("job-1"));
        assert_eq!(job.destination_table(), Some("basic"));
        assert_eq!(job.message(), "Invalid CSV");
        assert_eq!(job.records(), Some(10));
        assert_eq!(job.failed_records(), Some(3));
        assert!(job.is_terminal());
        assert!(!job.success());
    }

    #[test]
    fn test_unknown_status_is_not_terminal() {
        let job = CloudJob::new(json!({"id": "job-2", "status": "IN_PROGRESS"}));
        assert!(!job.is_terminal());
        assert_eq!(job.message(), "");
        assert_eq!(CloudJob::new(json!({})).status(), "UNKNOWN");
    }

    #[test]
    fn test_import_request_inference() {
        let resource = InputOutputResource::new(
            "https://github.com/crate/cratedb-datasets/raw/main/cloud-tutorials/data_weather.csv.gz",
        );
        let request = import_request(&resource, &TableAddress::default());
        assert_eq!(request.format, "csv");
        assert_eq!(request.compression.as_deref(), Some("gzip"));
        assert_eq!(request.destination.table, "data_weather");
    }

    #[test]
    fn test_import_request_explicit_values() {
        let resource = InputOutputResource::new("https://example.org/export?id=1")
            .with_format(Some("parquet".into()))
            .with_compression(None);
        let target = TableAddress::new("testdrive", "demo");
        let request = import_request(&resource, &target);
        assert_eq!(request.format, "parquet");
        assert_eq!(request.compression, None);
        assert_eq!(request.destination.table, "testdrive.demo");
    }

    #[test]
    fn test_import_request_ndjson() {
        let resource = InputOutputResource::new("https://example.org/events.ndjson");
        let request = import_request(&resource, &TableAddress::default());
        assert_eq!(request.format, "json");
        assert_eq!(request.destination.table, "events");
    }
}
