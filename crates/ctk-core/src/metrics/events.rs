//! Internal events for toolkit metrics emission.
//!
//! Each event struct represents a measurable occurrence while acquiring
//! clusters, loading data or talking SQL. Events implement the
//! `InternalEvent` trait which records the corresponding metric.

use metrics::{counter, histogram};
use std::time::Duration;
use tracing::trace;

/// Trait for internal events that can be emitted as metrics.
pub trait InternalEvent {
    /// Emit this event as a metric.
    fn emit(self);
}

/// Outcome of probing a managed cluster.
#[derive(Debug, Clone, Copy)]
pub enum ProbeOutcome {
    Present,
    Absent,
    Failed,
}

impl ProbeOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::Present => "present",
            ProbeOutcome::Absent => "absent",
            ProbeOutcome::Failed => "failed",
        }
    }
}

/// Event emitted after each control-plane probe.
pub struct ClusterProbed {
    pub outcome: ProbeOutcome,
}

impl InternalEvent for ClusterProbed {
    fn emit(self) {
        trace!(outcome = self.outcome.as_str(), "Cluster probed");
        counter!("ctk_cluster_probes_total", "outcome" => self.outcome.as_str()).increment(1);
    }
}

/// Event emitted when a cluster deployment was requested.
pub struct ClusterDeployed {
    pub cluster: String,
}

impl InternalEvent for ClusterDeployed {
    fn emit(self) {
        trace!(cluster = %self.cluster, "Cluster deployment requested");
        counter!("ctk_cluster_deployments_total").increment(1);
    }
}

/// Event emitted for each status poll of an import job.
pub struct JobPolled {
    pub status: String,
}

impl InternalEvent for JobPolled {
    fn emit(self) {
        trace!(status = %self.status, "Import job polled");
        counter!("ctk_job_polls_total").increment(1);
    }
}

/// Event emitted when an import job reached a terminal status.
pub struct JobCompleted {
    pub status: String,
    pub duration: Duration,
}

impl InternalEvent for JobCompleted {
    fn emit(self) {
        trace!(status = %self.status, duration_ms = self.duration.as_millis(), "Import job completed");
        histogram!("ctk_job_duration_seconds").record(self.duration.as_secs_f64());
        counter!("ctk_jobs_completed_total", "status" => self.status).increment(1);
    }
}

/// Event emitted after each SQL statement round trip.
pub struct SqlStatementExecuted {
    pub success: bool,
    pub duration: Duration,
}

impl InternalEvent for SqlStatementExecuted {
    fn emit(self) {
        let outcome = if self.success { "success" } else { "error" };
        trace!(outcome, duration_ms = self.duration.as_millis(), "SQL statement executed");
        histogram!("ctk_sql_statement_duration_seconds").record(self.duration.as_secs_f64());
        counter!("ctk_sql_statements_total", "outcome" => outcome).increment(1);
    }
}

/// Event emitted when an external copy pipeline finished.
pub struct CopyPipelineRun {
    pub pipeline: String,
    pub success: bool,
    pub duration: Duration,
}

impl InternalEvent for CopyPipelineRun {
    fn emit(self) {
        let outcome = if self.success { "success" } else { "failed" };
        trace!(pipeline = %self.pipeline, outcome, "Copy pipeline finished");
        histogram!("ctk_copy_pipeline_duration_seconds", "pipeline" => self.pipeline.clone())
            .record(self.duration.as_secs_f64());
        counter!("ctk_copy_pipeline_runs_total", "pipeline" => self.pipeline, "outcome" => outcome)
            .increment(1);
    }
}

/// Event emitted once per polling-loop iteration.
pub struct PollIteration {
    pub target: String,
    pub ready: bool,
}

impl InternalEvent for PollIteration {
    fn emit(self) {
        let result = if self.ready { "ready" } else { "pending" };
        trace!(target = %self.target, result, "Poll iteration");
        counter!("ctk_poll_iterations_total", "target" => self.target, "result" => result)
            .increment(1);
    }
}
