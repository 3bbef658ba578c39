//! Copy pipeline backed by an external program.

use async_trait::async_trait;
use snafu::prelude::*;
use std::time::Instant;
use tokio::process::Command;
use tracing::{error, info};

use cratedb_toolkit_core::emit;
use cratedb_toolkit_core::metrics::events::CopyPipelineRun;

use super::CopyPipeline;
use crate::config::{PipelineKey, ToolConfig};
use crate::error::{CopyError, EmptyProgramSnafu, SpawnSnafu};

/// Runs a configured program, substituting `{source}` and `{target}`.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    key: PipelineKey,
    tool: ToolConfig,
}

impl ExternalTool {
    pub fn new(key: PipelineKey, tool: ToolConfig) -> Self {
        Self { key, tool }
    }

    /// Arguments with placeholders replaced.
    pub fn arguments(&self, source: &str, target: &str) -> Vec<String> {
        self.tool
            .args
            .iter()
            .map(|arg| arg.replace("{source}", source).replace("{target}", target))
            .collect()
    }
}

#[async_trait]
impl CopyPipeline for ExternalTool {
    async fn copy(&self, source: &str, target: &str) -> Result<bool, CopyError> {
        ensure!(
            !self.tool.program.trim().is_empty(),
            EmptyProgramSnafu {
                pipeline: self.key.to_string()
            }
        );

        let started = Instant::now();
        info!(pipeline = %self.key, program = %self.tool.program, "Running copy tool");
        let status = Command::new(&self.tool.program)
            .args(self.arguments(source, target))
            .status()
            .await
            .context(SpawnSnafu {
                program: self.tool.program.clone(),
            })?;

        let success = status.success();
        if !success {
            error!(pipeline = %self.key, %status, "Copy tool failed");
        }
        emit!(CopyPipelineRun {
            pipeline: self.key.to_string(),
            success,
            duration: started.elapsed(),
        });
        Ok(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_substituted() {
        let tool = ExternalTool::new(PipelineKey::new("influxdb"), ToolConfig::influxio());
        assert_eq!(
            tool.arguments("http://localhost:8086/a/b", "crate://localhost/doc/demo"),
            vec!["copy", "http://localhost:8086/a/b", "crate://localhost/doc/demo"]
        );
    }

    #[tokio::test]
    async fn test_empty_program_rejected() {
        let tool = ExternalTool::new(
            PipelineKey::new("mongodb"),
            ToolConfig {
                program: " ".into(),
                args: vec![],
            },
        );
        let err = tool.copy("mongodb://x", "crate://y").await.unwrap_err();
        assert!(matches!(err, CopyError::EmptyProgram { .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let tool = ExternalTool::new(
            PipelineKey::new("mongodb"),
            ToolConfig {
                program: "ctk-test-no-such-program".into(),
                args: vec![],
            },
        );
        let err = tool.copy("mongodb://x", "crate://y").await.unwrap_err();
        assert!(matches!(err, CopyError::Spawn { .. }));
    }
}
