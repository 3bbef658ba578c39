//! Copy pipelines moving data from other systems into CrateDB.

mod external;

pub use external::ExternalTool;

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

use crate::config::{PipelineKey, ToolkitConfig};
use crate::error::CopyError;

/// A pipeline copying from a source URL into a target database URL.
#[async_trait]
pub trait CopyPipeline: Send + Sync {
    /// Run the copy. `Ok(false)` means the pipeline ran but did not succeed.
    async fn copy(&self, source: &str, target: &str) -> Result<bool, CopyError>;
}

/// Copy pipelines by key.
#[derive(Clone, Default)]
pub struct PipelineRegistry {
    pipelines: IndexMap<PipelineKey, Arc<dyn CopyPipeline>>,
}

impl std::fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.pipelines.keys()).finish()
    }
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// External tools for every known pipeline that has a tool configured.
    pub fn from_config(config: &ToolkitConfig) -> Self {
        let mut registry = Self::new();
        for id in [PipelineKey::INFLUXDB, PipelineKey::MONGODB] {
            let key = PipelineKey::new(id);
            if let Some(tool) = config.tool(&key) {
                registry = registry.with(key.clone(), Arc::new(ExternalTool::new(key, tool)));
            }
        }
        for (key, tool) in &config.pipelines {
            if !registry.pipelines.contains_key(key) {
                registry = registry.with(
                    key.clone(),
                    Arc::new(ExternalTool::new(key.clone(), tool.clone())),
                );
            }
        }
        registry
    }

    pub fn with(mut self, key: impl Into<PipelineKey>, pipeline: Arc<dyn CopyPipeline>) -> Self {
        self.pipelines.insert(key.into(), pipeline);
        self
    }

    pub fn get(&self, key: &PipelineKey) -> Result<Arc<dyn CopyPipeline>, CopyError> {
        self.pipelines
            .get(key)
            .cloned()
            .ok_or_else(|| CopyError::NotConfigured {
                pipeline: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_from_default_config() {
        let registry = PipelineRegistry::from_config(&ToolkitConfig::default());
        assert!(registry.get(&PipelineKey::new("influxdb")).is_ok());
        let err = registry.get(&PipelineKey::new("mongodb")).err().unwrap();
        assert!(matches!(err, CopyError::NotConfigured { .. }));
    }
}
