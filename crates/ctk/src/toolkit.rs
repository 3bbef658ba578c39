//! Entry point tying configuration, control plane, and pipelines together.

use std::sync::{Arc, OnceLock};

use crate::cloud::{CloudApi, ControlPlane};
use crate::cluster::{
    Cluster, ClusterSelector, ManagedCluster, SelectedCluster, StandaloneCluster,
};
use crate::config::ToolkitConfig;
use crate::error::{ClusterError, ControlPlaneError};
use crate::io::PipelineRegistry;

/// Builds clusters from a selection.
///
/// The control plane client is created on first use, so standalone work
/// needs no cloud credentials.
pub struct Toolkit {
    config: ToolkitConfig,
    plane: OnceLock<Arc<dyn ControlPlane>>,
    pipelines: PipelineRegistry,
}

impl Toolkit {
    pub fn new(config: ToolkitConfig) -> Self {
        let pipelines = PipelineRegistry::from_config(&config);
        Self {
            config,
            plane: OnceLock::new(),
            pipelines,
        }
    }

    /// Use the given control plane instead of the HTTP client.
    pub fn with_control_plane(self, plane: Arc<dyn ControlPlane>) -> Self {
        let _ = self.plane.set(plane);
        self
    }

    pub fn with_pipelines(mut self, pipelines: PipelineRegistry) -> Self {
        self.pipelines = pipelines;
        self
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn control_plane(&self) -> Result<Arc<dyn ControlPlane>, ControlPlaneError> {
        if let Some(plane) = self.plane.get() {
            return Ok(Arc::clone(plane));
        }
        let api: Arc<dyn ControlPlane> = Arc::new(CloudApi::from_config(&self.config.cloud)?);
        Ok(Arc::clone(self.plane.get_or_init(|| api)))
    }

    /// Validate the selector and build the matching cluster.
    pub fn cluster(&self, selector: &ClusterSelector) -> Result<Cluster, ClusterError> {
        match selector.resolve()? {
            SelectedCluster::Managed { id, name } => {
                let cluster = ManagedCluster::new(id, name, self.control_plane()?)?
                    .with_settings(self.config.cluster.clone())
                    .with_deploy_config(self.config.deploy.clone());
                Ok(Cluster::Managed(cluster))
            }
            SelectedCluster::Standalone(address) => Ok(Cluster::Standalone(
                StandaloneCluster::new(address, self.pipelines.clone()),
            )),
        }
    }
}
