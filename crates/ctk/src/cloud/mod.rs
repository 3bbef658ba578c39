//! Client for the CrateDB Cloud control plane.

mod api;
mod model;

pub use api::CloudApi;
pub use model::{
    ClusterInformation, ClusterSpec, DeployRequest, ImportDestination, ImportJobRequest,
    ImportUrl, Project, ProjectRequest,
};

use async_trait::async_trait;

use crate::error::ControlPlaneError;
use crate::job::CloudJob;

/// Operations of the control plane used by the toolkit.
///
/// Implementations must report missing clusters and jobs as
/// [`ControlPlaneError::NotFound`].
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// `GET /api/v2/clusters/{id}/`
    async fn get_cluster(&self, id: &str) -> Result<ClusterInformation, ControlPlaneError>;

    /// Find a cluster by name in `GET /api/v2/clusters/`.
    async fn get_cluster_by_name(&self, name: &str)
    -> Result<ClusterInformation, ControlPlaneError>;

    /// `POST /api/v2/clusters/`. Returns without waiting for the cluster.
    async fn deploy_cluster(&self, request: &DeployRequest) -> Result<(), ControlPlaneError>;

    /// `GET /api/v2/projects/`
    async fn list_projects(&self) -> Result<Vec<Project>, ControlPlaneError>;

    /// `POST /api/v2/projects/`
    async fn create_project(&self, request: &ProjectRequest) -> Result<Project, ControlPlaneError>;

    /// `POST /api/v2/clusters/{id}/import-jobs/`
    async fn submit_import_job(
        &self,
        cluster_id: &str,
        request: &ImportJobRequest,
    ) -> Result<CloudJob, ControlPlaneError>;

    /// `GET /api/v2/clusters/{id}/import-jobs/`
    async fn list_import_jobs(&self, cluster_id: &str) -> Result<Vec<CloudJob>, ControlPlaneError>;
}
