//! Managed clusters on CrateDB Cloud.
//!
//! Acquisition runs as a small state machine:
//!
//! ```text
//! Unknown -> ProbedAbsent -> Deploying -> ProbedPresent
//!                                      \-> DeployFailed
//! ```
//!
//! A cluster found by the first probe goes straight to `ProbedPresent`.

use std::sync::Arc;
use tracing::{error, info, warn};

use cratedb_toolkit_core::emit;
use cratedb_toolkit_core::metrics::events::{ClusterDeployed, ClusterProbed, ProbeOutcome};
use cratedb_toolkit_core::model::{DatabaseAddress, InputOutputResource, TableAddress};
use cratedb_toolkit_core::polling::settle;
use cratedb_toolkit_core::sql::{ClientBundle, Credentials};

use crate::cloud::{ClusterInformation, ClusterSpec, ControlPlane, DeployRequest, ProjectRequest};
use crate::config::{ClusterSettings, DeployConfig};
use crate::error::{ClusterError, ControlPlaneError};
use crate::guide::GuidingTexts;
use crate::job::{CloudJob, JobTracker};

/// Acquisition state of a [`ManagedCluster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Unknown,
    ProbedAbsent,
    Deploying,
    ProbedPresent,
    DeployFailed,
}

/// A cluster on CrateDB Cloud, addressed by id or name.
///
/// Methods take `&mut self`: one instance is one serial session.
pub struct ManagedCluster {
    id: Option<String>,
    name: Option<String>,
    info: Option<ClusterInformation>,
    state: AcquisitionState,
    plane: Arc<dyn ControlPlane>,
    settings: ClusterSettings,
    deploy: DeployConfig,
}

impl std::fmt::Debug for ManagedCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedCluster")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ManagedCluster {
    /// Address a cluster by id and/or name. At least one is required.
    pub fn new(
        id: Option<String>,
        name: Option<String>,
        plane: Arc<dyn ControlPlane>,
    ) -> Result<Self, ClusterError> {
        if id.is_none() && name.is_none() {
            error!("Failed to address cluster: neither identifier nor name given");
            return Err(ClusterError::MissingIdentifier);
        }
        Ok(Self {
            id,
            name,
            info: None,
            state: AcquisitionState::Unknown,
            plane,
            settings: ClusterSettings::default(),
            deploy: DeployConfig::default(),
        })
    }

    pub fn with_settings(mut self, settings: ClusterSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_deploy_config(mut self, deploy: DeployConfig) -> Self {
        self.deploy = deploy;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn info(&self) -> Option<&ClusterInformation> {
        self.info.as_ref()
    }

    pub fn exists(&self) -> bool {
        self.info.is_some()
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_default()
    }

    /// Look the cluster up on the control plane.
    ///
    /// A missing cluster is not an error: `exists()` turns false.
    pub async fn probe(&mut self) -> Result<&mut Self, ClusterError> {
        let result = match (&self.id, &self.name) {
            (Some(id), _) => self.plane.get_cluster(id).await,
            (None, Some(name)) => self.plane.get_cluster_by_name(name).await,
            (None, None) => return Err(ClusterError::MissingIdentifier),
        };

        match result {
            Ok(info) => {
                if self.id.is_none() {
                    self.id = info.id.clone();
                }
                if self.name.is_none() {
                    self.name = info.name.clone();
                }
                info!(
                    "Cluster information: name={}, url={}",
                    info.name.as_deref().unwrap_or_default(),
                    info.url.as_deref().unwrap_or_default()
                );
                self.info = Some(info);
                self.state = AcquisitionState::ProbedPresent;
                emit!(ClusterProbed {
                    outcome: ProbeOutcome::Present
                });
            }
            Err(e) if e.is_not_found() => {
                self.info = None;
                if self.state != AcquisitionState::Deploying {
                    self.state = AcquisitionState::ProbedAbsent;
                }
                emit!(ClusterProbed {
                    outcome: ProbeOutcome::Absent
                });
            }
            Err(e) => {
                emit!(ClusterProbed {
                    outcome: ProbeOutcome::Failed
                });
                error!("Probing cluster failed: {e}");
                return Err(ClusterError::ControlPlane { source: e });
            }
        }
        Ok(self)
    }

    /// Request deployment of the cluster. Does not wait for it.
    pub async fn deploy(&mut self) -> Result<&mut Self, ClusterError> {
        let Some(name) = self.name.clone() else {
            error!("Need cluster name to deploy");
            return Err(ClusterError::DeployWithoutName);
        };

        let request = match self.deploy_request(&name).await {
            Ok(request) => request,
            Err(source) => {
                error!("Deploying cluster failed: {name}: {source}");
                return Err(ClusterError::DeployRequest { name, source });
            }
        };
        if let Err(source) = self.plane.deploy_cluster(&request).await {
            error!("Deploying cluster failed: {name}: {source}");
            return Err(ClusterError::DeployRequest { name, source });
        }

        self.state = AcquisitionState::Deploying;
        emit!(ClusterDeployed {
            cluster: name.clone()
        });
        Ok(self)
    }

    /// Configured project, else the project named after the cluster, else a new one.
    async fn deploy_request(&self, name: &str) -> Result<DeployRequest, ControlPlaneError> {
        let project_id = match &self.deploy.project_id {
            Some(id) => id.clone(),
            None => {
                let existing = self
                    .plane
                    .list_projects()
                    .await?
                    .into_iter()
                    .find(|project| project.name == name);
                match existing {
                    Some(project) => project.id,
                    None => {
                        info!("Creating project: {name}");
                        let request = ProjectRequest {
                            name: name.to_string(),
                            organization_id: self.deploy.organization_id.clone(),
                        };
                        self.plane.create_project(&request).await?.id
                    }
                }
            }
        };

        Ok(DeployRequest {
            cluster: ClusterSpec {
                name: name.to_string(),
                product_name: self.deploy.product_name.clone(),
                product_tier: self.deploy.product_tier.clone(),
                channel: self.deploy.channel.clone(),
                crate_version: self.deploy.version.clone(),
                username: self.deploy.username.clone(),
                password: self.deploy.password.clone(),
            },
            project_id,
            subscription_id: self.deploy.subscription_id.clone(),
        })
    }

    /// Make sure the cluster exists, deploying it when absent.
    ///
    /// After deploying, waits the settle delay and probes exactly once more.
    pub async fn acquire(&mut self) -> Result<&mut Self, ClusterError> {
        self.probe().await?;
        if self.exists() {
            return Ok(self);
        }

        info!(
            "Cluster does not exist, deploying it: id={:?}, name={:?}",
            self.id, self.name
        );
        self.deploy().await?;
        info!("Cluster deployed: id={:?}, name={:?}", self.id, self.name);

        self.settle_and_recheck().await
    }

    async fn settle_and_recheck(&mut self) -> Result<&mut Self, ClusterError> {
        settle(self.settings.settle_delay(), "cluster deployment").await;
        self.probe().await?;
        if !self.exists() {
            self.state = AcquisitionState::DeployFailed;
            let name = self.label();
            error!("Deployment of cluster failed: {name}");
            return Err(ClusterError::DeploymentFailed { name });
        }
        Ok(self)
    }

    /// Start the cluster, deploying it when absent.
    pub async fn start(&mut self) -> Result<&mut Self, ClusterError> {
        info!(
            "Deploying/starting/resuming CrateDB Cloud Cluster: id={:?}, name={:?}",
            self.id, self.name
        );
        self.acquire().await?;
        if self.info.as_ref().is_some_and(|info| info.suspended) {
            warn!("Cluster is suspended, resume it in the Cloud Console");
        }
        Ok(self)
    }

    /// Open the job tracker of this cluster.
    pub async fn jobs(&mut self) -> Result<JobTracker, ClusterError> {
        self.probe().await?;
        let Some(cluster_id) = self.id.clone() else {
            return Err(ClusterError::LoadWithoutId);
        };
        JobTracker::open(
            Arc::clone(&self.plane),
            &cluster_id,
            self.settings.job_poll_interval(),
        )
        .await
        .map_err(|source| {
            error!("Connecting to cluster resource failed: {cluster_id}. Reason: {source}");
            ClusterError::ResourceConnect {
                cluster_id: cluster_id.clone(),
                source,
            }
        })
    }

    /// Load data into a table through an import job.
    pub async fn load_table(
        &mut self,
        source: &InputOutputResource,
        target: &TableAddress,
    ) -> Result<CloudJob, ClusterError> {
        let tracker = match self.jobs().await {
            Err(ClusterError::LoadWithoutId) => {
                error!("Need cluster identifier to load table");
                return Err(ClusterError::LoadWithoutId);
            }
            other => other?,
        };

        let job = match tracker.load_resource(source, target).await {
            Ok(job) => job,
            Err(source) => {
                error!("Data loading failed: Unknown error: {source}");
                return Err(ClusterError::LoadFailed { source });
            }
        };

        match serde_json::to_string_pretty(&job.info) {
            Ok(json) => info!("Job information:\n{json}"),
            Err(_) => info!("Job information: {:?}", job.info),
        }
        let texts = self.guidance(&job);

        if job.success() {
            info!("Data loading was successful: {}", texts.success());
            Ok(job)
        } else {
            let message = job.message().to_string();
            let guidance = texts.error();
            error!("Data loading failed: {message}{guidance}");
            Err(ClusterError::JobFailed { message, guidance })
        }
    }

    /// Guidance texts for a finished job, pointing at the cluster console URL.
    pub fn guidance(&self, job: &CloudJob) -> GuidingTexts {
        let admin_url = self
            .info
            .as_ref()
            .and_then(|info| info.url.clone())
            .unwrap_or_default();
        GuidingTexts::new(admin_url, job.destination_table().unwrap_or_default())
    }

    /// Client handles for the cluster URL, probing first when needed.
    pub async fn client_bundle(
        &mut self,
        credentials: Credentials,
    ) -> Result<ClientBundle, ClusterError> {
        if self.info.is_none() {
            self.probe().await?;
        }
        let Some(url) = self.info.as_ref().and_then(|info| info.url.clone()) else {
            return Err(ClusterError::MissingClusterUrl {
                cluster: self.label(),
            });
        };
        let address = DatabaseAddress::from_http_uri(&url)?;
        ClientBundle::connect(&address, credentials)
            .map_err(|source| ClusterError::Connect { source })
    }
}
