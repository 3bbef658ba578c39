//! Managed and standalone clusters behind one contract.

mod managed;
mod selector;
mod standalone;

pub use managed::{AcquisitionState, ManagedCluster};
pub use selector::{ClusterSelector, SelectedCluster};
pub use standalone::StandaloneCluster;

use cratedb_toolkit_core::model::{InputOutputResource, TableAddress};
use cratedb_toolkit_core::sql::{ClientBundle, Credentials};

use crate::error::ClusterError;
use crate::job::CloudJob;

/// What a successful `load_table` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A managed cluster import job that succeeded.
    Job(CloudJob),
    /// A standalone copy pipeline that succeeded.
    Copied,
}

/// A cluster of either kind.
#[derive(Debug)]
pub enum Cluster {
    Managed(ManagedCluster),
    Standalone(StandaloneCluster),
}

impl Cluster {
    pub async fn load_table(
        &mut self,
        source: &InputOutputResource,
        target: &TableAddress,
    ) -> Result<LoadOutcome, ClusterError> {
        match self {
            Cluster::Managed(cluster) => {
                let job = cluster.load_table(source, target).await?;
                Ok(LoadOutcome::Job(job))
            }
            Cluster::Standalone(cluster) => {
                cluster.load_table(source, target).await?;
                Ok(LoadOutcome::Copied)
            }
        }
    }

    pub async fn client_bundle(
        &mut self,
        credentials: Credentials,
    ) -> Result<ClientBundle, ClusterError> {
        match self {
            Cluster::Managed(cluster) => cluster.client_bundle(credentials).await,
            Cluster::Standalone(cluster) => cluster.client_bundle(credentials),
        }
    }

    pub fn as_managed(&mut self) -> Result<&mut ManagedCluster, ClusterError> {
        match self {
            Cluster::Managed(cluster) => Ok(cluster),
            Cluster::Standalone(_) => Err(ClusterError::ManagedOnly),
        }
    }
}
