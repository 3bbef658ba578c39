//! Standalone clusters addressed by a fixed database URL.

use tracing::{error, info};

use cratedb_toolkit_core::model::{DatabaseAddress, InputOutputResource, TableAddress};
use cratedb_toolkit_core::sql::{ClientBundle, Credentials};

use crate::config::PipelineKey;
use crate::error::ClusterError;
use crate::io::PipelineRegistry;

/// A self-hosted CrateDB cluster.
#[derive(Debug, Clone)]
pub struct StandaloneCluster {
    address: DatabaseAddress,
    pipelines: PipelineRegistry,
}

impl StandaloneCluster {
    pub fn new(address: DatabaseAddress, pipelines: PipelineRegistry) -> Self {
        Self { address, pipelines }
    }

    pub fn address(&self) -> &DatabaseAddress {
        &self.address
    }

    /// Copy data from another database into a table.
    ///
    /// `influxdb...` sources go through the InfluxDB pipeline, with
    /// `influxdb2://` rewritten to `http://`. `mongodb...` sources go through
    /// the MongoDB pipeline unchanged.
    pub async fn load_table(
        &self,
        source: &InputOutputResource,
        target: &TableAddress,
    ) -> Result<(), ClusterError> {
        let Some(key) = PipelineKey::for_url(&source.url) else {
            error!("Importing resource not implemented yet: {}", source.url);
            return Err(ClusterError::NotImplemented {
                url: source.url.clone(),
            });
        };
        let source_url = if key.id() == PipelineKey::INFLUXDB {
            source.url.replace("influxdb2://", "http://")
        } else {
            source.url.clone()
        };
        let target_url = self.address.with_table(target).dburi();

        let pipeline = self
            .pipelines
            .get(&key)
            .map_err(|source| ClusterError::Copy { source })?;
        info!(pipeline = %key, target = %self.address.with_table(target), "Loading table");
        match pipeline.copy(&source_url, &target_url).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!("Data loading failed");
                Err(ClusterError::CopyFailed {
                    pipeline: key.to_string(),
                })
            }
            Err(source) => {
                error!("Data loading failed: {source}");
                Err(ClusterError::Copy { source })
            }
        }
    }

    pub fn client_bundle(&self, credentials: Credentials) -> Result<ClientBundle, ClusterError> {
        ClientBundle::connect(&self.address, credentials)
            .map_err(|source| ClusterError::Connect { source })
    }
}
