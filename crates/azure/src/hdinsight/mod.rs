pub mod models;

use async_trait::async_trait;

use crate::error::Result;
use crate::http::ArmClient;
use models::{
    Cluster, ClusterCreateParametersExtended, ClusterPatchParameters, ClusterResizeParameters,
    GatewaySettings, API_VERSION, PROVIDER_PATH,
};

/// Operations on HDInsight clusters. Create, resize and delete block until
/// the long-running operation settles.
#[async_trait]
pub trait ClustersApi: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<Cluster>;

    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &ClusterCreateParametersExtended,
    ) -> Result<Cluster>;

    async fn update(&self, resource_group: &str, name: &str, parameters: &ClusterPatchParameters) -> Result<Cluster>;

    async fn resize(
        &self,
        resource_group: &str,
        name: &str,
        role: &str,
        parameters: &ClusterResizeParameters,
    ) -> Result<()>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;

    async fn gateway_settings(&self, resource_group: &str, name: &str) -> Result<GatewaySettings>;
}

#[derive(Clone)]
pub struct ClustersClient {
    arm: ArmClient,
}

impl ClustersClient {
    pub fn new(arm: ArmClient) -> Self { Self { arm } }
}

#[async_trait]
impl ClustersApi for ClustersClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<Cluster> {
        let url = self.arm.resource_url(resource_group, PROVIDER_PATH, name, &[], API_VERSION)?;
        self.arm.get(&url).await
    }

    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &ClusterCreateParametersExtended,
    ) -> Result<Cluster> {
        let url = self.arm.resource_url(resource_group, PROVIDER_PATH, name, &[], API_VERSION)?;
        self.arm.put(&url, parameters).await
    }

    async fn update(&self, resource_group: &str, name: &str, parameters: &ClusterPatchParameters) -> Result<Cluster> {
        let url = self.arm.resource_url(resource_group, PROVIDER_PATH, name, &[], API_VERSION)?;
        self.arm.patch(&url, parameters).await
    }

    async fn resize(
        &self,
        resource_group: &str,
        name: &str,
        role: &str,
        parameters: &ClusterResizeParameters,
    ) -> Result<()> {
        let url = self
            .arm
            .resource_url(resource_group, PROVIDER_PATH, name, &["roles", role, "resize"], API_VERSION)?;
        self.arm.post(&url, parameters).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()> {
        let url = self.arm.resource_url(resource_group, PROVIDER_PATH, name, &[], API_VERSION)?;
        self.arm.delete(&url).await
    }

    async fn gateway_settings(&self, resource_group: &str, name: &str) -> Result<GatewaySettings> {
        let url = self
            .arm
            .resource_url(resource_group, PROVIDER_PATH, name, &["configurations", "gateway"], API_VERSION)?;
        self.arm.get(&url).await
    }
}
