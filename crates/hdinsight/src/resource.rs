use async_trait::async_trait;
use azmapper_azure::hdinsight::models::{ClusterPatchParameters, ClusterResizeParameters};
use azmapper_azure::{ApiError, ClustersApi};
use azmapper_core::{Deletion, MapperError, Resource, ResourceHandle, Result, Schema};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::{StormClusterConfig, StormClusterState};
use crate::diff::force_new_changes;
use crate::expand::expand_cluster;
use crate::flatten::flatten_cluster;
use crate::nodes::WORKER_NODE;
use crate::schema::RESOURCE_SCHEMA;

const KIND: &str = "HDInsight Storm Cluster";

fn api_error(action: &'static str, name: &str, resource_group: &str, err: ApiError) -> MapperError {
    if err.is_cancelled() {
        MapperError::Cancelled
    } else {
        MapperError::remote(action, KIND, name, resource_group, err)
    }
}

fn parse_handle(handle: &ResourceHandle) -> Result<(String, String)> {
    let id = handle.parse()?;
    let name = id.require("clusters")?.to_string();
    Ok((id.resource_group, name))
}

/// `azurerm_hdinsight_storm_cluster` bound to a clusters client.
#[derive(Clone)]
pub struct StormClusterResource {
    client: Arc<dyn ClustersApi>,
}

impl StormClusterResource {
    pub fn new(client: Arc<dyn ClustersApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for StormClusterResource {
    type Config = StormClusterConfig;
    type State = StormClusterState;

    fn schema(&self) -> &'static Schema {
        &RESOURCE_SCHEMA
    }

    async fn find_existing(&self, config: &StormClusterConfig) -> Result<Option<ResourceHandle>> {
        let (name, rg) = (&config.name, &config.resource_group_name);
        match self.client.get(rg, name).await {
            Ok(existing) => Ok(existing.id.filter(|id| !id.is_empty()).map(ResourceHandle)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(api_error("checking for presence of existing", name, rg, e)),
        }
    }

    #[instrument(skip_all, fields(name = %config.name, rg = %config.resource_group_name))]
    async fn create(&self, config: &StormClusterConfig) -> Result<ResourceHandle> {
        let (name, rg) = (&config.name, &config.resource_group_name);
        let parameters = expand_cluster(config)?;
        self.client.create(rg, name, &parameters).await.map_err(|e| api_error("creating", name, rg, e))?;
        let read = self.client.get(rg, name).await.map_err(|e| api_error("retrieving", name, rg, e))?;
        read.id
            .filter(|id| !id.is_empty())
            .map(ResourceHandle)
            .ok_or_else(|| MapperError::MissingId { kind: KIND, name: name.clone(), resource_group: rg.clone() })
    }

    #[instrument(skip_all, fields(id = %handle))]
    async fn read(
        &self,
        handle: &ResourceHandle,
        prior: Option<&StormClusterConfig>,
    ) -> Result<Option<StormClusterState>> {
        let (rg, name) = parse_handle(handle)?;
        let cluster = match self.client.get(&rg, &name).await {
            Ok(cluster) => cluster,
            Err(e) if e.is_not_found() => {
                debug!("cluster is gone");
                return Ok(None);
            }
            Err(e) => return Err(api_error("retrieving", &name, &rg, e)),
        };
        let gateway = self
            .client
            .gateway_settings(&rg, &name)
            .await
            .map_err(|e| api_error("retrieving gateway configuration of", &name, &rg, e))?;
        Ok(Some(flatten_cluster(&name, &rg, &cluster, &gateway, prior)))
    }

    /// Tags are patched in place and the worker role is resized. Any other
    /// change is rejected before the cluster is touched.
    #[instrument(skip_all, fields(id = %handle))]
    async fn update(
        &self,
        handle: &ResourceHandle,
        prior: Option<&StormClusterConfig>,
        config: &StormClusterConfig,
    ) -> Result<()> {
        let (rg, name) = parse_handle(handle)?;
        if !rg.eq_ignore_ascii_case(&config.resource_group_name) || !name.eq_ignore_ascii_case(&config.name) {
            return Err(MapperError::InvalidCombination(format!(
                "name and resource_group_name force a new resource: {} cannot become {}/{}",
                handle, config.resource_group_name, config.name
            )));
        }
        let wanted = expand_cluster(config)?;

        let not_found = || MapperError::NotFound { kind: KIND, name: name.clone(), resource_group: rg.clone() };
        let current = match self.client.get(&rg, &name).await {
            Ok(cluster) => cluster,
            Err(e) if e.is_not_found() => return Err(not_found()),
            Err(e) => return Err(api_error("retrieving", &name, &rg, e)),
        };
        let gateway = match self.client.gateway_settings(&rg, &name).await {
            Ok(gateway) => gateway,
            Err(e) if e.is_not_found() => return Err(not_found()),
            Err(e) => return Err(api_error("retrieving gateway configuration of", &name, &rg, e)),
        };

        let changes = force_new_changes(&wanted, &current, &gateway, config, prior);
        if !changes.is_empty() {
            return Err(MapperError::InvalidCombination(format!(
                "{} cannot be changed on an existing cluster; it must be recreated",
                changes.join(", ")
            )));
        }

        if current.tags.clone().unwrap_or_default() != config.tags {
            let patch = ClusterPatchParameters { tags: config.tags.clone() };
            self.client.update(&rg, &name, &patch).await.map_err(|e| api_error("updating tags of", &name, &rg, e))?;
            info!("tags updated");
        }

        let current_workers = current
            .properties
            .as_ref()
            .and_then(|p| p.compute_profile.as_ref())
            .and_then(|c| {
                c.roles
                    .iter()
                    .find(|r| r.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(WORKER_NODE.role)))
            })
            .and_then(|r| r.target_instance_count);
        let target = config.roles.worker_node.target_instance_count;
        if target.is_some() && target != current_workers {
            let resize = ClusterResizeParameters { target_instance_count: target };
            self.client
                .resize(&rg, &name, WORKER_NODE.role, &resize)
                .await
                .map_err(|e| api_error("resizing", &name, &rg, e))?;
            info!(from = ?current_workers, to = ?target, "worker nodes resized");
        }
        Ok(())
    }

    #[instrument(skip_all, fields(id = %handle))]
    async fn delete(&self, handle: &ResourceHandle) -> Result<Deletion> {
        let (rg, name) = parse_handle(handle)?;
        match self.client.delete(&rg, &name).await {
            Ok(()) => Ok(Deletion::Deleted),
            Err(e) if e.is_not_found() => Ok(Deletion::AlreadyGone),
            Err(e) => Err(api_error("deleting", &name, &rg, e)),
        }
    }
}
