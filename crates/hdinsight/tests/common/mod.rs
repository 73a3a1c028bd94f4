#![allow(dead_code)]

use async_trait::async_trait;
use azmapper_azure::hdinsight::models::{
    Cluster, ClusterCreateParametersExtended, ClusterGetProperties, ClusterPatchParameters,
    ClusterResizeParameters, ConnectivityEndpoint, GatewaySettings,
};
use azmapper_azure::{ApiError, ClustersApi};
use serde_json::{json, Value as Json};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeClusters {
    pub clusters: Mutex<HashMap<String, (Cluster, GatewaySettings)>>,
    pub creates: Mutex<Vec<ClusterCreateParametersExtended>>,
    pub patches: Mutex<Vec<ClusterPatchParameters>>,
    pub resizes: Mutex<Vec<(String, i32)>>,
}

fn not_found() -> ApiError {
    ApiError::NotFound { code: "ResourceNotFound".into(), message: "not found".into() }
}

impl FakeClusters {
    pub fn id_for(resource_group: &str, name: &str) -> String {
        format!(
            "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/{}/providers/Microsoft.HDInsight/clusters/{}",
            resource_group, name
        )
    }

    pub fn remove(&self, name: &str) {
        self.clusters.lock().unwrap().remove(name);
    }
}

#[async_trait]
impl ClustersApi for FakeClusters {
    async fn get(&self, _resource_group: &str, name: &str) -> azmapper_azure::Result<Cluster> {
        self.clusters.lock().unwrap().get(name).map(|(c, _)| c.clone()).ok_or_else(not_found)
    }

    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &ClusterCreateParametersExtended,
    ) -> azmapper_azure::Result<Cluster> {
        self.creates.lock().unwrap().push(parameters.clone());
        let props = parameters.properties.clone().unwrap_or_default();
        let gateway = props
            .cluster_definition
            .as_ref()
            .and_then(|d| d.configurations.as_ref())
            .and_then(|c| c.get("gateway").cloned())
            .map(serde_json::from_value::<GatewaySettings>)
            .transpose()?
            .unwrap_or_default();
        let cluster = Cluster {
            id: Some(Self::id_for(resource_group, name)),
            name: Some(name.to_string()),
            location: parameters.location.clone(),
            tags: parameters.tags.clone(),
            properties: Some(ClusterGetProperties {
                cluster_version: props.cluster_version.map(|v| format!("{}.1000.67", v)),
                os_type: props.os_type,
                tier: props.tier,
                cluster_definition: props.cluster_definition.map(|mut d| {
                    d.configurations = None;
                    d
                }),
                compute_profile: props.compute_profile,
                provisioning_state: Some("Succeeded".into()),
                cluster_state: Some("Running".into()),
                connectivity_endpoints: Some(vec![
                    ConnectivityEndpoint {
                        name: Some("HTTPS".into()),
                        protocol: Some("TCP".into()),
                        location: Some(format!("{}.azurehdinsight.net", name)),
                        port: Some(443),
                    },
                    ConnectivityEndpoint {
                        name: Some("SSH".into()),
                        protocol: Some("TCP".into()),
                        location: Some(format!("{}-ssh.azurehdinsight.net", name)),
                        port: Some(22),
                    },
                ]),
            }),
        };
        // the service never echoes the gateway password
        let gateway = GatewaySettings { password: None, ..gateway };
        self.clusters.lock().unwrap().insert(name.to_string(), (cluster.clone(), gateway));
        Ok(cluster)
    }

    async fn update(
        &self,
        _resource_group: &str,
        name: &str,
        parameters: &ClusterPatchParameters,
    ) -> azmapper_azure::Result<Cluster> {
        self.patches.lock().unwrap().push(parameters.clone());
        let mut clusters = self.clusters.lock().unwrap();
        let (cluster, _) = clusters.get_mut(name).ok_or_else(not_found)?;
        cluster.tags = Some(parameters.tags.clone());
        Ok(cluster.clone())
    }

    async fn resize(
        &self,
        _resource_group: &str,
        name: &str,
        role: &str,
        parameters: &ClusterResizeParameters,
    ) -> azmapper_azure::Result<()> {
        let target = parameters.target_instance_count.unwrap_or_default();
        self.resizes.lock().unwrap().push((role.to_string(), target));
        let mut clusters = self.clusters.lock().unwrap();
        let (cluster, _) = clusters.get_mut(name).ok_or_else(not_found)?;
        let roles = cluster
            .properties
            .as_mut()
            .and_then(|p| p.compute_profile.as_mut())
            .map(|c| c.roles.iter_mut())
            .into_iter()
            .flatten();
        for r in roles.filter(|r| r.name.as_deref() == Some(role)) {
            r.target_instance_count = Some(target);
        }
        Ok(())
    }

    async fn delete(&self, _resource_group: &str, name: &str) -> azmapper_azure::Result<()> {
        self.clusters.lock().unwrap().remove(name).map(|_| ()).ok_or_else(not_found)
    }

    async fn gateway_settings(&self, _resource_group: &str, name: &str) -> azmapper_azure::Result<GatewaySettings> {
        self.clusters.lock().unwrap().get(name).map(|(_, g)| g.clone()).ok_or_else(not_found)
    }
}

pub fn storm_doc(name: &str) -> Json {
    json!({
        "name": name,
        "resource_group_name": "acctestRG",
        "location": "West Europe",
        "cluster_version": "3.6",
        "tier": "Standard",
        "component_version": { "storm": "1.1" },
        "gateway": { "enabled": true, "username": "acctestusrgw", "password": "TerrAform123!" },
        "storage_account": [{
            "storage_container_id": "https://acctestsa.blob.core.windows.net/acctest",
            "storage_account_key": "c2VjcmV0LWtleQ==",
            "is_default": true,
        }],
        "roles": {
            "head_node": { "vm_size": "Standard_A4_V2", "username": "acctestusrvm", "password": "AccTestvdSC4daf986!" },
            "worker_node": {
                "vm_size": "Standard_A4_V2",
                "username": "acctestusrvm",
                "password": "AccTestvdSC4daf986!",
                "target_instance_count": 2,
            },
            "zookeeper_node": { "vm_size": "Standard_A4_V2", "username": "acctestusrvm", "password": "AccTestvdSC4daf986!" },
        },
        "tags": { "env": "test" },
    })
}
