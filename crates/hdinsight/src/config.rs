use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

fn redact<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => s.serialize_some("(sensitive)"),
        None => s.serialize_none(),
    }
}

fn redact_set<S: Serializer>(value: &BTreeSet<String>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(value.iter().map(|_| "(sensitive)"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentVersionConfig {
    pub storm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub enabled: bool,
    pub username: String,
    #[serde(serialize_with = "redact")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageAccountConfig {
    pub storage_container_id: String,
    #[serde(serialize_with = "redact")]
    pub storage_account_key: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub vm_size: String,
    pub username: String,
    #[serde(default, serialize_with = "redact", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, serialize_with = "redact_set", skip_serializing_if = "BTreeSet::is_empty")]
    pub ssh_keys: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instance_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_instance_count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolesConfig {
    pub head_node: NodeConfig,
    pub worker_node: NodeConfig,
    pub zookeeper_node: NodeConfig,
}

/// What the user declares for `azurerm_hdinsight_storm_cluster`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormClusterConfig {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub cluster_version: String,
    pub tier: String,
    pub component_version: ComponentVersionConfig,
    pub gateway: GatewayConfig,
    pub storage_account: Vec<StorageAccountConfig>,
    pub roles: RolesConfig,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Gateway settings as read back. Fields the service omits stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GatewayState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(serialize_with = "redact", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(serialize_with = "redact", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(serialize_with = "redact_set", skip_serializing_if = "BTreeSet::is_empty")]
    pub ssh_keys: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_network_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_instance_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_instance_count: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RolesState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_node: Option<NodeState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_node: Option<NodeState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zookeeper_node: Option<NodeState>,
}

/// A cluster as read back. Secrets come from the prior configuration and
/// serialize redacted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StormClusterState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub resource_group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_version: Option<ComponentVersionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub storage_account: Vec<StorageAccountConfig>,
    pub roles: RolesState,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_redacted_when_serialized() {
        let node = NodeConfig {
            vm_size: "Standard_A3".into(),
            username: "storm".into(),
            password: Some("hunter2".into()),
            ssh_keys: ["ssh-rsa AAAA".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let v = serde_json::to_string(&node).unwrap();
        assert!(!v.contains("hunter2"));
        assert!(!v.contains("AAAA"));
        assert!(v.contains("(sensitive)"));
    }

    #[test]
    fn unset_state_fields_are_omitted() {
        let v = serde_json::to_value(NodeState { vm_size: Some("Standard_A3".into()), ..Default::default() }).unwrap();
        assert_eq!(v, serde_json::json!({ "vm_size": "Standard_A3" }));
        let v = serde_json::to_value(GatewayState { password: Some("x".into()), ..Default::default() }).unwrap();
        assert_eq!(v, serde_json::json!({ "password": "(sensitive)" }));
    }
}
