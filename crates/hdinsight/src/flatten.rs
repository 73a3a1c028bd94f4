use azmapper_azure::hdinsight::models::{Cluster, ConnectivityEndpoint, GatewaySettings, Role, Tier};
use azmapper_core::normalize_location;

use crate::config::{
    ComponentVersionConfig, GatewayConfig, GatewayState, NodeConfig, NodeState, RolesState, StormClusterConfig,
    StormClusterState,
};
use crate::expand::CLUSTER_KIND;
use crate::nodes::{NodeDefinition, HEAD_NODE, WORKER_NODE, ZOOKEEPER_NODE};

/// Maps a cluster and its gateway configuration onto state. The service
/// never returns storage keys, node passwords or SSH keys, so those come
/// from `prior`.
pub fn flatten_cluster(
    name: &str,
    resource_group: &str,
    cluster: &Cluster,
    gateway: &GatewaySettings,
    prior: Option<&StormClusterConfig>,
) -> StormClusterState {
    let mut state = StormClusterState {
        id: cluster.id.clone(),
        name: name.to_string(),
        resource_group_name: resource_group.to_string(),
        location: cluster.location.as_deref().map(normalize_location),
        tags: cluster.tags.clone().unwrap_or_default(),
        storage_account: prior.map(|p| p.storage_account.clone()).unwrap_or_default(),
        gateway: flatten_gateway(gateway, prior.map(|p| &p.gateway)),
        ..Default::default()
    };

    let Some(props) = &cluster.properties else {
        return state;
    };
    state.cluster_version = props.cluster_version.clone();
    state.tier = props.tier.map(|t| tier_name(t).to_string());
    state.provisioning_state = props.provisioning_state.clone();

    state.component_version = props
        .cluster_definition
        .as_ref()
        .and_then(|def| def.component_version.get(CLUSTER_KIND))
        .map(|storm| ComponentVersionConfig { storm: storm.clone() });

    let roles = props.compute_profile.as_ref().map(|c| c.roles.as_slice()).unwrap_or_default();
    let prior_roles = prior.map(|p| &p.roles);
    state.roles = RolesState {
        head_node: flatten_node(&HEAD_NODE, roles, prior_roles.map(|r| &r.head_node)),
        worker_node: flatten_node(&WORKER_NODE, roles, prior_roles.map(|r| &r.worker_node)),
        zookeeper_node: flatten_node(&ZOOKEEPER_NODE, roles, prior_roles.map(|r| &r.zookeeper_node)),
    };

    let endpoints = props.connectivity_endpoints.as_deref().unwrap_or_default();
    state.https_endpoint = find_endpoint("HTTPS", endpoints);
    state.ssh_endpoint = find_endpoint("SSH", endpoints);
    state
}

fn tier_name(tier: Tier) -> &'static str {
    match tier {
        Tier::Standard => "Standard",
        Tier::Premium => "Premium",
    }
}

/// `None` when the service reports neither the flag nor the username.
pub fn flatten_gateway(gateway: &GatewaySettings, prior: Option<&GatewayConfig>) -> Option<GatewayState> {
    if gateway.is_enabled.is_none() && gateway.username.is_none() {
        return None;
    }
    Some(GatewayState {
        enabled: gateway.is_enabled.as_deref().map(|v| v.eq_ignore_ascii_case("true")),
        username: gateway.username.clone(),
        password: gateway.password.clone().or_else(|| prior.and_then(|p| p.password.clone())),
    })
}

pub fn flatten_node(def: &NodeDefinition, roles: &[Role], prior: Option<&NodeConfig>) -> Option<NodeState> {
    let role = roles.iter().find(|r| r.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(def.role)))?;
    let linux = role.os_profile.as_ref().and_then(|o| o.linux_operating_system_profile.as_ref());
    let vnet = role.virtual_network_profile.as_ref();

    let mut node = NodeState {
        vm_size: role.hardware_profile.as_ref().and_then(|h| h.vm_size.clone()),
        username: linux.and_then(|l| l.username.clone()),
        password: prior.and_then(|p| p.password.clone()),
        ssh_keys: prior.map(|p| p.ssh_keys.clone()).unwrap_or_default(),
        subnet_id: vnet.and_then(|v| v.subnet.clone()),
        virtual_network_id: vnet.and_then(|v| v.id.clone()),
        ..Default::default()
    };
    if def.can_specify_instance_count {
        node.min_instance_count = role.min_instance_count;
        node.target_instance_count = role.target_instance_count;
    }
    Some(node)
}

/// Host of the named connectivity endpoint.
pub fn find_endpoint(name: &str, endpoints: &[ConnectivityEndpoint]) -> Option<String> {
    endpoints
        .iter()
        .find(|e| e.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
        .and_then(|e| e.location.clone())
}
