//! Attributes an existing cluster cannot change in place.

use azmapper_azure::hdinsight::models::{
    Cluster, ClusterCreateParametersExtended, ClusterDefinition, GatewaySettings, Role,
};
use azmapper_core::normalize_location;

use crate::config::{NodeConfig, StormClusterConfig};
use crate::expand::CLUSTER_KIND;
use crate::nodes::STORM_ROLES;

fn same_text(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        // the service omitted the field; nothing to compare against
        (_, None) => true,
        (None, Some(_)) => false,
    }
}

/// `3.6` and `3.6.1000.67` name the same cluster version.
fn major_minor(version: &str) -> Vec<&str> {
    version.split('.').take(2).collect()
}

fn find_role<'a>(roles: &'a [Role], name: &str) -> Option<&'a Role> {
    roles.iter().find(|r| r.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
}

fn node_changes(path: &str, wanted: &Role, current: &Role, out: &mut Vec<String>) {
    let vm_size = |r: &Role| r.hardware_profile.as_ref().and_then(|h| h.vm_size.clone());
    if !same_text(vm_size(wanted).as_deref(), vm_size(current).as_deref()) {
        out.push(format!("{}.vm_size", path));
    }
    let username = |r: &Role| {
        r.os_profile
            .as_ref()
            .and_then(|o| o.linux_operating_system_profile.as_ref())
            .and_then(|l| l.username.clone())
    };
    if !same_text(username(wanted).as_deref(), username(current).as_deref()) {
        out.push(format!("{}.username", path));
    }
    let network = |r: &Role| r.virtual_network_profile.clone().unwrap_or_default();
    let (w, c) = (network(wanted), network(current));
    if w.id.as_deref().map(str::to_lowercase) != c.id.as_deref().map(str::to_lowercase) {
        out.push(format!("{}.virtual_network_id", path));
    }
    if w.subnet.as_deref().map(str::to_lowercase) != c.subnet.as_deref().map(str::to_lowercase) {
        out.push(format!("{}.subnet_id", path));
    }
    if wanted.min_instance_count.is_some() && wanted.min_instance_count != current.min_instance_count {
        out.push(format!("{}.min_instance_count", path));
    }
}

fn secret_changes(path: &str, wanted: &NodeConfig, prior: &NodeConfig, out: &mut Vec<String>) {
    if wanted.password != prior.password {
        out.push(format!("{}.password", path));
    }
    if wanted.ssh_keys != prior.ssh_keys {
        out.push(format!("{}.ssh_keys", path));
    }
}

/// Paths of every requested change that neither the tags patch nor a
/// worker resize can apply. Storage accounts and secrets are never returned
/// by the service, so they are compared against `prior` when it is known.
pub fn force_new_changes(
    wanted: &ClusterCreateParametersExtended,
    current: &Cluster,
    gateway: &GatewaySettings,
    config: &StormClusterConfig,
    prior: Option<&StormClusterConfig>,
) -> Vec<String> {
    let mut out = Vec::new();

    if let (Some(w), Some(c)) = (&wanted.location, &current.location) {
        if normalize_location(w) != normalize_location(c) {
            out.push("location".to_string());
        }
    }

    let wanted_props = wanted.properties.clone().unwrap_or_default();
    let current_props = current.properties.clone().unwrap_or_default();
    if let (Some(w), Some(c)) = (&wanted_props.cluster_version, &current_props.cluster_version) {
        if major_minor(w) != major_minor(c) {
            out.push("cluster_version".to_string());
        }
    }
    if current_props.tier.is_some() && wanted_props.tier != current_props.tier {
        out.push("tier".to_string());
    }

    let component = |d: &Option<ClusterDefinition>| {
        d.as_ref().and_then(|d| d.component_version.get(CLUSTER_KIND).cloned())
    };
    if !same_text(
        component(&wanted_props.cluster_definition).as_deref(),
        component(&current_props.cluster_definition).as_deref(),
    ) {
        out.push("component_version.storm".to_string());
    }

    if let Some(enabled) = gateway.is_enabled.as_deref() {
        if !enabled.eq_ignore_ascii_case(&config.gateway.enabled.to_string()) {
            out.push("gateway.enabled".to_string());
        }
    }
    if gateway.username.as_ref().is_some_and(|u| *u != config.gateway.username) {
        out.push("gateway.username".to_string());
    }

    let wanted_roles = wanted_props.compute_profile.map(|c| c.roles).unwrap_or_default();
    let current_roles = current_props.compute_profile.map(|c| c.roles).unwrap_or_default();
    for def in STORM_ROLES {
        let path = format!("roles.{}", def.attribute);
        if let (Some(w), Some(c)) = (find_role(&wanted_roles, def.role), find_role(&current_roles, def.role)) {
            node_changes(&path, w, c, &mut out);
        }
    }

    if let Some(prior) = prior {
        if config.storage_account != prior.storage_account {
            out.push("storage_account".to_string());
        }
        if config.gateway.password != prior.gateway.password {
            out.push("gateway.password".to_string());
        }
        let pairs = [
            ("roles.head_node", &config.roles.head_node, &prior.roles.head_node),
            ("roles.worker_node", &config.roles.worker_node, &prior.roles.worker_node),
            ("roles.zookeeper_node", &config.roles.zookeeper_node, &prior.roles.zookeeper_node),
        ];
        for (path, wanted, prior) in pairs {
            secret_changes(path, wanted, prior, &mut out);
        }
    }
    out
}
