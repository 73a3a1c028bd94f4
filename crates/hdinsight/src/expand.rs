//! Configuration to cluster create parameters.

use azmapper_azure::hdinsight::models::{
    ClusterCreateParametersExtended, ClusterCreateProperties, ClusterDefinition, ComputeProfile,
    GatewaySettings, HardwareProfile, LinuxOperatingSystemProfile, OsProfile, OsType, Role,
    SshProfile, SshPublicKey, StorageAccount, StorageProfile, Tier, VirtualNetworkProfile,
};
use azmapper_core::{normalize_location, MapperError, Result, ValidationErrors, Violation};
use serde_json::json;
use std::collections::BTreeMap;
use url::Url;

use crate::config::{ComponentVersionConfig, GatewayConfig, NodeConfig, RolesConfig, StorageAccountConfig, StormClusterConfig};
use crate::nodes::{NodeDefinition, HEAD_NODE, WORKER_NODE, ZOOKEEPER_NODE};
use crate::schema::TIERS;

pub const CLUSTER_KIND: &str = "Storm";

pub fn expand_cluster(config: &StormClusterConfig) -> Result<ClusterCreateParametersExtended> {
    let tier = expand_tier(&config.tier)?;
    let storageaccounts = expand_storage_accounts(&config.storage_account)?;
    let roles = expand_roles(&config.roles)?;

    Ok(ClusterCreateParametersExtended {
        location: Some(normalize_location(&config.location)),
        tags: Some(config.tags.clone()),
        properties: Some(ClusterCreateProperties {
            cluster_version: Some(config.cluster_version.clone()),
            os_type: Some(OsType::Linux),
            tier: Some(tier),
            cluster_definition: Some(ClusterDefinition {
                kind: Some(CLUSTER_KIND.to_string()),
                component_version: expand_component_version(&config.component_version),
                configurations: Some(expand_gateway(&config.gateway)?),
            }),
            compute_profile: Some(ComputeProfile { roles }),
            storage_profile: Some(StorageProfile { storageaccounts }),
        }),
    })
}

pub fn expand_tier(tier: &str) -> Result<Tier> {
    if tier.eq_ignore_ascii_case("Standard") {
        Ok(Tier::Standard)
    } else if tier.eq_ignore_ascii_case("Premium") {
        Ok(Tier::Premium)
    } else {
        Err(MapperError::InvalidEnum { attribute: "tier", value: tier.to_string(), expected: TIERS })
    }
}

pub fn expand_component_version(version: &ComponentVersionConfig) -> BTreeMap<String, String> {
    BTreeMap::from([(CLUSTER_KIND.to_string(), version.storm.clone())])
}

/// The `configurations` bag carrying the gateway credentials.
pub fn expand_gateway(gateway: &GatewayConfig) -> Result<serde_json::Value> {
    let settings = GatewaySettings {
        is_enabled: Some(gateway.enabled.to_string()),
        username: Some(gateway.username.clone()),
        password: gateway.password.clone(),
    };
    Ok(json!({ "gateway": serde_json::to_value(settings)? }))
}

/// Splits each container URL into account host and container name.
/// Exactly one account must be the default.
pub fn expand_storage_accounts(accounts: &[StorageAccountConfig]) -> Result<Vec<StorageAccount>> {
    let defaults = accounts.iter().filter(|a| a.is_default).count();
    if defaults != 1 {
        return Err(MapperError::InvalidCombination(format!(
            "exactly one storage_account must have is_default set, found {}",
            defaults
        )));
    }

    let mut violations = Vec::new();
    let mut out = Vec::with_capacity(accounts.len());
    for (i, account) in accounts.iter().enumerate() {
        match split_container_id(&account.storage_container_id) {
            Ok((name, container)) => out.push(StorageAccount {
                name: Some(name),
                is_default: Some(account.is_default),
                container: Some(container),
                key: account.storage_account_key.clone(),
            }),
            Err(message) => {
                violations.push(Violation::new(format!("storage_account.{}.storage_container_id", i), message))
            }
        }
    }
    if !violations.is_empty() {
        return Err(ValidationErrors(violations).into());
    }
    Ok(out)
}

fn split_container_id(id: &str) -> std::result::Result<(String, String), String> {
    let url = Url::parse(id).map_err(|e| format!("expected a container URL: {}", e))?;
    let host = url.host_str().ok_or_else(|| format!("{:?} has no host", id))?;
    let container = url.path().trim_matches('/');
    if container.is_empty() {
        return Err(format!("{:?} has no container name", id));
    }
    Ok((host.to_string(), container.to_string()))
}

pub fn expand_roles(roles: &RolesConfig) -> Result<Vec<Role>> {
    Ok(vec![
        expand_node(&HEAD_NODE, &roles.head_node)?,
        expand_node(&WORKER_NODE, &roles.worker_node)?,
        expand_node(&ZOOKEEPER_NODE, &roles.zookeeper_node)?,
    ])
}

pub fn expand_node(def: &NodeDefinition, node: &NodeConfig) -> Result<Role> {
    if !def.accepts_vm_size(&node.vm_size) {
        return Err(MapperError::InvalidEnum {
            attribute: "vm_size",
            value: node.vm_size.clone(),
            expected: def.valid_vm_sizes,
        });
    }

    let password = node.password.clone().filter(|p| !p.is_empty());
    if password.is_none() && node.ssh_keys.is_empty() {
        return Err(MapperError::InvalidCombination(format!(
            "either password or ssh_keys must be set for roles.{}",
            def.attribute
        )));
    }
    let ssh_profile = (!node.ssh_keys.is_empty()).then(|| SshProfile {
        public_keys: node
            .ssh_keys
            .iter()
            .map(|k| SshPublicKey { certificate_data: Some(k.clone()) })
            .collect(),
    });

    let virtual_network_profile = match (&node.virtual_network_id, &node.subnet_id) {
        (Some(id), Some(subnet)) => Some(VirtualNetworkProfile { id: Some(id.clone()), subnet: Some(subnet.clone()) }),
        (None, None) => None,
        _ => {
            return Err(MapperError::InvalidCombination(format!(
                "subnet_id and virtual_network_id must be set together for roles.{}",
                def.attribute
            )))
        }
    };

    let (min_instance_count, target_instance_count) = if def.can_specify_instance_count {
        let target = node.target_instance_count.ok_or_else(|| {
            MapperError::InvalidCombination(format!("target_instance_count is required for roles.{}", def.attribute))
        })?;
        if target < def.min_instance_count || target > def.max_instance_count {
            return Err(MapperError::InvalidCombination(format!(
                "target_instance_count for roles.{} must be between {} and {}, got {}",
                def.attribute, def.min_instance_count, def.max_instance_count, target
            )));
        }
        (node.min_instance_count, Some(target))
    } else {
        if node.target_instance_count.is_some() || node.min_instance_count.is_some() {
            return Err(MapperError::InvalidCombination(format!(
                "the instance count of roles.{} is fixed",
                def.attribute
            )));
        }
        (None, def.fixed_target_instance_count)
    };

    Ok(Role {
        name: Some(def.role.to_string()),
        min_instance_count,
        target_instance_count,
        hardware_profile: Some(HardwareProfile { vm_size: Some(node.vm_size.clone()) }),
        os_profile: Some(OsProfile {
            linux_operating_system_profile: Some(LinuxOperatingSystemProfile {
                username: Some(node.username.clone()),
                password,
                ssh_profile,
            }),
        }),
        virtual_network_profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBNET: &str = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vn/subnets/sn";
    const VNET: &str = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vn";

    fn node(vm_size: &str) -> NodeConfig {
        NodeConfig {
            vm_size: vm_size.into(),
            username: "acctestusrvm".into(),
            password: Some("AccTestvdSC4daf986!".into()),
            ..Default::default()
        }
    }

    fn storage(container: &str, is_default: bool) -> StorageAccountConfig {
        StorageAccountConfig {
            storage_container_id: container.into(),
            storage_account_key: Some("a2V5".into()),
            is_default,
        }
    }

    #[test]
    fn fixed_roles_use_definition_count() {
        let role = expand_node(&HEAD_NODE, &node("Standard_A4_V2")).unwrap();
        assert_eq!(role.name.as_deref(), Some("headnode"));
        assert_eq!(role.target_instance_count, Some(2));
        assert_eq!(role.min_instance_count, None);

        let role = expand_node(&ZOOKEEPER_NODE, &node("Standard_A4_V2")).unwrap();
        assert_eq!(role.target_instance_count, Some(3));
    }

    #[test]
    fn worker_count_comes_from_config() {
        let mut worker = node("Standard_D3_V2");
        worker.target_instance_count = Some(3);
        let role = expand_node(&WORKER_NODE, &worker).unwrap();
        assert_eq!(role.target_instance_count, Some(3));

        worker.target_instance_count = None;
        assert!(matches!(expand_node(&WORKER_NODE, &worker), Err(MapperError::InvalidCombination(_))));
    }

    #[test]
    fn node_needs_credentials() {
        let mut head = node("Standard_A3");
        head.password = None;
        assert!(matches!(expand_node(&HEAD_NODE, &head), Err(MapperError::InvalidCombination(_))));

        head.ssh_keys.insert("ssh-rsa AAAAB3Nza".into());
        let role = expand_node(&HEAD_NODE, &head).unwrap();
        let linux = role.os_profile.unwrap().linux_operating_system_profile.unwrap();
        assert_eq!(linux.password, None);
        assert_eq!(linux.ssh_profile.unwrap().public_keys.len(), 1);
    }

    #[test]
    fn network_ids_come_in_pairs() {
        let mut head = node("Standard_A3");
        head.subnet_id = Some(SUBNET.into());
        assert!(matches!(expand_node(&HEAD_NODE, &head), Err(MapperError::InvalidCombination(_))));

        head.virtual_network_id = Some(VNET.into());
        let role = expand_node(&HEAD_NODE, &head).unwrap();
        assert_eq!(role.virtual_network_profile.unwrap().subnet.as_deref(), Some(SUBNET));
    }

    #[test]
    fn vm_size_is_checked_per_role() {
        assert!(matches!(
            expand_node(&ZOOKEEPER_NODE, &node("Standard_D3_v2")),
            Err(MapperError::InvalidEnum { attribute: "vm_size", .. })
        ));
    }

    #[test]
    fn storage_container_url_is_split() {
        let accounts = expand_storage_accounts(&[
            storage("https://acct.blob.core.windows.net/storm", true),
            storage("https://other.blob.core.windows.net/extra/", false),
        ])
        .unwrap();
        assert_eq!(accounts[0].name.as_deref(), Some("acct.blob.core.windows.net"));
        assert_eq!(accounts[0].container.as_deref(), Some("storm"));
        assert_eq!(accounts[1].container.as_deref(), Some("extra"));
        assert_eq!(accounts[1].is_default, Some(false));
    }

    #[test]
    fn exactly_one_default_storage_account() {
        let none = [storage("https://acct.blob.core.windows.net/storm", false)];
        assert!(matches!(expand_storage_accounts(&none), Err(MapperError::InvalidCombination(_))));
        let two = [
            storage("https://acct.blob.core.windows.net/a", true),
            storage("https://acct.blob.core.windows.net/b", true),
        ];
        assert!(matches!(expand_storage_accounts(&two), Err(MapperError::InvalidCombination(_))));
    }

    #[test]
    fn container_url_without_container_is_rejected() {
        let err = expand_storage_accounts(&[storage("https://acct.blob.core.windows.net", true)]).unwrap_err();
        match err {
            MapperError::Validation(v) => assert!(v.contains("storage_account.0.storage_container_id")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn gateway_uses_rest_auth_keys() {
        let v = expand_gateway(&GatewayConfig {
            enabled: true,
            username: "acctestusrgw".into(),
            password: Some("TerrAform123!".into()),
        })
        .unwrap();
        assert_eq!(v["gateway"]["restAuthCredential.isEnabled"], "true");
        assert_eq!(v["gateway"]["restAuthCredential.username"], "acctestusrgw");
        assert_eq!(v["gateway"]["restAuthCredential.password"], "TerrAform123!");
    }

    #[test]
    fn component_version_is_keyed_by_kind() {
        let v = expand_component_version(&ComponentVersionConfig { storm: "1.1".into() });
        assert_eq!(v.get("Storm").map(String::as_str), Some("1.1"));
    }

    #[test]
    fn tier_ignores_case() {
        assert_eq!(expand_tier("premium").unwrap(), Tier::Premium);
        assert!(matches!(expand_tier("Basic"), Err(MapperError::InvalidEnum { .. })));
    }
}
