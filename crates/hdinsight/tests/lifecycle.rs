mod common;

use azmapper_core::{Instance, InstanceState, MapperError};
use azmapper_hdinsight::{StormClusterConfig, StormClusterResource, RESOURCE_SCHEMA};
use common::{storm_doc, FakeClusters};
use serde_json::json;
use std::sync::Arc;

fn instance(fake: &Arc<FakeClusters>) -> Instance<StormClusterResource> {
    Instance::new(StormClusterResource::new(fake.clone()))
}

#[tokio::test]
async fn create_sends_storm_definition_and_reads_back() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    let handle = cluster.create(&storm_doc("acctesthdi-storm")).await.unwrap();
    assert_eq!(handle.0, FakeClusters::id_for("acctestRG", "acctesthdi-storm"));

    let sent = fake.creates.lock().unwrap()[0].clone();
    let v = serde_json::to_value(&sent).unwrap();
    assert_eq!(v["location"], "westeurope");
    assert_eq!(v["properties"]["osType"], "Linux");
    assert_eq!(v["properties"]["clusterDefinition"]["kind"], "Storm");
    assert_eq!(v["properties"]["clusterDefinition"]["componentVersion"]["Storm"], "1.1");
    assert_eq!(v["properties"]["storageProfile"]["storageaccounts"][0]["name"], "acctestsa.blob.core.windows.net");
    let roles = v["properties"]["computeProfile"]["roles"].as_array().unwrap();
    let counts: Vec<_> = roles.iter().map(|r| (r["name"].clone(), r["targetInstanceCount"].clone())).collect();
    assert_eq!(
        counts,
        vec![
            (json!("headnode"), json!(2)),
            (json!("workernode"), json!(2)),
            (json!("zookeepernode"), json!(3)),
        ]
    );

    let state = cluster.read().await.unwrap().expect("cluster exists");
    assert_eq!(state.tier.as_deref(), Some("Standard"));
    assert_eq!(state.https_endpoint.as_deref(), Some("acctesthdi-storm.azurehdinsight.net"));
    assert_eq!(state.ssh_endpoint.as_deref(), Some("acctesthdi-storm-ssh.azurehdinsight.net"));
    let gateway = state.gateway.unwrap();
    assert_eq!(gateway.enabled, Some(true));
    assert_eq!(gateway.password.as_deref(), Some("TerrAform123!"));
    assert_eq!(state.storage_account.len(), 1);
    let head = state.roles.head_node.unwrap();
    assert_eq!(head.password.as_deref(), Some("AccTestvdSC4daf986!"));
    assert_eq!(state.roles.worker_node.unwrap().target_instance_count, Some(2));
}

#[tokio::test]
async fn update_patches_tags_and_resizes_workers() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    cluster.create(&storm_doc("acctesthdi-resize")).await.unwrap();

    let mut doc = storm_doc("acctesthdi-resize");
    doc["roles"]["worker_node"]["target_instance_count"] = json!(4);
    doc["tags"] = json!({ "env": "prod" });
    cluster.update(&doc).await.unwrap();

    assert_eq!(fake.resizes.lock().unwrap().as_slice(), &[("workernode".to_string(), 4)]);
    assert_eq!(fake.patches.lock().unwrap().len(), 1);
    let state = cluster.read().await.unwrap().unwrap();
    assert_eq!(state.tags.get("env").map(String::as_str), Some("prod"));
    assert_eq!(state.roles.worker_node.unwrap().target_instance_count, Some(4));
}

#[tokio::test]
async fn unchanged_update_makes_no_calls() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    cluster.create(&storm_doc("acctesthdi-same")).await.unwrap();
    cluster.update(&storm_doc("acctesthdi-same")).await.unwrap();
    assert!(fake.resizes.lock().unwrap().is_empty());
    assert!(fake.patches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn update_runs_the_create_checks_first() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    cluster.create(&storm_doc("acctesthdi-checks")).await.unwrap();

    let mut doc = storm_doc("acctesthdi-checks");
    doc["storage_account"][0]["is_default"] = json!(false);
    doc["roles"]["head_node"]["subnet_id"] =
        json!("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vn/subnets/sn");
    let err = cluster.update(&doc).await.unwrap_err();
    assert!(matches!(err, MapperError::InvalidCombination(_)));
    assert!(fake.patches.lock().unwrap().is_empty());
    assert!(fake.resizes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn in_place_update_rejects_recreate_only_changes() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    cluster.create(&storm_doc("acctesthdi-forcenew")).await.unwrap();

    let mut doc = storm_doc("acctesthdi-forcenew");
    doc["cluster_version"] = json!("4.0");
    doc["roles"]["head_node"]["vm_size"] = json!("Standard_D3_V2");
    doc["tags"] = json!({ "env": "prod" });
    let err = cluster.update(&doc).await.unwrap_err();
    match err {
        MapperError::InvalidCombination(message) => {
            assert!(message.contains("cluster_version"), "{}", message);
            assert!(message.contains("roles.head_node.vm_size"), "{}", message);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(fake.patches.lock().unwrap().is_empty());
    assert!(fake.resizes.lock().unwrap().is_empty());

    let head = cluster.read().await.unwrap().unwrap().roles.head_node.unwrap();
    assert_eq!(head.vm_size.as_deref(), Some("Standard_A4_V2"));
}

#[tokio::test]
async fn storage_and_secret_changes_are_checked_against_prior_config() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    cluster.create(&storm_doc("acctesthdi-secrets")).await.unwrap();

    let mut doc = storm_doc("acctesthdi-secrets");
    doc["storage_account"][0]["storage_container_id"] = json!("https://othersa.blob.core.windows.net/acctest");
    doc["roles"]["worker_node"]["password"] = json!("Rotated-Passw0rd!");
    let err = cluster.update(&doc).await.unwrap_err();
    match err {
        MapperError::InvalidCombination(message) => {
            assert!(message.contains("storage_account"), "{}", message);
            assert!(message.contains("roles.worker_node.password"), "{}", message);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn update_after_external_delete_clears_handle() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    cluster.create(&storm_doc("acctesthdi-vanished")).await.unwrap();
    fake.remove("acctesthdi-vanished");

    let err = cluster.update(&storm_doc("acctesthdi-vanished")).await.unwrap_err();
    assert!(matches!(err, MapperError::NotFound { .. }));
    assert_eq!(cluster.state(), &InstanceState::Absent);
}

#[tokio::test]
async fn update_identity_ignores_case() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    cluster.create(&storm_doc("acctesthdi-case")).await.unwrap();

    let mut doc = storm_doc("AccTestHDI-Case");
    doc["resource_group_name"] = json!("ACCTESTRG");
    cluster.update(&doc).await.unwrap();
    assert!(fake.patches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delete_twice_and_read_after_external_delete() {
    let fake = Arc::new(FakeClusters::default());
    let mut cluster = instance(&fake);
    let handle = cluster.create(&storm_doc("acctesthdi-gone")).await.unwrap();

    fake.remove("acctesthdi-gone");
    assert!(cluster.read().await.unwrap().is_none());
    assert_eq!(cluster.state(), &InstanceState::Absent);

    let mut stale = Instance::existing(StormClusterResource::new(fake.clone()), handle);
    stale.delete().await.unwrap();
}

#[tokio::test]
async fn mismatched_network_ids_fail_before_create() {
    let fake = Arc::new(FakeClusters::default());
    let mut doc = storm_doc("acctesthdi-vnet");
    doc["roles"]["head_node"]["subnet_id"] =
        json!("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vn/subnets/sn");
    let err = instance(&fake).create(&doc).await.unwrap_err();
    assert!(matches!(err, MapperError::InvalidCombination(_)));
    assert!(fake.creates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn import_protection_applies_to_clusters() {
    let fake = Arc::new(FakeClusters::default());
    instance(&fake).create(&storm_doc("acctesthdi-dup")).await.unwrap();
    let err = instance(&fake).require_import(true).create(&storm_doc("acctesthdi-dup")).await.unwrap_err();
    assert!(matches!(err, MapperError::AlreadyExists { resource_type: "azurerm_hdinsight_storm_cluster", .. }));
}

#[test]
fn decoded_config_matches_document() {
    let config: StormClusterConfig = RESOURCE_SCHEMA.decode(&storm_doc("acctesthdi")).unwrap();
    assert_eq!(config.roles.worker_node.target_instance_count, Some(2));
    assert_eq!(config.roles.head_node.target_instance_count, None);
    assert_eq!(config.storage_account[0].storage_account_key.as_deref(), Some("c2VjcmV0LWtleQ=="));
}
