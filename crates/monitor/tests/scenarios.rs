mod common;

use azmapper_azure::insights::models::{Action, LogSearchRule, LogSearchRuleResource};
use azmapper_core::{Instance, InstanceState, MapperError, ResourceHandle};
use azmapper_monitor::config::{CriteriaConfig, DimensionConfig};
use azmapper_monitor::{ScheduledQueryRulesDataSource, ScheduledQueryRulesResource};
use common::{alerting_doc, log_to_metric_doc, FakeRules};
use serde_json::json;
use std::sync::Arc;

fn instance(fake: &Arc<FakeRules>) -> Instance<ScheduledQueryRulesResource> {
    Instance::new(ScheduledQueryRulesResource::new(fake.clone()))
}

#[tokio::test]
async fn alerting_rule_is_created_and_read_back() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);

    let handle = rule.create(&alerting_doc("acctest-alert")).await.unwrap();
    assert_eq!(handle.0, FakeRules::id_for("acctestRG", "acctest-alert"));

    let state = rule.read().await.unwrap().expect("rule exists");
    assert_eq!(state.enabled, Some(true));
    assert_eq!(state.description.as_deref(), Some("Alert when total results cross threshold"));
    assert_eq!(state.action_type.as_deref(), Some("AlertingAction"));
    assert_eq!(state.severity.as_deref(), Some("3"));
    assert_eq!(state.location.as_deref(), Some("westeurope"));
    assert_eq!(state.provisioning_state.as_deref(), Some("Succeeded"));
    let trigger = state.trigger.unwrap();
    assert_eq!(trigger.operator, "GreaterThan");
    assert_eq!(trigger.threshold, 5000.0);
}

#[tokio::test]
async fn log_to_metric_rule_keeps_dimensions() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);

    rule.create(&log_to_metric_doc("acctest-metric")).await.unwrap();
    let state = rule.read().await.unwrap().expect("rule exists");
    assert_eq!(state.action_type.as_deref(), Some("LogToMetricAction"));
    assert_eq!(
        state.criteria,
        vec![CriteriaConfig {
            metric_name: "Average_percent Idle Time".into(),
            dimension: vec![DimensionConfig {
                name: "dimension".into(),
                operator: "GreaterThan".into(),
                values: vec!["latency".into()],
            }],
        }]
    );
    assert_eq!(state.frequency, None);
    assert_eq!(state.time_window, None);
}

#[tokio::test]
async fn second_delete_is_still_success() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);
    let handle = rule.create(&alerting_doc("acctest-twice")).await.unwrap();

    rule.delete().await.unwrap();
    assert_eq!(rule.state(), &InstanceState::Absent);

    let mut stale = Instance::existing(ScheduledQueryRulesResource::new(fake.clone()), handle);
    stale.delete().await.unwrap();
    assert_eq!(stale.state(), &InstanceState::Absent);
}

#[tokio::test]
async fn external_deletion_clears_handle_on_read() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);
    rule.create(&alerting_doc("acctest-drift")).await.unwrap();

    fake.remove("acctestRG", "acctest-drift");
    assert!(rule.read().await.unwrap().is_none());
    assert_eq!(rule.handle(), None);
}

#[tokio::test]
async fn read_failure_is_reported_with_context() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);
    let handle = rule.create(&alerting_doc("acctest-err")).await.unwrap();

    *fake.fail_gets_with.lock().unwrap() = Some(403);
    let err = rule.read().await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("acctest-err"), "{}", msg);
    assert!(msg.contains("acctestRG"), "{}", msg);
    assert_eq!(rule.handle(), Some(&handle));
}

#[tokio::test]
async fn invalid_configuration_never_reaches_the_service() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);

    let mut doc = alerting_doc("acctest-invalid");
    doc["severity"] = json!("9");
    doc["frequency"] = json!(0);
    match rule.create(&doc).await.unwrap_err() {
        MapperError::Validation(errors) => {
            assert!(errors.contains("severity"));
            assert!(errors.contains("frequency"));
        }
        other => panic!("unexpected {:?}", other),
    }

    let mut doc = log_to_metric_doc("acctest-mixed");
    doc["time_window"] = json!(30);
    assert!(matches!(rule.create(&doc).await, Err(MapperError::InvalidCombination(_))));

    assert!(fake.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn import_protection_refuses_existing_rule() {
    let fake = Arc::new(FakeRules::default());
    instance(&fake).create(&alerting_doc("acctest-taken")).await.unwrap();

    let mut second = instance(&fake).require_import(true);
    match second.create(&alerting_doc("acctest-taken")).await.unwrap_err() {
        MapperError::AlreadyExists { resource_type, id } => {
            assert_eq!(resource_type, "azurerm_monitor_scheduled_query_rules");
            assert_eq!(id, FakeRules::id_for("acctestRG", "acctest-taken"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(fake.puts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn update_resubmits_full_body() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);
    rule.create(&alerting_doc("acctest-update")).await.unwrap();

    let mut doc = alerting_doc("acctest-update");
    doc["enabled"] = json!(false);
    doc["throttling"] = json!(0);
    rule.update(&doc).await.unwrap();

    let state = rule.read().await.unwrap().unwrap();
    assert_eq!(state.enabled, Some(false));
    assert_eq!(state.throttling, Some(0));
    assert_eq!(state.severity.as_deref(), Some("3"));
}

#[tokio::test]
async fn update_cannot_rename() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);
    rule.create(&alerting_doc("acctest-a")).await.unwrap();
    let err = rule.update(&alerting_doc("acctest-b")).await.unwrap_err();
    assert!(matches!(err, MapperError::InvalidCombination(_)));
}

#[tokio::test]
async fn update_matches_identity_case_insensitively() {
    let fake = Arc::new(FakeRules::default());
    let mut rule = instance(&fake);
    rule.create(&alerting_doc("acctest-case")).await.unwrap();
    let mut doc = alerting_doc("ACCTEST-Case");
    doc["resource_group_name"] = json!("ACCTESTRG");
    rule.update(&doc).await.unwrap();
}

#[tokio::test]
async fn handle_for_another_resource_type_is_rejected() {
    let fake = Arc::new(FakeRules::default());
    let handle = ResourceHandle(
        "/subscriptions/s/resourceGroups/rg/providers/Microsoft.HDInsight/clusters/c1".into(),
    );
    let mut rule = Instance::existing(ScheduledQueryRulesResource::new(fake), handle);
    assert!(matches!(rule.read().await, Err(MapperError::InvalidResourceId(_))));
}

#[tokio::test]
async fn unknown_remote_action_reads_without_action_type() {
    let fake = Arc::new(FakeRules::default());
    let rule: LogSearchRuleResource = serde_json::from_value(json!({
        "id": FakeRules::id_for("acctestRG", "future"),
        "location": "westeurope",
        "properties": {
            "source": { "dataSourceId": common::WORKSPACE },
            "action": { "odata.type": "Some.Future.Action" }
        }
    }))
    .unwrap();
    assert!(matches!(
        rule.properties.as_ref().and_then(|p: &LogSearchRule| p.action.clone()),
        Some(Action::Unknown)
    ));
    fake.insert("acctestRG", "future", rule);

    let mut inst = Instance::existing(
        ScheduledQueryRulesResource::new(fake.clone()),
        ResourceHandle(FakeRules::id_for("acctestRG", "future")),
    );
    let state = inst.read().await.unwrap().unwrap();
    assert_eq!(state.action_type, None);
    assert_eq!(state.data_source_id.as_deref(), Some(common::WORKSPACE));
}

#[tokio::test]
async fn data_source_reads_existing_and_fails_on_missing() {
    let fake = Arc::new(FakeRules::default());
    instance(&fake).create(&log_to_metric_doc("acctest-ds")).await.unwrap();
    let ds = ScheduledQueryRulesDataSource::new(fake.clone());

    let state = ds.read(&json!({ "name": "acctest-ds", "resource_group_name": "acctestRG" })).await.unwrap();
    assert_eq!(state.id, Some(FakeRules::id_for("acctestRG", "acctest-ds")));
    assert_eq!(state.criteria.len(), 1);

    let err = ds.read(&json!({ "name": "nope", "resource_group_name": "acctestRG" })).await.unwrap_err();
    assert!(matches!(err, MapperError::NotFound { .. }));
}
