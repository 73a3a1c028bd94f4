#![allow(dead_code)]

use async_trait::async_trait;
use azmapper_azure::insights::models::LogSearchRuleResource;
use azmapper_azure::{ApiError, ScheduledQueryRulesApi};
use serde_json::{json, Value as Json};
use std::collections::HashMap;
use std::sync::Mutex;

pub const WORKSPACE: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/acctestRG/providers/Microsoft.OperationalInsights/workspaces/acctestWS";

/// In-memory rules service. Stores what was PUT and echoes it back with
/// the server-assigned fields filled in.
#[derive(Default)]
pub struct FakeRules {
    pub rules: Mutex<HashMap<(String, String), LogSearchRuleResource>>,
    pub puts: Mutex<Vec<LogSearchRuleResource>>,
    pub fail_gets_with: Mutex<Option<u16>>,
}

fn not_found() -> ApiError {
    ApiError::NotFound { code: "ResourceNotFound".into(), message: "not found".into() }
}

impl FakeRules {
    pub fn id_for(resource_group: &str, name: &str) -> String {
        format!(
            "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/{}/providers/microsoft.insights/scheduledqueryrules/{}",
            resource_group, name
        )
    }

    /// Simulates a deletion made outside the tool.
    pub fn remove(&self, resource_group: &str, name: &str) {
        self.rules.lock().unwrap().remove(&(resource_group.to_string(), name.to_string()));
    }

    pub fn insert(&self, resource_group: &str, name: &str, rule: LogSearchRuleResource) {
        self.rules.lock().unwrap().insert((resource_group.to_string(), name.to_string()), rule);
    }
}

#[async_trait]
impl ScheduledQueryRulesApi for FakeRules {
    async fn get(&self, resource_group: &str, name: &str) -> azmapper_azure::Result<LogSearchRuleResource> {
        if let Some(status) = *self.fail_gets_with.lock().unwrap() {
            return Err(ApiError::Status { status, code: "Boom".into(), message: "injected".into() });
        }
        self.rules
            .lock()
            .unwrap()
            .get(&(resource_group.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &LogSearchRuleResource,
    ) -> azmapper_azure::Result<LogSearchRuleResource> {
        self.puts.lock().unwrap().push(parameters.clone());
        let mut stored = parameters.clone();
        stored.id = Some(Self::id_for(resource_group, name));
        stored.name = Some(name.to_string());
        stored.resource_type = Some("Microsoft.Insights/scheduledQueryRules".into());
        if let Some(props) = stored.properties.as_mut() {
            props.provisioning_state = Some("Succeeded".into());
            props.last_updated_time = Some("2026-10-18T09:00:00Z".into());
            if props.enabled.is_none() {
                props.enabled = Some(true.into());
            }
        }
        self.insert(resource_group, name, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, resource_group: &str, name: &str) -> azmapper_azure::Result<()> {
        self.rules
            .lock()
            .unwrap()
            .remove(&(resource_group.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(not_found)
    }
}

pub fn alerting_doc(name: &str) -> Json {
    json!({
        "name": name,
        "resource_group_name": "acctestRG",
        "location": "West Europe",
        "action_type": "AlertingAction",
        "data_source_id": WORKSPACE,
        "description": "Alert when total results cross threshold",
        "query": "requests | where tolong(resultCode) >= 500 | summarize count() by bin(timestamp, 5m)",
        "severity": "3",
        "frequency": 5,
        "time_window": 30,
        "trigger": { "operator": "GreaterThan", "threshold": 5000 },
    })
}

pub fn log_to_metric_doc(name: &str) -> Json {
    json!({
        "name": name,
        "resource_group_name": "acctestRG",
        "location": "westeurope",
        "action_type": "LogToMetricAction",
        "data_source_id": WORKSPACE,
        "criteria": [{
            "metric_name": "Average_percent Idle Time",
            "dimension": [{ "name": "dimension", "operator": "GreaterThan", "values": ["latency"] }],
        }],
    })
}
