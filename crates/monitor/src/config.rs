//! Typed user configuration and observed state of a scheduled query rule.

use azmapper_azure::insights::models::Action;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// The two supported action variants, keyed by the user-facing literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Alerting,
    LogToMetric,
}

impl ActionKind {
    const TABLE: [(ActionKind, &'static str); 2] = [
        (ActionKind::Alerting, "AlertingAction"),
        (ActionKind::LogToMetric, "LogToMetricAction"),
    ];

    pub fn as_str(self) -> &'static str {
        Self::TABLE.iter().find(|(k, _)| *k == self).map(|(_, s)| *s).unwrap_or_default()
    }

    /// The kind of a decoded wire action, `None` for unrecognised discriminators.
    pub fn of(action: &Action) -> Option<Self> {
        match action {
            Action::Alerting(_) => Some(ActionKind::Alerting),
            Action::LogToMetric(_) => Some(ActionKind::LogToMetric),
            Action::Unknown => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActionType(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::TABLE
            .iter()
            .find(|(_, literal)| *literal == s)
            .map(|(k, _)| *k)
            .ok_or_else(|| UnknownActionType(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AznsActionConfig {
    #[serde(default)]
    pub action_group: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_webhook_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionConfig {
    pub name: String,
    pub operator: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaConfig {
    #[serde(default)]
    pub dimension: Vec<DimensionConfig>,
    pub metric_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTriggerConfig {
    pub metric_column: String,
    pub metric_trigger_type: String,
    pub operator: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_trigger: Option<MetricTriggerConfig>,
    pub operator: String,
    pub threshold: f64,
}

/// What the user declares for `azurerm_monitor_scheduled_query_rules`.
///
/// Optional scalars stay `Option` so an explicit zero survives the trip to
/// the wire and back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledQueryRuleConfig {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub action_type: String,
    pub data_source_id: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub authorized_resources: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azns_action: Option<AznsActionConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<CriteriaConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttling: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// A rule as read back from the service. Absent remote fields stay `None`
/// and are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledQueryRuleState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub resource_group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub authorized_resources: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azns_action: Option<AznsActionConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<CriteriaConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttling: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl ScheduledQueryRuleState {
    /// Rebuilds a configuration from observed state. `None` when a required
    /// attribute was not reported.
    pub fn to_config(&self) -> Option<ScheduledQueryRuleConfig> {
        Some(ScheduledQueryRuleConfig {
            name: self.name.clone(),
            resource_group_name: self.resource_group_name.clone(),
            location: self.location.clone()?,
            action_type: self.action_type.clone()?,
            data_source_id: self.data_source_id.clone()?,
            authorized_resources: self.authorized_resources.clone(),
            azns_action: self.azns_action.clone(),
            criteria: self.criteria.clone(),
            description: self.description.clone(),
            enabled: self.enabled,
            frequency: self.frequency,
            query: self.query.clone(),
            query_type: self.query_type.clone(),
            severity: self.severity.clone(),
            throttling: self.throttling,
            time_window: self.time_window,
            trigger: self.trigger.clone(),
            tags: self.tags.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ACTION_TYPES;

    #[test]
    fn action_kind_literals_match_schema() {
        for literal in ACTION_TYPES {
            let kind: ActionKind = literal.parse().unwrap();
            assert_eq!(kind.as_str(), *literal);
        }
        assert_eq!("Webhook".parse::<ActionKind>(), Err(UnknownActionType("Webhook".into())));
    }

    #[test]
    fn unset_fields_are_not_serialized() {
        let state = ScheduledQueryRuleState {
            name: "r".into(),
            resource_group_name: "rg".into(),
            throttling: Some(0),
            ..Default::default()
        };
        let v = serde_json::to_value(&state).unwrap();
        assert_eq!(v["throttling"], 0);
        assert!(v.get("severity").is_none());
        assert!(v.get("criteria").is_none());
    }

    #[test]
    fn state_without_required_fields_has_no_config() {
        let state = ScheduledQueryRuleState { name: "r".into(), ..Default::default() };
        assert!(state.to_config().is_none());
    }
}
