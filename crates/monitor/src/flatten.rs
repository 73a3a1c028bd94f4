//! Response body to observed state.

use azmapper_azure::insights::models::{
    Action, AzNsActionGroup, Criteria, LogMetricTrigger, LogSearchRuleResource, TriggerCondition,
};
use azmapper_core::normalize_location;
use tracing::debug;

use crate::config::{
    ActionKind, AznsActionConfig, CriteriaConfig, DimensionConfig, MetricTriggerConfig,
    ScheduledQueryRuleState, TriggerConfig,
};

/// Maps a GET response onto state. Only fields the service reported are set.
pub fn flatten_rule(name: &str, resource_group: &str, rule: &LogSearchRuleResource) -> ScheduledQueryRuleState {
    let mut state = ScheduledQueryRuleState {
        id: rule.id.clone(),
        name: name.to_string(),
        resource_group_name: resource_group.to_string(),
        location: rule.location.as_deref().map(normalize_location),
        tags: rule.tags.clone().unwrap_or_default(),
        ..Default::default()
    };

    let Some(props) = &rule.properties else {
        return state;
    };
    state.description = props.description.clone();
    state.enabled = props.enabled.map(Into::into);
    state.last_updated_time = props.last_updated_time.clone();
    state.provisioning_state = props.provisioning_state.clone();

    if let Some(source) = &props.source {
        state.query = source.query.clone();
        state.query_type = source.query_type.clone();
        state.data_source_id = source.data_source_id.clone();
        state.authorized_resources = source.authorized_resources.iter().flatten().cloned().collect();
    }
    if let Some(schedule) = &props.schedule {
        state.frequency = schedule.frequency_in_minutes;
        state.time_window = schedule.time_window_in_minutes;
    }

    if let Some(action) = &props.action {
        state.action_type = ActionKind::of(action).map(|k| k.as_str().to_string());
        match action {
            Action::Alerting(alerting) => {
                state.severity = alerting.severity.clone();
                state.throttling = alerting.throttling_in_min;
                state.azns_action = alerting.azns_action.as_ref().map(flatten_azns_action);
                state.trigger = alerting.trigger.as_ref().and_then(flatten_trigger);
            }
            Action::LogToMetric(metric) => {
                state.criteria = metric.criteria.iter().flatten().filter_map(flatten_criteria).collect();
            }
            Action::Unknown => debug!(rule = name, "rule carries an action type this client does not know"),
        }
    }
    state
}

pub fn flatten_azns_action(azns: &AzNsActionGroup) -> AznsActionConfig {
    AznsActionConfig {
        action_group: azns.action_group.iter().flatten().cloned().collect(),
        custom_webhook_payload: azns.custom_webhook_payload.clone(),
        email_subject: azns.email_subject.clone(),
    }
}

/// A trigger without both operator and threshold cannot be expressed as
/// configuration and is left unset.
pub fn flatten_trigger(trigger: &TriggerCondition) -> Option<TriggerConfig> {
    Some(TriggerConfig {
        operator: trigger.threshold_operator.clone()?,
        threshold: trigger.threshold?,
        metric_trigger: trigger.metric_trigger.as_ref().and_then(flatten_metric_trigger),
    })
}

fn flatten_metric_trigger(metric: &LogMetricTrigger) -> Option<MetricTriggerConfig> {
    Some(MetricTriggerConfig {
        metric_column: metric.metric_column.clone()?,
        metric_trigger_type: metric.metric_trigger_type.clone()?,
        operator: metric.threshold_operator.clone()?,
        threshold: metric.threshold?,
    })
}

pub fn flatten_criteria(criteria: &Criteria) -> Option<CriteriaConfig> {
    let dimension = criteria
        .dimensions
        .iter()
        .flatten()
        .filter_map(|d| {
            Some(DimensionConfig {
                name: d.name.clone()?,
                operator: d.operator.clone()?,
                values: d.values.clone().unwrap_or_default(),
            })
        })
        .collect();
    Some(CriteriaConfig { metric_name: criteria.metric_name.clone()?, dimension })
}
