//! Configuration to request body.

use azmapper_azure::insights::models::{
    Action, AlertingAction, AzNsActionGroup, Criteria, Dimension, LogMetricTrigger, LogSearchRule,
    LogSearchRuleResource, LogToMetricAction, Schedule, Source, TriggerCondition,
};
use azmapper_core::{normalize_location, MapperError, Result};

use crate::config::{
    ActionKind, AznsActionConfig, CriteriaConfig, MetricTriggerConfig, ScheduledQueryRuleConfig,
    TriggerConfig,
};
use crate::schema::{ACTION_TYPES, QUERY_TYPES};

/// Builds the full PUT body for a rule.
pub fn expand_rule(config: &ScheduledQueryRuleConfig) -> Result<LogSearchRuleResource> {
    let kind = action_kind(config)?;
    let action = expand_action(config, kind)?;
    let schedule = expand_schedule(config, kind)?;
    let source = expand_source(config)?;

    Ok(LogSearchRuleResource {
        location: Some(normalize_location(&config.location)),
        tags: Some(config.tags.clone()),
        properties: Some(LogSearchRule {
            description: config.description.clone(),
            enabled: config.enabled.map(Into::into),
            source: Some(source),
            schedule,
            action: Some(action),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn action_kind(config: &ScheduledQueryRuleConfig) -> Result<ActionKind> {
    config.action_type.parse().map_err(|_| MapperError::UnsupportedVariant {
        attribute: "action_type",
        value: config.action_type.clone(),
        expected: ACTION_TYPES,
    })
}

pub fn expand_action(config: &ScheduledQueryRuleConfig, kind: ActionKind) -> Result<Action> {
    match kind {
        ActionKind::Alerting => {
            if !config.criteria.is_empty() {
                return Err(MapperError::InvalidCombination(format!(
                    "`criteria` is only supported when action_type is {:?}",
                    ActionKind::LogToMetric.as_str()
                )));
            }
            Ok(Action::Alerting(AlertingAction {
                severity: config.severity.clone(),
                azns_action: config.azns_action.as_ref().map(expand_azns_action),
                throttling_in_min: config.throttling,
                trigger: config.trigger.as_ref().map(expand_trigger),
            }))
        }
        ActionKind::LogToMetric => {
            let alerting_only: Vec<&str> = [
                ("azns_action", config.azns_action.is_some()),
                ("severity", config.severity.is_some()),
                ("throttling", config.throttling.is_some()),
                ("trigger", config.trigger.is_some()),
            ]
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect();
            if !alerting_only.is_empty() {
                return Err(MapperError::InvalidCombination(format!(
                    "{} only supported when action_type is {:?}",
                    alerting_only.join(", "),
                    ActionKind::Alerting.as_str()
                )));
            }
            if config.criteria.is_empty() {
                return Err(MapperError::InvalidCombination(format!(
                    "`criteria` is required when action_type is {:?}",
                    ActionKind::LogToMetric.as_str()
                )));
            }
            Ok(Action::LogToMetric(LogToMetricAction {
                criteria: Some(expand_criteria(&config.criteria)),
            }))
        }
    }
}

/// Alerting rules carry a schedule built from whichever of frequency and
/// time window are set. Log-to-metric rules carry none.
pub fn expand_schedule(config: &ScheduledQueryRuleConfig, kind: ActionKind) -> Result<Option<Schedule>> {
    let set = config.frequency.is_some() || config.time_window.is_some();
    match kind {
        ActionKind::Alerting if set => Ok(Some(Schedule {
            frequency_in_minutes: config.frequency,
            time_window_in_minutes: config.time_window,
        })),
        ActionKind::Alerting => Ok(None),
        ActionKind::LogToMetric if set => Err(MapperError::InvalidCombination(format!(
            "frequency and time_window are only supported when action_type is {:?}",
            ActionKind::Alerting.as_str()
        ))),
        ActionKind::LogToMetric => Ok(None),
    }
}

pub fn expand_source(config: &ScheduledQueryRuleConfig) -> Result<Source> {
    let query_type = config.query_type.as_deref().unwrap_or("ResultCount");
    if !QUERY_TYPES.contains(&query_type) {
        return Err(MapperError::InvalidEnum {
            attribute: "query_type",
            value: query_type.to_string(),
            expected: QUERY_TYPES,
        });
    }
    let authorized_resources = (!config.authorized_resources.is_empty())
        .then(|| config.authorized_resources.iter().cloned().collect());

    Ok(Source {
        query: config.query.clone(),
        authorized_resources,
        data_source_id: Some(config.data_source_id.clone()),
        query_type: Some(query_type.to_string()),
    })
}

pub fn expand_azns_action(azns: &AznsActionConfig) -> AzNsActionGroup {
    AzNsActionGroup {
        action_group: Some(azns.action_group.iter().cloned().collect()),
        email_subject: azns.email_subject.clone(),
        custom_webhook_payload: azns.custom_webhook_payload.clone(),
    }
}

pub fn expand_trigger(trigger: &TriggerConfig) -> TriggerCondition {
    TriggerCondition {
        threshold_operator: Some(trigger.operator.clone()),
        threshold: Some(trigger.threshold),
        metric_trigger: trigger.metric_trigger.as_ref().map(expand_metric_trigger),
    }
}

fn expand_metric_trigger(metric: &MetricTriggerConfig) -> LogMetricTrigger {
    LogMetricTrigger {
        threshold_operator: Some(metric.operator.clone()),
        threshold: Some(metric.threshold),
        metric_trigger_type: Some(metric.metric_trigger_type.clone()),
        metric_column: Some(metric.metric_column.clone()),
    }
}

pub fn expand_criteria(criteria: &[CriteriaConfig]) -> Vec<Criteria> {
    criteria
        .iter()
        .map(|c| Criteria {
            metric_name: Some(c.metric_name.clone()),
            dimensions: Some(
                c.dimension
                    .iter()
                    .map(|d| Dimension {
                        name: Some(d.name.clone()),
                        operator: Some(d.operator.clone()),
                        values: Some(d.values.clone()),
                    })
                    .collect(),
            ),
        })
        .collect()
}
