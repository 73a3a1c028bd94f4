use azmapper_core::{AttrType, Attribute, DefaultValue, Schema, Validator, RESOURCE_GROUP_NAME};

pub const RESOURCE_TYPE: &str = "azurerm_monitor_scheduled_query_rules";

pub const ACTION_TYPES: &[&str] = &["AlertingAction", "LogToMetricAction"];
pub const QUERY_TYPES: &[&str] = &["ResultCount"];
pub const OPERATORS: &[&str] = &["GreaterThan", "LessThan", "Equal"];
pub const METRIC_TRIGGER_TYPES: &[&str] = &["Consecutive", "Total"];
pub const SEVERITIES: &[&str] = &["0", "1", "2", "3", "4"];

const AZNS_ACTION: &[Attribute] = &[
    Attribute::required("action_group", AttrType::StringSet).validate(&[Validator::ResourceId]),
    Attribute::optional("custom_webhook_payload", AttrType::String).validate(&[Validator::HttpUrl]),
    Attribute::optional("email_subject", AttrType::String),
];

const DIMENSION: &[Attribute] = &[
    Attribute::required("name", AttrType::String).validate(&[Validator::NonEmpty]),
    Attribute::required("operator", AttrType::String).validate(&[Validator::NonEmpty]),
    Attribute::required("values", AttrType::StringList),
];

const CRITERIA: &[Attribute] = &[
    Attribute::required("dimension", AttrType::BlockList { attributes: DIMENSION, max_items: None }),
    Attribute::required("metric_name", AttrType::String).validate(&[Validator::NonEmpty]),
];

const METRIC_TRIGGER: &[Attribute] = &[
    Attribute::required("metric_column", AttrType::String).validate(&[Validator::NonEmpty]),
    Attribute::required("metric_trigger_type", AttrType::String)
        .validate(&[Validator::OneOf(METRIC_TRIGGER_TYPES)]),
    Attribute::required("operator", AttrType::String).validate(&[Validator::OneOf(OPERATORS)]),
    Attribute::required("threshold", AttrType::Float),
];

const TRIGGER: &[Attribute] = &[
    Attribute::optional("metric_trigger", AttrType::Block(METRIC_TRIGGER)),
    Attribute::required("operator", AttrType::String).validate(&[Validator::OneOf(OPERATORS)]),
    Attribute::required("threshold", AttrType::Float),
];

pub const RESOURCE_SCHEMA: Schema = Schema {
    type_name: RESOURCE_TYPE,
    attributes: &[
        Attribute::required("name", AttrType::String).validate(&[Validator::NonEmpty]).force_new(),
        Attribute::required("resource_group_name", AttrType::String)
            .validate(&[RESOURCE_GROUP_NAME])
            .force_new(),
        Attribute::required("location", AttrType::String).validate(&[Validator::NonEmpty]).force_new(),
        Attribute::required("action_type", AttrType::String).validate(&[Validator::OneOf(ACTION_TYPES)]),
        Attribute::optional("authorized_resources", AttrType::StringSet).validate(&[Validator::ResourceId]),
        Attribute::optional("azns_action", AttrType::Block(AZNS_ACTION)),
        Attribute::optional("criteria", AttrType::BlockList { attributes: CRITERIA, max_items: None }),
        Attribute::required("data_source_id", AttrType::String).validate(&[Validator::ResourceId]),
        Attribute::optional("description", AttrType::String),
        Attribute::optional("enabled", AttrType::Bool).default(DefaultValue::Bool(true)),
        Attribute::optional("frequency", AttrType::Int).validate(&[Validator::IntAtLeast(1)]),
        Attribute::computed("last_updated_time", AttrType::String),
        Attribute::computed("provisioning_state", AttrType::String),
        Attribute::optional("query", AttrType::String),
        Attribute::optional("query_type", AttrType::String)
            .default(DefaultValue::Str("ResultCount"))
            .validate(&[Validator::OneOf(QUERY_TYPES)]),
        Attribute::optional("severity", AttrType::String).validate(&[Validator::OneOf(SEVERITIES)]),
        Attribute::optional("throttling", AttrType::Int).validate(&[Validator::IntAtLeast(0)]),
        Attribute::optional("time_window", AttrType::Int).validate(&[Validator::IntAtLeast(1)]),
        Attribute::optional("trigger", AttrType::Block(TRIGGER)),
        Attribute::optional("tags", AttrType::StringMap),
    ],
};

const COMPUTED_AZNS_ACTION: &[Attribute] = &[
    Attribute::computed("action_group", AttrType::StringSet),
    Attribute::computed("custom_webhook_payload", AttrType::String),
    Attribute::computed("email_subject", AttrType::String),
];

const COMPUTED_DIMENSION: &[Attribute] = &[
    Attribute::computed("name", AttrType::String),
    Attribute::computed("operator", AttrType::String),
    Attribute::computed("values", AttrType::StringList),
];

const COMPUTED_CRITERIA: &[Attribute] = &[
    Attribute::computed("dimension", AttrType::BlockList { attributes: COMPUTED_DIMENSION, max_items: None }),
    Attribute::computed("metric_name", AttrType::String),
];

const COMPUTED_METRIC_TRIGGER: &[Attribute] = &[
    Attribute::computed("metric_column", AttrType::String),
    Attribute::computed("metric_trigger_type", AttrType::String),
    Attribute::computed("operator", AttrType::String),
    Attribute::computed("threshold", AttrType::Float),
];

const COMPUTED_TRIGGER: &[Attribute] = &[
    Attribute::computed("metric_trigger", AttrType::Block(COMPUTED_METRIC_TRIGGER)),
    Attribute::computed("operator", AttrType::String),
    Attribute::computed("threshold", AttrType::Float),
];

/// Lookup-only view: identify by name and resource group, everything else is read back.
pub const DATA_SOURCE_SCHEMA: Schema = Schema {
    type_name: RESOURCE_TYPE,
    attributes: &[
        Attribute::required("name", AttrType::String).validate(&[Validator::NonEmpty]),
        Attribute::required("resource_group_name", AttrType::String).validate(&[RESOURCE_GROUP_NAME]),
        Attribute::computed("location", AttrType::String),
        Attribute::computed("action_type", AttrType::String),
        Attribute::computed("authorized_resources", AttrType::StringSet),
        Attribute::computed("azns_action", AttrType::Block(COMPUTED_AZNS_ACTION)),
        Attribute::computed("criteria", AttrType::BlockList { attributes: COMPUTED_CRITERIA, max_items: None }),
        Attribute::computed("data_source_id", AttrType::String),
        Attribute::computed("description", AttrType::String),
        Attribute::computed("enabled", AttrType::Bool),
        Attribute::computed("frequency", AttrType::Int),
        Attribute::computed("last_updated_time", AttrType::String),
        Attribute::computed("provisioning_state", AttrType::String),
        Attribute::computed("query", AttrType::String),
        Attribute::computed("query_type", AttrType::String),
        Attribute::computed("severity", AttrType::String),
        Attribute::computed("throttling", AttrType::Int),
        Attribute::computed("time_window", AttrType::Int),
        Attribute::computed("trigger", AttrType::Block(COMPUTED_TRIGGER)),
        Attribute::computed("tags", AttrType::StringMap),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WORKSPACE: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/Microsoft.OperationalInsights/workspaces/ws";

    #[test]
    fn minimal_alerting_document_is_valid() {
        let doc = json!({
            "name": "rule",
            "resource_group_name": "rg",
            "location": "westeurope",
            "action_type": "AlertingAction",
            "data_source_id": WORKSPACE,
            "severity": "3",
            "trigger": { "operator": "GreaterThan", "threshold": 5000 },
        });
        RESOURCE_SCHEMA.validate(&doc).unwrap();
    }

    #[test]
    fn every_problem_is_reported_at_once() {
        let doc = json!({
            "name": "",
            "resource_group_name": "bad.",
            "action_type": "Webhook",
            "data_source_id": "not-an-id",
            "severity": "7",
            "query_type": "Number",
            "azns_action": { "action_group": ["x"], "custom_webhook_payload": "ftp://host/x" },
            "trigger": { "operator": "Above", "threshold": 1, "metric_trigger": { "metric_column": "c", "metric_trigger_type": "Sometimes", "operator": "Equal", "threshold": 1 } },
            "provisioning_state": "Succeeded",
        });
        let err = RESOURCE_SCHEMA.validate(&doc).unwrap_err();
        for path in [
            "name",
            "resource_group_name",
            "location",
            "action_type",
            "data_source_id",
            "severity",
            "query_type",
            "azns_action.action_group.0",
            "azns_action.custom_webhook_payload",
            "trigger.operator",
            "trigger.metric_trigger.metric_trigger_type",
            "provisioning_state",
        ] {
            assert!(err.contains(path), "expected a violation at {}: {}", path, err);
        }
    }

    #[test]
    fn data_source_only_takes_identity() {
        DATA_SOURCE_SCHEMA.validate(&json!({ "name": "r", "resource_group_name": "rg" })).unwrap();
        let err = DATA_SOURCE_SCHEMA
            .validate(&json!({ "name": "r", "resource_group_name": "rg", "query": "x" }))
            .unwrap_err();
        assert!(err.contains("query"));
    }
}
