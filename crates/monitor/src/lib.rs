//! `azurerm_monitor_scheduled_query_rules`: log-search alert rules and
//! log-to-metric conversions over Azure Monitor.

pub mod config;
pub mod data_source;
pub mod expand;
pub mod flatten;
pub mod resource;
pub mod schema;

pub use config::{ActionKind, ScheduledQueryRuleConfig, ScheduledQueryRuleState};
pub use data_source::ScheduledQueryRulesDataSource;
pub use expand::expand_rule;
pub use flatten::flatten_rule;
pub use resource::ScheduledQueryRulesResource;
pub use schema::{DATA_SOURCE_SCHEMA, RESOURCE_SCHEMA, RESOURCE_TYPE};
