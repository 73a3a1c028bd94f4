use azmapper_azure::ScheduledQueryRulesApi;
use azmapper_core::{MapperError, Result, Schema};
use serde::Deserialize;
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::instrument;

use crate::config::ScheduledQueryRuleState;
use crate::flatten::flatten_rule;
use crate::resource::{api_error, KIND};
use crate::schema::DATA_SOURCE_SCHEMA;

#[derive(Debug, Clone, Deserialize)]
pub struct RuleLookup {
    pub name: String,
    pub resource_group_name: String,
}

/// Read-only view of an existing rule.
#[derive(Clone)]
pub struct ScheduledQueryRulesDataSource {
    client: Arc<dyn ScheduledQueryRulesApi>,
}

impl ScheduledQueryRulesDataSource {
    pub fn new(client: Arc<dyn ScheduledQueryRulesApi>) -> Self {
        Self { client }
    }

    pub fn schema(&self) -> &'static Schema {
        &DATA_SOURCE_SCHEMA
    }

    pub async fn read(&self, doc: &Json) -> Result<ScheduledQueryRuleState> {
        let lookup: RuleLookup = DATA_SOURCE_SCHEMA.decode(doc)?;
        self.lookup(&lookup).await
    }

    /// Unlike the managed resource, a missing rule is an error here.
    #[instrument(skip_all, fields(name = %lookup.name, rg = %lookup.resource_group_name))]
    pub async fn lookup(&self, lookup: &RuleLookup) -> Result<ScheduledQueryRuleState> {
        let (name, rg) = (&lookup.name, &lookup.resource_group_name);
        match self.client.get(rg, name).await {
            Ok(rule) => Ok(flatten_rule(name, rg, &rule)),
            Err(e) if e.is_not_found() => {
                Err(MapperError::NotFound { kind: KIND, name: name.clone(), resource_group: rg.clone() })
            }
            Err(e) => Err(api_error("retrieving", name, rg, e)),
        }
    }
}
