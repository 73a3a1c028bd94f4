use async_trait::async_trait;
use azmapper_azure::{ApiError, ScheduledQueryRulesApi};
use azmapper_core::{Deletion, MapperError, Resource, ResourceHandle, Result, Schema};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::{ScheduledQueryRuleConfig, ScheduledQueryRuleState};
use crate::expand::expand_rule;
use crate::flatten::flatten_rule;
use crate::schema::RESOURCE_SCHEMA;

pub(crate) const KIND: &str = "Scheduled Query Rule";
const ID_SEGMENT: &str = "scheduledQueryRules";

pub(crate) fn api_error(action: &'static str, name: &str, resource_group: &str, err: ApiError) -> MapperError {
    if err.is_cancelled() {
        MapperError::Cancelled
    } else {
        MapperError::remote(action, KIND, name, resource_group, err)
    }
}

/// Splits a rule handle into (resource group, name).
pub(crate) fn parse_handle(handle: &ResourceHandle) -> Result<(String, String)> {
    let id = handle.parse()?;
    let name = id.require(ID_SEGMENT)?.to_string();
    Ok((id.resource_group, name))
}

/// `azurerm_monitor_scheduled_query_rules` bound to a rules client.
#[derive(Clone)]
pub struct ScheduledQueryRulesResource {
    client: Arc<dyn ScheduledQueryRulesApi>,
}

impl ScheduledQueryRulesResource {
    pub fn new(client: Arc<dyn ScheduledQueryRulesApi>) -> Self {
        Self { client }
    }

    /// PUT then GET; the ID is only trusted from the read-back.
    async fn put(&self, config: &ScheduledQueryRuleConfig) -> Result<ResourceHandle> {
        let (name, rg) = (&config.name, &config.resource_group_name);
        let parameters = expand_rule(config)?;
        self.client
            .create_or_update(rg, name, &parameters)
            .await
            .map_err(|e| api_error("creating or updating", name, rg, e))?;
        let read = self.client.get(rg, name).await.map_err(|e| api_error("retrieving", name, rg, e))?;
        read.id
            .filter(|id| !id.is_empty())
            .map(ResourceHandle)
            .ok_or_else(|| MapperError::MissingId { kind: KIND, name: name.clone(), resource_group: rg.clone() })
    }
}

#[async_trait]
impl Resource for ScheduledQueryRulesResource {
    type Config = ScheduledQueryRuleConfig;
    type State = ScheduledQueryRuleState;

    fn schema(&self) -> &'static Schema {
        &RESOURCE_SCHEMA
    }

    async fn find_existing(&self, config: &ScheduledQueryRuleConfig) -> Result<Option<ResourceHandle>> {
        let (name, rg) = (&config.name, &config.resource_group_name);
        match self.client.get(rg, name).await {
            Ok(existing) => Ok(existing.id.filter(|id| !id.is_empty()).map(ResourceHandle)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(api_error("checking for presence of existing", name, rg, e)),
        }
    }

    #[instrument(skip_all, fields(name = %config.name, rg = %config.resource_group_name))]
    async fn create(&self, config: &ScheduledQueryRuleConfig) -> Result<ResourceHandle> {
        self.put(config).await
    }

    #[instrument(skip_all, fields(id = %handle))]
    async fn read(
        &self,
        handle: &ResourceHandle,
        _prior: Option<&ScheduledQueryRuleConfig>,
    ) -> Result<Option<ScheduledQueryRuleState>> {
        let (rg, name) = parse_handle(handle)?;
        match self.client.get(&rg, &name).await {
            Ok(rule) => Ok(Some(flatten_rule(&name, &rg, &rule))),
            Err(e) if e.is_not_found() => {
                debug!("scheduled query rule is gone");
                Ok(None)
            }
            Err(e) => Err(api_error("retrieving", &name, &rg, e)),
        }
    }

    #[instrument(skip_all, fields(id = %handle))]
    async fn update(
        &self,
        handle: &ResourceHandle,
        _prior: Option<&ScheduledQueryRuleConfig>,
        config: &ScheduledQueryRuleConfig,
    ) -> Result<()> {
        let (rg, name) = parse_handle(handle)?;
        if !rg.eq_ignore_ascii_case(&config.resource_group_name) || !name.eq_ignore_ascii_case(&config.name) {
            return Err(MapperError::InvalidCombination(format!(
                "name and resource_group_name force a new resource: {} cannot become {}/{}",
                handle, config.resource_group_name, config.name
            )));
        }
        self.put(config).await.map(|_| ())
    }

    #[instrument(skip_all, fields(id = %handle))]
    async fn delete(&self, handle: &ResourceHandle) -> Result<Deletion> {
        let (rg, name) = parse_handle(handle)?;
        match self.client.delete(&rg, &name).await {
            Ok(()) => Ok(Deletion::Deleted),
            Err(e) if e.is_not_found() => Ok(Deletion::AlreadyGone),
            Err(e) => Err(api_error("deleting", &name, &rg, e)),
        }
    }
}
