pub mod models;

use async_trait::async_trait;

use crate::error::Result;
use crate::http::ArmClient;
use models::{LogSearchRuleResource, API_VERSION, PROVIDER_PATH};

/// Operations on scheduled query rules, keyed by resource group and name.
#[async_trait]
pub trait ScheduledQueryRulesApi: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<LogSearchRuleResource>;

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &LogSearchRuleResource,
    ) -> Result<LogSearchRuleResource>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct ScheduledQueryRulesClient {
    arm: ArmClient,
}

impl ScheduledQueryRulesClient {
    pub fn new(arm: ArmClient) -> Self { Self { arm } }
}

#[async_trait]
impl ScheduledQueryRulesApi for ScheduledQueryRulesClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<LogSearchRuleResource> {
        let url = self.arm.resource_url(resource_group, PROVIDER_PATH, name, &[], API_VERSION)?;
        self.arm.get(&url).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &LogSearchRuleResource,
    ) -> Result<LogSearchRuleResource> {
        let url = self.arm.resource_url(resource_group, PROVIDER_PATH, name, &[], API_VERSION)?;
        self.arm.put(&url, parameters).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()> {
        let url = self.arm.resource_url(resource_group, PROVIDER_PATH, name, &[], API_VERSION)?;
        self.arm.delete(&url).await
    }
}
