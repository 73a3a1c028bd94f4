use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;

use crate::error::Result;
use crate::http::{ArmClient, ClientSettings};

pub const PUBLIC_CLOUD_ENDPOINT: &str = "https://management.azure.com";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    /// Refuse to create over an existing remote object with the same name.
    #[serde(default)]
    pub resources_must_be_imported: bool,
}

/// The `provider.azurerm` block of a stack file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureProvider {
    #[serde(default)]
    pub features: Features,
    pub subscription_id: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
}

fn default_endpoint() -> String { PUBLIC_CLOUD_ENDPOINT.to_string() }
fn default_poll_interval() -> u64 { 10 }
fn default_operation_timeout() -> u64 { 60 * 60 }

impl AzureProvider {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            features: Features::default(),
            subscription_id: subscription_id.into(),
            endpoint: default_endpoint(),
            poll_interval_secs: default_poll_interval(),
            operation_timeout_secs: default_operation_timeout(),
        }
    }

    /// Builds the single client shared by every resource of a run.
    pub fn client(&self, token: SecretString, shutdown: watch::Receiver<bool>) -> Result<ArmClient> {
        ArmClient::new(
            ClientSettings {
                endpoint: self.endpoint.clone(),
                subscription_id: self.subscription_id.clone(),
                token,
                poll_interval: Duration::from_secs(self.poll_interval_secs),
                operation_timeout: Duration::from_secs(self.operation_timeout_secs),
            },
            shutdown,
        )
    }
}
