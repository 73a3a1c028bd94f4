use anyhow::{Context, Result};
use azmapper_azure::AzureProvider;
use serde::Deserialize;
use serde_json::{json, Map as JsonMap, Value as Json};
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Stack {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub provider: Providers,
    #[serde(default)]
    pub resources: Vec<Declaration>,
    /// Read-only lookups.
    #[serde(default)]
    pub data: Vec<Declaration>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Providers {
    #[serde(default)]
    pub azurerm: Option<AzureProvider>,
}

/// One `type` + `name` entry; every other key is an attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct Declaration {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    #[serde(flatten)]
    pub properties: JsonMap<String, Json>,
}

impl Declaration {
    pub fn key(&self) -> String {
        format!("{}.{}", self.type_name, self.name)
    }

    /// The attribute document. `name` defaults to the declaration name.
    pub fn document(&self) -> Json {
        let mut props = self.properties.clone();
        if !props.contains_key("name") {
            props.insert("name".to_string(), json!(self.name.clone()));
        }
        Json::Object(props)
    }
}

impl Stack {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(raw: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(raw)?)
    }

    pub fn azurerm(&self) -> Result<&AzureProvider> {
        self.provider.azurerm.as_ref().context("the stack has no provider.azurerm block")
    }
}
