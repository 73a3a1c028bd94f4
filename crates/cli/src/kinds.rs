//! The resource types this binary knows, keyed by their `type` string.

use anyhow::{bail, Context, Result};
use azmapper_azure::{ArmClient, ClustersApi, ClustersClient, ScheduledQueryRulesApi, ScheduledQueryRulesClient};
use azmapper_core::{Instance, Resource, ResourceHandle, Schema};
use azmapper_hdinsight::{expand_cluster, StormClusterConfig, StormClusterResource};
use azmapper_monitor::{expand_rule, ScheduledQueryRuleConfig, ScheduledQueryRulesDataSource, ScheduledQueryRulesResource};
use serde::Serialize;
use serde_json::Value as Json;
use std::sync::Arc;

use crate::stack::Declaration;

/// API clients shared by every instance of a run.
#[derive(Clone)]
pub struct Clients {
    pub rules: Arc<dyn ScheduledQueryRulesApi>,
    pub clusters: Arc<dyn ClustersApi>,
}

impl Clients {
    pub fn new(arm: ArmClient) -> Self {
        Self {
            rules: Arc::new(ScheduledQueryRulesClient::new(arm.clone())),
            clusters: Arc::new(ClustersClient::new(arm)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    ScheduledQueryRules,
    StormCluster,
}

pub const ALL: &[Kind] = &[Kind::ScheduledQueryRules, Kind::StormCluster];

fn ensure_type_name(type_name: &str) -> Result<()> {
    if !type_name.starts_with("azurerm_") {
        bail!("resource type '{}' must start with 'azurerm_'", type_name);
    }
    if !type_name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        bail!("resource type '{}' contains invalid characters; use lowercase, digits, and underscores only", type_name);
    }
    Ok(())
}

impl Kind {
    pub fn from_type(type_name: &str) -> Result<Self> {
        ensure_type_name(type_name)?;
        ALL.iter()
            .copied()
            .find(|k| k.type_name() == type_name)
            .with_context(|| format!("unsupported resource type '{}'", type_name))
    }

    pub fn type_name(self) -> &'static str {
        self.schema().type_name
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            Kind::ScheduledQueryRules => &azmapper_monitor::RESOURCE_SCHEMA,
            Kind::StormCluster => &azmapper_hdinsight::RESOURCE_SCHEMA,
        }
    }

    /// The request body a create would send; no network involved.
    pub fn expand(self, doc: &Json) -> Result<Json> {
        Ok(match self {
            Kind::ScheduledQueryRules => {
                let config: ScheduledQueryRuleConfig = self.schema().decode(doc)?;
                serde_json::to_value(expand_rule(&config)?)?
            }
            Kind::StormCluster => {
                let config: StormClusterConfig = self.schema().decode(doc)?;
                serde_json::to_value(expand_cluster(&config)?)?
            }
        })
    }

    /// Creates or updates, then reads back. Returns the handle and the state.
    pub async fn apply(
        self,
        clients: &Clients,
        doc: &Json,
        handle: Option<ResourceHandle>,
        require_import: bool,
    ) -> Result<(ResourceHandle, Json)> {
        match self {
            Kind::ScheduledQueryRules => {
                apply(ScheduledQueryRulesResource::new(clients.rules.clone()), doc, handle, require_import).await
            }
            Kind::StormCluster => {
                apply(StormClusterResource::new(clients.clusters.clone()), doc, handle, require_import).await
            }
        }
    }

    /// `Ok(None)` when the remote object has gone away.
    pub async fn refresh(self, clients: &Clients, doc: &Json, handle: ResourceHandle) -> Result<Option<Json>> {
        match self {
            Kind::ScheduledQueryRules => {
                refresh(ScheduledQueryRulesResource::new(clients.rules.clone()), doc, handle).await
            }
            Kind::StormCluster => refresh(StormClusterResource::new(clients.clusters.clone()), doc, handle).await,
        }
    }

    pub async fn destroy(self, clients: &Clients, handle: ResourceHandle) -> Result<()> {
        match self {
            Kind::ScheduledQueryRules => {
                Instance::existing(ScheduledQueryRulesResource::new(clients.rules.clone()), handle).delete().await?
            }
            Kind::StormCluster => {
                Instance::existing(StormClusterResource::new(clients.clusters.clone()), handle).delete().await?
            }
        }
        Ok(())
    }
}

async fn apply<R>(resource: R, doc: &Json, handle: Option<ResourceHandle>, require_import: bool) -> Result<(ResourceHandle, Json)>
where
    R: Resource,
    R::State: Serialize,
{
    let mut instance = match handle {
        Some(h) => {
            let mut instance = Instance::existing(resource, h);
            instance.update(doc).await?;
            instance
        }
        None => {
            let mut instance = Instance::new(resource).require_import(require_import);
            instance.create(doc).await?;
            instance
        }
    };
    let state = instance.read().await?.context("resource disappeared right after apply")?;
    let handle = instance.handle().cloned().context("resource has no handle after apply")?;
    Ok((handle, serde_json::to_value(state)?))
}

async fn refresh<R>(resource: R, doc: &Json, handle: ResourceHandle) -> Result<Option<Json>>
where
    R: Resource,
    R::State: Serialize,
{
    let instance = Instance::existing(resource, handle);
    let config = instance.decode(doc)?;
    let mut instance = instance.with_config(config);
    match instance.read().await? {
        Some(state) => Ok(Some(serde_json::to_value(state)?)),
        None => Ok(None),
    }
}

/// Data sources are read-only; only scheduled query rules have one.
pub async fn read_data(clients: &Clients, decl: &Declaration) -> Result<Json> {
    match Kind::from_type(&decl.type_name)? {
        Kind::ScheduledQueryRules => {
            let source = ScheduledQueryRulesDataSource::new(clients.rules.clone());
            Ok(serde_json::to_value(source.read(&decl.document()).await?)?)
        }
        other => bail!("'{}' has no data source", other.type_name()),
    }
}

pub fn data_schema(kind: Kind) -> Option<&'static Schema> {
    match kind {
        Kind::ScheduledQueryRules => Some(&azmapper_monitor::DATA_SOURCE_SCHEMA),
        Kind::StormCluster => None,
    }
}

/// Plain-text table of every attribute path in a schema.
pub fn render_schema(schema: &Schema) -> String {
    let rows = schema.rows();
    let width = rows.iter().map(|r| r.path.len()).max().unwrap_or(0).max(4);
    let mut out = format!("{}\n", schema.type_name);
    for row in rows {
        let mut flags = Vec::new();
        if row.force_new {
            flags.push("force-new".to_string());
        }
        if row.sensitive {
            flags.push("sensitive".to_string());
        }
        if let Some(d) = row.default {
            flags.push(format!("default={:?}", d));
        }
        out.push_str(&format!(
            "  {:<width$}  {:<12} {:<9} {}\n",
            row.path,
            row.ty,
            format!("{:?}", row.mutability).to_lowercase(),
            flags.join(" "),
            width = width
        ));
    }
    out
}
