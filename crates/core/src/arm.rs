use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MapperError, Result};

/// Opaque identity of a remote object: the ARM resource ID returned on create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(pub String);

impl ResourceHandle {
    pub fn parse(&self) -> Result<ArmId> { ArmId::parse(&self.0) }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A parsed ARM resource ID:
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}[/{type}/{name}...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: String,
    pub path: Vec<(String, String)>,
}

impl ArmId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        provider: impl Into<String>,
        path: &[(&str, &str)],
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            provider: provider.into(),
            path: path.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    pub fn parse(id: &str) -> Result<Self> {
        let invalid = |why: &str| MapperError::InvalidResourceId(format!("{:?}: {}", id, why));
        let trimmed = id.trim_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }
        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() % 2 != 0 {
            return Err(invalid("the number of path segments is not divisible by 2"));
        }

        let mut subscription_id = None;
        let mut resource_group = None;
        let mut provider = None;
        let mut path = Vec::new();
        for pair in parts.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(invalid("key/value cannot be empty strings"));
            }
            if key.eq_ignore_ascii_case("subscriptions") && subscription_id.is_none() {
                subscription_id = Some(value.to_string());
            } else if key.eq_ignore_ascii_case("resourceGroups") && resource_group.is_none() {
                resource_group = Some(value.to_string());
            } else if key.eq_ignore_ascii_case("providers") && provider.is_none() {
                provider = Some(value.to_string());
            } else {
                path.push((key.to_string(), value.to_string()));
            }
        }

        Ok(Self {
            subscription_id: subscription_id.ok_or_else(|| invalid("no subscription ID"))?,
            resource_group: resource_group.ok_or_else(|| invalid("no resource group name"))?,
            provider: provider.ok_or_else(|| invalid("no provider namespace"))?,
            path,
        })
    }

    /// Name for a type segment, matched case-insensitively.
    pub fn segment(&self, key: &str) -> Option<&str> {
        self.path
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.segment(key).ok_or_else(|| {
            MapperError::InvalidResourceId(format!("{} has no {:?} segment", self, key))
        })
    }
}

impl fmt::Display for ArmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}",
            self.subscription_id, self.resource_group, self.provider
        )?;
        for (k, v) in &self.path {
            write!(f, "/{}/{}", k, v)?;
        }
        Ok(())
    }
}
