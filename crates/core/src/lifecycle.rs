use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use tracing::{info, warn};

use crate::arm::ResourceHandle;
use crate::error::{MapperError, Result};
use crate::schema::Schema;

/// Outcome of a delete call. A remote object that is already gone is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    AlreadyGone,
}

/// One managed resource type bound to its API client.
#[async_trait]
pub trait Resource: Send + Sync {
    type Config: DeserializeOwned + Send + Sync;
    type State: Send;

    fn schema(&self) -> &'static Schema;

    /// Looks up a remote object with the same name, for import protection.
    async fn find_existing(&self, config: &Self::Config) -> Result<Option<ResourceHandle>>;

    /// Expands and submits the configuration, waits for the remote operation
    /// to settle and returns the assigned handle.
    async fn create(&self, config: &Self::Config) -> Result<ResourceHandle>;

    /// `Ok(None)` when the remote object no longer exists.
    async fn read(
        &self,
        handle: &ResourceHandle,
        prior: Option<&Self::Config>,
    ) -> Result<Option<Self::State>>;

    /// `prior` is the last configuration applied through the instance, when
    /// known. A remote object that has vanished is reported as `NotFound`.
    async fn update(
        &self,
        handle: &ResourceHandle,
        prior: Option<&Self::Config>,
        config: &Self::Config,
    ) -> Result<()>;

    async fn delete(&self, handle: &ResourceHandle) -> Result<Deletion>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    Absent,
    Present(ResourceHandle),
}

impl InstanceState {
    fn label(&self) -> &'static str {
        match self {
            InstanceState::Absent => "absent",
            InstanceState::Present(_) => "present",
        }
    }
}

/// Drives one resource instance through create/read/update/delete.
pub struct Instance<R: Resource> {
    resource: R,
    state: InstanceState,
    config: Option<R::Config>,
    require_import: bool,
}

impl<R: Resource> Instance<R> {
    pub fn new(resource: R) -> Self {
        Self { resource, state: InstanceState::Absent, config: None, require_import: false }
    }

    /// Resumes an instance whose handle was persisted earlier.
    pub fn existing(resource: R, handle: ResourceHandle) -> Self {
        Self { state: InstanceState::Present(handle), ..Self::new(resource) }
    }

    /// Refuse to create over a same-named remote object.
    pub fn require_import(mut self, on: bool) -> Self {
        self.require_import = on;
        self
    }

    /// Last configuration applied through this instance.
    pub fn with_config(mut self, config: R::Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn state(&self) -> &InstanceState { &self.state }

    pub fn handle(&self) -> Option<&ResourceHandle> {
        match &self.state {
            InstanceState::Present(h) => Some(h),
            InstanceState::Absent => None,
        }
    }

    pub fn decode(&self, doc: &Json) -> Result<R::Config> {
        self.resource.schema().decode(doc)
    }

    pub async fn create(&mut self, doc: &Json) -> Result<ResourceHandle> {
        let config = self.decode(doc)?;
        self.create_config(config).await
    }

    pub async fn create_config(&mut self, config: R::Config) -> Result<ResourceHandle> {
        if self.state != InstanceState::Absent {
            return Err(self.transition_error("create"));
        }
        let type_name = self.resource.schema().type_name;
        if self.require_import {
            if let Some(existing) = self.resource.find_existing(&config).await? {
                return Err(MapperError::AlreadyExists { resource_type: type_name, id: existing.0 });
            }
        }
        let handle = self.resource.create(&config).await?;
        info!(resource = type_name, id = %handle, "created");
        self.state = InstanceState::Present(handle.clone());
        self.config = Some(config);
        Ok(handle)
    }

    /// Refreshes the instance. A remote deletion is reconciled locally: the
    /// handle is cleared and `Ok(None)` returned.
    pub async fn read(&mut self) -> Result<Option<R::State>> {
        let handle = match &self.state {
            InstanceState::Present(h) => h.clone(),
            InstanceState::Absent => return Err(self.transition_error("read")),
        };
        match self.resource.read(&handle, self.config.as_ref()).await? {
            Some(state) => Ok(Some(state)),
            None => {
                warn!(resource = self.resource.schema().type_name, id = %handle, "not found - removing from state");
                self.state = InstanceState::Absent;
                self.config = None;
                Ok(None)
            }
        }
    }

    pub async fn update(&mut self, doc: &Json) -> Result<()> {
        let config = self.decode(doc)?;
        self.update_config(config).await
    }

    pub async fn update_config(&mut self, config: R::Config) -> Result<()> {
        let handle = match &self.state {
            InstanceState::Present(h) => h.clone(),
            InstanceState::Absent => return Err(self.transition_error("update")),
        };
        let type_name = self.resource.schema().type_name;
        match self.resource.update(&handle, self.config.as_ref(), &config).await {
            Ok(()) => {}
            Err(e @ MapperError::NotFound { .. }) => {
                warn!(resource = type_name, id = %handle, "not found - removing from state");
                self.state = InstanceState::Absent;
                self.config = None;
                return Err(e);
            }
            Err(e) => return Err(e),
        }
        info!(resource = type_name, id = %handle, "updated");
        self.config = Some(config);
        Ok(())
    }

    pub async fn delete(&mut self) -> Result<()> {
        let handle = match &self.state {
            InstanceState::Present(h) => h.clone(),
            InstanceState::Absent => return Err(self.transition_error("delete")),
        };
        let type_name = self.resource.schema().type_name;
        match self.resource.delete(&handle).await? {
            Deletion::Deleted => info!(resource = type_name, id = %handle, "deleted"),
            Deletion::AlreadyGone => info!(resource = type_name, id = %handle, "already gone"),
        }
        self.state = InstanceState::Absent;
        self.config = None;
        Ok(())
    }

    fn transition_error(&self, operation: &'static str) -> MapperError {
        MapperError::InvalidTransition { operation, state: self.state.label() }
    }
}
