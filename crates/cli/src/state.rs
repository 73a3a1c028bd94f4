//! Handles of the resources this tool manages, persisted next to the output.

use anyhow::{bail, Context, Result};
use azmapper_core::ResourceHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_FILE: &str = "azmapper.state.json";
const STATE_BACKUP: &str = "azmapper.state.json.backup";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    /// Keyed by `type.name`.
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceHandle>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self { version: STATE_VERSION, resources: BTreeMap::new() }
    }
}

pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub async fn load(&self) -> Result<StateFile> {
        let path = self.path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no state file yet");
            return Ok(StateFile::default());
        }
        let content = fs::read_to_string(&path).await.with_context(|| format!("reading {}", path.display()))?;
        let state: StateFile =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        if state.version > STATE_VERSION {
            bail!("state file version {} is newer than supported version {}", state.version, STATE_VERSION);
        }
        Ok(state)
    }

    /// Writes the new state, keeping the previous file as a backup.
    pub async fn save(&self, state: &StateFile) -> Result<()> {
        fs::create_dir_all(&self.dir).await.with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path();
        if path.exists() {
            let backup = self.dir.join(STATE_BACKUP);
            if backup.exists() {
                fs::remove_file(&backup).await.context("removing old state backup")?;
            }
            fs::rename(&path, &backup).await.context("backing up state file")?;
        }
        fs::write(&path, serde_json::to_string_pretty(state)?)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(resources = state.resources.len(), "state saved");
        Ok(())
    }
}
