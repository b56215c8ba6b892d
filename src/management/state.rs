use std::{collections::BTreeSet, io, path::PathBuf};

use thiserror::Error;

use crate::types::Period;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("state file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Enabled job tags, persisted so admin toggles survive a restart.
#[derive(Debug, Clone)]
pub struct ScheduleStateManager {
    path: PathBuf,
    enabled: BTreeSet<Period>,
}

impl ScheduleStateManager {
    pub fn new(path: PathBuf, enabled: impl IntoIterator<Item = Period>) -> Self {
        Self {
            path,
            enabled: enabled.into_iter().collect(),
        }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("lastsync/state/schedule.json");
        path
    }

    /// Loads the state at `path`, `Ok(None)` if nothing was persisted yet.
    pub async fn load_from(path: PathBuf) -> Result<Option<Self>, StateError> {
        let json = match async_fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::Io(e)),
        };
        let enabled: BTreeSet<Period> = serde_json::from_str(&json)?;
        Ok(Some(Self { path, enabled }))
    }

    /// Loads the state at `path` or starts from `defaults` when none exists.
    pub async fn load_or(
        path: PathBuf,
        defaults: impl IntoIterator<Item = Period>,
    ) -> Result<Self, StateError> {
        match Self::load_from(path.clone()).await? {
            Some(state) => Ok(state),
            None => Ok(Self::new(path, defaults)),
        }
    }

    pub async fn persist(&self) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.enabled)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn enable(&mut self, period: Period) {
        self.enabled.insert(period);
    }

    pub fn disable(&mut self, period: Period) {
        self.enabled.remove(&period);
    }

    pub fn enabled(&self) -> Vec<Period> {
        self.enabled.iter().copied().collect()
    }
}
