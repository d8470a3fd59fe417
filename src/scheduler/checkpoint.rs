//! Durable progress checkpoint
//!
//! A small JSON side file, `{"checked": n, "total": m}`, overwritten every
//! K completions so a crashed run still tells how far it got. Writes go to a
//! temporary sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{LinkrotError, LinkrotResult};

/// Last persisted progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub checked: usize,
    pub total: usize,
}

impl Checkpoint {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.checked >= self.total
    }

    /// Read a checkpoint file, `None` if it does not exist
    pub async fn read(path: &Path) -> LinkrotResult<Option<Self>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LinkrotError::io(path, e)),
        }
    }
}

/// Periodically overwrites the checkpoint file
#[derive(Debug)]
pub struct CheckpointWriter {
    path: PathBuf,
    interval: usize,
    // highest `checked` persisted; also serializes writers sharing the temp file
    highest_written: Mutex<usize>,
}

impl CheckpointWriter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, interval: usize) -> Self {
        Self {
            path: path.into(),
            interval: interval.max(1),
            highest_written: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write if `checked` hits the interval or the end of the run
    ///
    /// Failures are logged; a checkpoint is never worth aborting a run for.
    pub async fn record(&self, checked: usize, total: usize) {
        if checked % self.interval != 0 && checked != total {
            return;
        }
        if let Err(e) = self.write(Checkpoint { checked, total }).await {
            warn!("Failed to write checkpoint: {e}");
        }
    }

    /// Atomically replace the checkpoint file
    ///
    /// A checkpoint older than the one already on disk is dropped: workers
    /// can reach `record` out of completion order.
    pub async fn write(&self, checkpoint: Checkpoint) -> LinkrotResult<()> {
        let mut highest = self.highest_written.lock().await;
        if checkpoint.checked < *highest {
            return Ok(());
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LinkrotError::io(parent, e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec(&checkpoint)?;
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| LinkrotError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| LinkrotError::io(&self.path, e))?;
        *highest = checkpoint.checked;
        Ok(())
    }
}
