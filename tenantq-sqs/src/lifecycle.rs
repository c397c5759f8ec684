//! Idempotent queue provisioning
//!
//! `create_or_reuse` and `delete_if_exists` may be repeated any number of
//! times for the same name. Both start with an existence probe whose
//! handling of lookup failures is set by [`ExistenceProbe`].

use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::service::{QueueError, QueueLookup, QueueService};

/// How a failed existence lookup is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExistenceProbe {
    /// Lookup failures propagate; only "does not exist" counts as absent
    #[default]
    Strict,
    /// Lookup failures are logged and the queue is treated as absent
    FailOpen,
}

impl FromStr for ExistenceProbe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "fail-open" | "fail_open" | "failopen" => Ok(Self::FailOpen),
            other => Err(format!("unknown existence probe '{}'", other)),
        }
    }
}

/// Create-or-reuse and delete-if-exists over a [`QueueService`]
#[derive(Clone)]
pub struct QueueLifecycle {
    service: Arc<dyn QueueService>,
    probe: ExistenceProbe,
}

impl QueueLifecycle {
    pub fn new(service: Arc<dyn QueueService>) -> Self {
        Self {
            service,
            probe: ExistenceProbe::default(),
        }
    }

    pub fn with_probe(mut self, probe: ExistenceProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn probe(&self) -> ExistenceProbe {
        self.probe
    }

    async fn probe_lookup(&self, name: &str) -> Result<QueueLookup, QueueError> {
        info!(queue = %name, "Checking if queue exists");

        match self.service.lookup(name).await {
            Err(err) if self.probe == ExistenceProbe::FailOpen => {
                warn!(queue = %name, error = %err, "Queue lookup failed, treating queue as absent");
                Ok(QueueLookup::Absent)
            }
            result => result,
        }
    }

    /// Whether a queue with this name exists
    pub async fn exists(&self, name: &str) -> Result<bool, QueueError> {
        Ok(matches!(self.probe_lookup(name).await?, QueueLookup::Found(_)))
    }

    /// Create the queue unless it exists; returns its URL either way
    pub async fn create_or_reuse(&self, name: &str) -> Result<String, QueueError> {
        match self.probe_lookup(name).await? {
            QueueLookup::Found(url) => {
                info!(queue = %name, url = %url, "Reusing existing queue");
                Ok(url)
            }
            QueueLookup::Absent => {
                info!(queue = %name, "Creating new queue");
                self.service.create(name).await
            }
        }
    }

    /// Delete the queue if it exists; returns whether a delete was issued
    pub async fn delete_if_exists(&self, name: &str) -> Result<bool, QueueError> {
        match self.probe_lookup(name).await? {
            QueueLookup::Found(url) => {
                info!(queue = %name, url = %url, "Deleting queue");
                self.service.delete(&url).await?;
                Ok(true)
            }
            QueueLookup::Absent => {
                info!(queue = %name, "Queue not found, nothing to delete");
                Ok(false)
            }
        }
    }
}

impl std::fmt::Debug for QueueLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueLifecycle")
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}
