//! Cluster (source) registry
//!
//! Every configured cluster gets a handle at startup, whether or not its
//! connection attempt succeeded. A cluster that failed to connect stays in
//! the registry as [`ClusterState::Unavailable`] so requests against it get a
//! typed error instead of a missing connection.

pub mod connector;

use crate::config::ClusterConfig;
use crate::store::PriceStore;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use connector::{ClusterConnector, DuckDbConnector};

/// Connection state of a cluster
#[derive(Clone)]
pub enum ClusterState {
    Connected(Arc<dyn PriceStore>),
    Unavailable { reason: String },
}

/// Status label used by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    Connected,
    Unavailable,
}

/// One named cluster and its connection
#[derive(Clone)]
pub struct ClusterHandle {
    id: String,
    state: ClusterState,
}

impl ClusterHandle {
    pub fn connected(id: impl Into<String>, store: Arc<dyn PriceStore>) -> Self {
        Self {
            id: id.into(),
            state: ClusterState::Connected(store),
        }
    }

    pub fn unavailable(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: ClusterState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &ClusterState {
        &self.state
    }

    /// The live store, if connected
    pub fn store(&self) -> Option<&Arc<dyn PriceStore>> {
        match &self.state {
            ClusterState::Connected(store) => Some(store),
            ClusterState::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.store().is_some()
    }

    pub fn status(&self) -> ClusterStatus {
        if self.is_available() {
            ClusterStatus::Connected
        } else {
            ClusterStatus::Unavailable
        }
    }
}

impl std::fmt::Debug for ClusterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ClusterHandle");
        s.field("id", &self.id);
        match &self.state {
            ClusterState::Connected(store) => s.field("store", &store.name()),
            ClusterState::Unavailable { reason } => s.field("unavailable", reason),
        };
        s.finish()
    }
}

/// Registry of cluster handles, read-only once built
#[derive(Debug, Default)]
pub struct ClusterRegistry {
    clusters: BTreeMap<String, ClusterHandle>,
}

impl ClusterRegistry {
    pub fn new(handles: impl IntoIterator<Item = ClusterHandle>) -> Self {
        Self {
            clusters: handles
                .into_iter()
                .map(|handle| (handle.id.clone(), handle))
                .collect(),
        }
    }

    /// Connect every configured cluster concurrently.
    ///
    /// Each attempt is bounded by `connect_timeout`. Failures are logged and
    /// leave that cluster unavailable; they never fail the whole registry.
    pub async fn connect_all(
        configs: &[ClusterConfig],
        connector: &dyn ClusterConnector,
        connect_timeout: Duration,
    ) -> Self {
        let attempts = configs.iter().map(|config| async move {
            if config.uri.is_none() {
                warn!("Cluster {} is not provisioned; marking unavailable", config.id);
                return ClusterHandle::unavailable(&config.id, "not provisioned");
            }

            match tokio::time::timeout(connect_timeout, connector.connect(config)).await {
                Ok(Ok(store)) => {
                    info!("Connected to cluster {} ({})", config.id, store.name());
                    ClusterHandle::connected(&config.id, store)
                }
                Ok(Err(e)) => {
                    warn!("Warning: could not connect to cluster {}: {}", config.id, e);
                    ClusterHandle::unavailable(&config.id, e.to_string())
                }
                Err(_) => {
                    warn!(
                        "Warning: connecting to cluster {} timed out after {:?}",
                        config.id, connect_timeout
                    );
                    ClusterHandle::unavailable(&config.id, "connect timed out")
                }
            }
        });

        let registry = Self::new(join_all(attempts).await);

        info!(
            "Cluster registry ready: {}/{} available",
            registry.clusters.values().filter(|h| h.is_available()).count(),
            registry.clusters.len()
        );

        registry
    }

    /// Get a cluster handle by id
    pub fn get(&self, id: &str) -> Option<&ClusterHandle> {
        self.clusters.get(id)
    }

    pub fn is_available(&self, id: &str) -> bool {
        self.get(id).is_some_and(ClusterHandle::is_available)
    }

    /// Configured cluster ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        self.clusters.keys().map(String::as_str).collect()
    }

    pub fn statuses(&self) -> BTreeMap<String, ClusterStatus> {
        self.clusters
            .iter()
            .map(|(id, handle)| (id.clone(), handle.status()))
            .collect()
    }
}
