//! In-memory mission store and published artifact cache.

use chrono::{DateTime, Utc};
use corridor_core::{MissionDescriptor, OffsetRouteResult};
use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::output::{self, OutputError, OVERLAY_ARTIFACT, ROUTE_ARTIFACT};

/// The last mission received by the relay.
#[derive(Debug, Clone, Default)]
pub struct StoredMission {
    pub mission: MissionDescriptor,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An artifact body as last written to disk.
#[derive(Debug, Clone)]
pub struct PublishedArtifact {
    pub run_id: String,
    pub body: serde_json::Value,
    pub published_at: DateTime<Utc>,
}

/// Application state shared by all handlers.
///
/// The mission has a single writer at a time; artifact publication is
/// serialized by `publish_lock` so the two files of one run are never
/// interleaved with another run's.
pub struct AppState {
    config: Config,
    mission: RwLock<StoredMission>,
    artifacts: DashMap<String, PublishedArtifact>,
    publish_lock: std::sync::Mutex<()>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            mission: RwLock::new(StoredMission::default()),
            artifacts: DashMap::new(),
            publish_lock: std::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the stored mission.
    pub async fn replace_mission(&self, mission: MissionDescriptor) -> StoredMission {
        let mut stored = self.mission.write().await;
        *stored = StoredMission {
            mission,
            updated_at: Some(Utc::now()),
        };
        stored.clone()
    }

    /// Snapshot of the stored mission.
    pub async fn current_mission(&self) -> StoredMission {
        self.mission.read().await.clone()
    }

    /// Write the route and overlay artifacts of a run and cache their bodies.
    ///
    /// Blocking; call from a blocking worker.
    pub fn publish(&self, run_id: &str, result: &OffsetRouteResult) -> Result<(), OutputError> {
        let route = output::encode(ROUTE_ARTIFACT, &result.route)?;
        let overlay = output::encode(OVERLAY_ARTIFACT, result)?;

        let _guard = self
            .publish_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let published_at = Utc::now();
        for (name, body) in [(ROUTE_ARTIFACT, route), (OVERLAY_ARTIFACT, overlay)] {
            let path = output::write_json(&self.config.output_dir, name, &body)?;
            tracing::info!("Published {} for run {}", path.display(), run_id);
            self.artifacts.insert(
                name.to_string(),
                PublishedArtifact {
                    run_id: run_id.to_string(),
                    body,
                    published_at,
                },
            );
        }
        Ok(())
    }

    /// Last published body of an artifact.
    pub fn artifact(&self, name: &str) -> Option<PublishedArtifact> {
        self.artifacts.get(name).map(|r| r.value().clone())
    }
}
