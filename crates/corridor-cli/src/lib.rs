//! Corridor CLI - command line tools for the offset corridor planner.
//!
//! Binaries:
//! - offset_route: compute a corridor from a mission file or a running relay
//! - send_mission: upload a mission to a relay and optionally trigger a run

use anyhow::{Context, Result};
use corridor_core::{CorridorConfig, EndpointPolicy, MissionDescriptor};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber, honoring `RUST_LOG` on top of `directive`.
pub fn init_tracing(directive: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();
    Ok(())
}

/// Read a mission descriptor JSON file.
pub fn load_mission(path: &Path) -> Result<MissionDescriptor> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mission {:?}", path))?;
    let mission = MissionDescriptor::from_json_str(&raw)
        .with_context(|| format!("Failed to parse mission {:?}", path))?;
    Ok(mission)
}

/// Write `value` as pretty JSON (atomic: write to .tmp then rename).
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_vec_pretty(value).context("Failed to serialize JSON")?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &contents)
        .with_context(|| format!("Failed to write {:?}", tmp_path))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", tmp_path, path))?;
    Ok(())
}

/// Planner configuration from command line overrides.
pub fn corridor_config(offset: f64, utm_zone: u8, step_only: bool) -> CorridorConfig {
    CorridorConfig {
        utm_zone,
        endpoint_policy: if step_only {
            EndpointPolicy::StepOnly
        } else {
            EndpointPolicy::ForceInclude
        },
        ..CorridorConfig::with_offset(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("corridor-cli-{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn loads_mission_file() {
        let path = temp_path("mission.json");
        std::fs::write(
            &path,
            r#"{"droneData": {"lat": 55.75, "lng": 37.6},
                "routePoints": [{"lat": 55.75, "lng": 37.6}, {"lat": 55.76, "lng": 37.6, "altitude": 30}],
                "savedPolygons": {"type": "FeatureCollection", "features": []}}"#,
        )
        .unwrap();

        let mission = load_mission(&path).unwrap();
        assert_eq!(mission.route_points.len(), 2);
        assert_eq!(mission.route_points[1].altitude, Some(30.0));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let missing = temp_path("missing.json");
        let err = load_mission(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read mission"));

        let malformed = temp_path("bad.json");
        std::fs::write(&malformed, r#"{"routePoints": 7}"#).unwrap();
        let err = load_mission(&malformed).unwrap_err();
        assert!(err.to_string().contains("Failed to parse mission"));
        std::fs::remove_file(&malformed).unwrap();
    }

    #[test]
    fn write_json_replaces_file() {
        let path = temp_path("route.json");
        write_json(&path, &vec![1, 2, 3]).unwrap();
        write_json(&path, &vec![4]).unwrap();
        let written: Vec<i32> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, vec![4]);
        assert!(!path.with_extension("json.tmp").exists());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn config_overrides() {
        let config = corridor_config(5.0, 36, true);
        assert_eq!(config.offset, 5.0);
        assert_eq!(config.utm_zone, 36);
        assert_eq!(config.endpoint_policy, EndpointPolicy::StepOnly);
        assert_eq!(config.step, CorridorConfig::default().step);

        let config = corridor_config(3.0, 37, false);
        assert_eq!(config.endpoint_policy, EndpointPolicy::ForceInclude);
    }
}
