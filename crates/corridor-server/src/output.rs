//! Published artifact files.
//!
//! Every artifact is written to a sibling `.tmp` file and renamed over the
//! previous version, so readers never see a half-written file.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Final route as `[{lat, lng, altitude, flightAltitude, groundAltitude}]`.
pub const ROUTE_ARTIFACT: &str = "offset_route.json";
/// Full result including drone position, original route and polygons.
pub const OVERLAY_ARTIFACT: &str = "mission_overlay.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize an artifact body to JSON.
pub fn encode<T: Serialize>(name: &str, value: &T) -> Result<serde_json::Value, OutputError> {
    serde_json::to_value(value).map_err(|source| OutputError::Serialize {
        name: name.to_string(),
        source,
    })
}

/// Write `body` to `dir/name`, replacing any previous file atomically.
pub fn write_json(dir: &Path, name: &str, body: &serde_json::Value) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(dir).map_err(io_err(dir))?;
    let contents = serde_json::to_vec_pretty(body).map_err(|source| OutputError::Serialize {
        name: name.to_string(),
        source,
    })?;

    let final_path = dir.join(name);
    let tmp_path = dir.join(format!("{}.tmp", name));
    fs::write(&tmp_path, &contents).map_err(io_err(&tmp_path))?;
    fs::rename(&tmp_path, &final_path).map_err(io_err(&final_path))?;
    Ok(final_path)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError {
    let path = path.to_path_buf();
    move |source| OutputError::Io { path, source }
}
