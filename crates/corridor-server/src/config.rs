//! Server configuration from environment.

use corridor_core::CorridorConfig;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Directory the published artifacts are written to.
    pub output_dir: PathBuf,
    /// Clearance used when `/compute-route` is called without an offset.
    pub default_offset: f64,
    pub utm_zone: u8,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("CORRIDOR_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5006),
            output_dir: env::var("CORRIDOR_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            default_offset: env::var("CORRIDOR_DEFAULT_OFFSET")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3.0),
            utm_zone: env::var("CORRIDOR_UTM_ZONE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(37),
        }
    }

    /// Planner configuration for one run with the given clearance.
    pub fn corridor_config(&self, offset: f64) -> CorridorConfig {
        CorridorConfig {
            utm_zone: self.utm_zone,
            ..CorridorConfig::with_offset(offset)
        }
    }
}
