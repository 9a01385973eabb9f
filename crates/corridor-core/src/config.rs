//! Tunables for a route offset run.

use crate::error::InputValidationError;
use serde::{Deserialize, Serialize};

/// How the discretizer treats the tail of the centerline shorter than one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndpointPolicy {
    /// Append the exact final vertex when the last step falls short of it.
    #[default]
    ForceInclude,
    /// Stop at the last whole step.
    StepOnly,
}

/// How the smoothing window behaves near the ends of the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SmoothingEdge {
    /// Shrink to the neighbors available on both sides; endpoints stay put.
    #[default]
    Symmetric,
    /// Cut the window at the sequence bounds, so endpoints average with
    /// their one-sided neighbors and may move.
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

/// Configuration for [`crate::compute_offset_route`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CorridorConfig {
    /// Clearance from the polygon boundary in meters.
    pub offset: f64,
    /// Arc-length sampling interval along the centerline in meters.
    pub step: f64,
    /// Below this distance a sample turns safe.
    pub tolerance_down: f64,
    /// Above this distance a sample turns boundary.
    pub tolerance_up: f64,
    /// Minimum spacing kept by de-duplication.
    pub min_spacing: f64,
    /// Points closer than this to a later point are loop candidates.
    pub loop_distance_threshold: f64,
    /// Degrees.
    pub loop_angle_threshold: f64,
    /// Moving-average window in points; below 2 disables smoothing.
    pub smoothing_window: usize,
    /// Window handling at the route ends.
    pub smoothing_edge: SmoothingEdge,
    /// Whether the exact final vertex is appended after the last whole step.
    pub endpoint_policy: EndpointPolicy,
    /// UTM zone all geometry is projected into (1..=60).
    pub utm_zone: u8,
    /// Hemisphere of the UTM zone; south applies the 10 000 km false northing.
    pub hemisphere: Hemisphere,
    /// Per-axis nudge applied when buffer projection is still invalid.
    pub nudge: f64,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            offset: 3.0,
            step: 1.0,
            tolerance_down: 0.9,
            tolerance_up: 1.1,
            min_spacing: 0.95,
            loop_distance_threshold: 2.0,
            loop_angle_threshold: 150.0,
            smoothing_window: 5,
            smoothing_edge: SmoothingEdge::Symmetric,
            endpoint_policy: EndpointPolicy::ForceInclude,
            utm_zone: 37,
            hemisphere: Hemisphere::North,
            nudge: 0.1,
        }
    }
}

impl CorridorConfig {
    /// Default configuration with a different clearance.
    pub fn with_offset(offset: f64) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InputValidationError> {
        if !self.offset.is_finite() || self.offset <= 0.0 {
            return Err(InputValidationError::InvalidOffset(format!(
                "offset must be a positive number of meters, got {}",
                self.offset
            )));
        }
        let positive = [
            ("step", self.step),
            ("minSpacing", self.min_spacing),
            ("loopDistanceThreshold", self.loop_distance_threshold),
            ("nudge", self.nudge),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(InputValidationError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.tolerance_down.is_finite()
            || !self.tolerance_up.is_finite()
            || self.tolerance_down < 0.0
            || self.tolerance_down > self.tolerance_up
        {
            return Err(InputValidationError::InvalidConfig(format!(
                "tolerances must satisfy 0 <= toleranceDown <= toleranceUp, got {} / {}",
                self.tolerance_down, self.tolerance_up
            )));
        }
        if !(0.0..=180.0).contains(&self.loop_angle_threshold) {
            return Err(InputValidationError::InvalidConfig(format!(
                "loopAngleThreshold must be within [0, 180], got {}",
                self.loop_angle_threshold
            )));
        }
        if !(1..=60).contains(&self.utm_zone) {
            return Err(InputValidationError::InvalidConfig(format!(
                "utmZone must be within [1, 60], got {}",
                self.utm_zone
            )));
        }
        Ok(())
    }
}
