//! Error taxonomy for route offsetting.
//!
//! Input is validated before any geometry work and fails fast. Offset
//! candidates that cannot be made valid are *not* errors: the offset stage
//! emits a degraded point instead (see [`crate::offset`]).

use thiserror::Error;

/// Any failure that aborts a route computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorridorError {
    #[error(transparent)]
    Input(#[from] InputValidationError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Projection(#[from] ProjectionDomainError),
}

/// Mission or configuration input rejected before geometry work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("missing required mission field `{0}`")]
    MissingField(&'static str),
    #[error("malformed mission: {0}")]
    Malformed(String),
    #[error("invalid offset: {0}")]
    InvalidOffset(String),
    #[error("route has no points")]
    EmptyRoute,
    #[error("route needs at least 2 points, got {0}")]
    RouteTooShort(usize),
    #[error("mission has no no-fly polygons")]
    EmptyPolygonSet,
    #[error("invalid coordinate in {field}: lat={lat}, lng={lng}")]
    InvalidCoordinate {
        field: &'static str,
        lat: f64,
        lng: f64,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A polygon or detour that cannot be used as geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon {polygon} has {count} distinct vertices, need at least 3")]
    TooFewVertices { polygon: usize, count: usize },
    #[error("polygon {polygon} encloses no area")]
    Degenerate { polygon: usize },
    #[error("polygon {polygon} ring is self-intersecting (edges {first} and {second})")]
    SelfIntersecting {
        polygon: usize,
        first: usize,
        second: usize,
    },
    #[error("route segment {segment} has no usable intersection with polygon {polygon}")]
    UnusableIntersection { segment: usize, polygon: usize },
}

/// Coordinates outside the valid domain of the planar CRS.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionDomainError {
    #[error("geodetic point (lat={lat}, lng={lng}) is outside UTM zone {zone}")]
    Geodetic { lat: f64, lng: f64, zone: u8 },
    #[error("planar point (x={x}, y={y}) is outside UTM zone {zone}")]
    Planar { x: f64, y: f64, zone: u8 },
}

impl CorridorError {
    /// True for errors caused by the caller's mission or configuration,
    /// including coordinates the configured zone cannot project.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CorridorError::Input(_) | CorridorError::Projection(_)
        )
    }
}
