pub mod assembler;
pub mod cleaner;
pub mod config;
pub mod discretize;
pub mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod models;
pub mod offset;
pub mod polygon;
pub mod projection;
pub mod smoother;
pub mod spatial;

pub use assembler::{compute_offset_route, find_nearest_altitude};
pub use cleaner::{clean_route, reduce_route, remove_loops};
pub use config::{CorridorConfig, EndpointPolicy, Hemisphere, SmoothingEdge};
pub use discretize::{discretize_route, DiscretizedPoint, Label};
pub use error::{CorridorError, GeometryError, InputValidationError, ProjectionDomainError};
pub use models::{
    CorridorStats, DroneData, FeatureCollection, FinalRoute, FinalRoutePoint, GeoPoint,
    MissionDescriptor, OffsetRouteResult, ProjectedPoint, RouteVertex,
};
pub use offset::{build_offsets, interpolate_offset, OffsetPoint, OffsetSource};
pub use polygon::{EdgeHit, NoFlyPolygon, PolygonRepository};
pub use projection::UtmProjector;
pub use smoother::smooth_route;
pub use spatial::haversine_distance;
