//! End-to-end route offsetting: mission in, geodetic corridor out.

use crate::cleaner::clean_route;
use crate::config::CorridorConfig;
use crate::discretize::{discretize_route, Label};
use crate::error::{CorridorError, InputValidationError};
use crate::models::{
    check_coordinate, validate_route, CorridorStats, DroneData, FeatureCollection, FinalRoute,
    FinalRoutePoint, MissionDescriptor, OffsetRouteResult, RouteVertex,
};
use crate::offset::build_offsets;
use crate::polygon::PolygonRepository;
use crate::projection::UtmProjector;
use crate::smoother::smooth_route;
use crate::spatial::haversine_distance;

/// Compute the offset corridor for a route around the given no-fly polygons.
///
/// Pipeline: validate, project, discretize and classify, offset, clean,
/// smooth, back-project. Altitude for every output point is copied from the
/// nearest original waypoint.
pub fn compute_offset_route(
    drone: &DroneData,
    route_points: &[RouteVertex],
    polygons: &FeatureCollection,
    config: &CorridorConfig,
) -> Result<OffsetRouteResult, CorridorError> {
    config.validate()?;
    check_coordinate("droneData", drone.lat, drone.lng)?;
    validate_route(route_points)?;
    if polygons.features.is_empty() {
        return Err(InputValidationError::EmptyPolygonSet.into());
    }

    let projector = UtmProjector::from_config(config);
    let repository = PolygonRepository::from_feature_collection(polygons, &projector)?;

    let discretized = discretize_route(route_points, &repository, &projector, config)?;
    let offsets = build_offsets(&discretized, &repository, config);

    let projected: Vec<_> = offsets.iter().map(|o| o.projected).collect();
    let cleaned = clean_route(&projected, config);
    let smoothed = smooth_route(&cleaned.points, config.smoothing_window, config.smoothing_edge);

    let mut points = Vec::with_capacity(smoothed.len());
    for p in &smoothed {
        let geo = projector.inverse_point(p)?;
        points.push(FinalRoutePoint {
            lat: geo.lat,
            lng: geo.lng,
            altitude: find_nearest_altitude(geo.lat, geo.lng, route_points),
            flight_altitude: None,
            ground_altitude: None,
        });
    }

    let stats = CorridorStats {
        discretized_points: discretized.len(),
        boundary_points: discretized
            .iter()
            .filter(|p| p.label == Label::Boundary)
            .count(),
        degraded_points: offsets.iter().filter(|o| o.degraded).count(),
        after_deduplication: cleaned.after_deduplication,
        after_loop_removal: cleaned.after_loop_removal,
        final_points: points.len(),
    };
    tracing::debug!(
        "Cleaning: {} offsets -> {} deduplicated -> {} after loop removal -> {} final",
        offsets.len(),
        stats.after_deduplication,
        stats.after_loop_removal,
        stats.final_points
    );
    tracing::info!(
        "Offset route computed: {} points around {} polygon(s) ({} boundary samples, {} degraded)",
        stats.final_points,
        repository.len(),
        stats.boundary_points,
        stats.degraded_points
    );

    Ok(OffsetRouteResult {
        route: FinalRoute::new(points),
        drone: drone.clone(),
        original_route: route_points.to_vec(),
        polygons: polygons.clone(),
        stats,
    })
}

/// Altitude of the original waypoint closest to `(lat, lng)` by great-circle
/// distance. The first waypoint wins ties.
pub fn find_nearest_altitude(lat: f64, lng: f64, route: &[RouteVertex]) -> Option<f64> {
    let mut best: Option<(f64, Option<f64>)> = None;
    for point in route {
        let d = haversine_distance(lat, lng, point.lat, point.lng);
        if best.map_or(true, |(best_d, _)| d < best_d) {
            best = Some((d, point.altitude));
        }
    }
    best.and_then(|(_, altitude)| altitude)
}

impl MissionDescriptor {
    /// Validate the mission and compute its offset route.
    pub fn compute(&self, config: &CorridorConfig) -> Result<OffsetRouteResult, CorridorError> {
        self.validate()?;
        let drone = self
            .drone_data
            .as_ref()
            .ok_or(InputValidationError::MissingField("droneData"))?;
        compute_offset_route(drone, &self.route_points, &self.saved_polygons, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(lat: f64, lng: f64, altitude: Option<f64>) -> RouteVertex {
        RouteVertex { lat, lng, altitude }
    }

    #[test]
    fn nearest_altitude_picks_closest_waypoint() {
        let route = vec![
            vertex(55.750, 37.600, Some(40.0)),
            vertex(55.751, 37.600, Some(60.0)),
            vertex(55.752, 37.600, None),
        ];
        assert_eq!(find_nearest_altitude(55.7502, 37.6, &route), Some(40.0));
        assert_eq!(find_nearest_altitude(55.7509, 37.6, &route), Some(60.0));
        assert_eq!(find_nearest_altitude(55.7525, 37.6, &route), None);
        assert_eq!(find_nearest_altitude(55.75, 37.6, &[]), None);
    }

    #[test]
    fn nearest_altitude_ties_go_to_first() {
        let route = vec![
            vertex(55.750, 37.600, Some(10.0)),
            vertex(55.750, 37.600, Some(20.0)),
        ];
        assert_eq!(find_nearest_altitude(55.75, 37.6, &route), Some(10.0));
    }

    #[test]
    fn rejects_invalid_input_before_geometry() {
        let drone = DroneData {
            lat: 55.75,
            lng: 37.6,
        };
        let route = vec![vertex(55.75, 37.6, None), vertex(55.76, 37.6, None)];
        let polygons = FeatureCollection::default();

        assert_eq!(
            compute_offset_route(&drone, &route, &polygons, &CorridorConfig::default()),
            Err(CorridorError::Input(InputValidationError::EmptyPolygonSet))
        );
        assert_eq!(
            compute_offset_route(&drone, &route[..1], &polygons, &CorridorConfig::default()),
            Err(CorridorError::Input(InputValidationError::RouteTooShort(1)))
        );
        assert!(matches!(
            compute_offset_route(&drone, &route, &polygons, &CorridorConfig::with_offset(-1.0)),
            Err(CorridorError::Input(InputValidationError::InvalidOffset(_)))
        ));
    }
}
