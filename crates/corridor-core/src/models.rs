//! Core data models for mission input and offset route output.

use crate::error::InputValidationError;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A WGS84 position in degrees, with optional altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            altitude: None,
        }
    }
}

/// A point in the planar metric CRS (meters, x = easting, y = northing).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &ProjectedPoint) -> f64 {
        (*self - *other).norm()
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: &ProjectedPoint) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(&self) -> Option<ProjectedPoint> {
        let norm = self.norm();
        if norm <= f64::EPSILON {
            return None;
        }
        Some(ProjectedPoint::new(self.x / norm, self.y / norm))
    }

    /// Counter-clockwise perpendicular.
    pub fn perp(&self) -> ProjectedPoint {
        ProjectedPoint::new(-self.y, self.x)
    }

    pub fn lerp(&self, other: &ProjectedPoint, t: f64) -> ProjectedPoint {
        ProjectedPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl Add for ProjectedPoint {
    type Output = ProjectedPoint;

    fn add(self, rhs: ProjectedPoint) -> ProjectedPoint {
        ProjectedPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ProjectedPoint {
    type Output = ProjectedPoint;

    fn sub(self, rhs: ProjectedPoint) -> ProjectedPoint {
        ProjectedPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for ProjectedPoint {
    type Output = ProjectedPoint;

    fn mul(self, rhs: f64) -> ProjectedPoint {
        ProjectedPoint::new(self.x * rhs, self.y * rhs)
    }
}

/// Ordered input waypoint. Order encodes the flight sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteVertex {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
}

/// Current drone position as reported by the mission source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneData {
    pub lat: f64,
    pub lng: f64,
}

// ========== GEOJSON ==========

/// GeoJSON FeatureCollection carrying the no-fly polygons (WGS84, `[lng, lat]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            kind: feature_collection_type(),
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl Feature {
    /// Build a polygon feature from `[lng, lat]` ring positions.
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self {
            kind: feature_type(),
            geometry: Some(Geometry::Polygon {
                coordinates: vec![ring.into_iter().map(|p| p.to_vec()).collect()],
            }),
            properties: None,
        }
    }
}

/// Geometry members the planner understands. Positions are `[lng, lat, ...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

// ========== MISSION ==========

/// Mission descriptor as relayed by the mission store.
///
/// Missing top-level fields deserialize to empty values so a partially
/// filled mission can be stored and echoed; [`MissionDescriptor::validate`]
/// rejects it before any geometry work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDescriptor {
    #[serde(default)]
    pub drone_data: Option<DroneData>,
    #[serde(default)]
    pub route_points: Vec<RouteVertex>,
    #[serde(default)]
    pub saved_polygons: FeatureCollection,
}

impl MissionDescriptor {
    /// Parse a mission from a JSON value, mapping shape errors to input errors.
    pub fn from_value(value: serde_json::Value) -> Result<Self, InputValidationError> {
        serde_json::from_value(value).map_err(|e| InputValidationError::Malformed(e.to_string()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, InputValidationError> {
        serde_json::from_str(raw).map_err(|e| InputValidationError::Malformed(e.to_string()))
    }

    /// Check required fields and coordinate sanity.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        let drone = self
            .drone_data
            .as_ref()
            .ok_or(InputValidationError::MissingField("droneData"))?;
        check_coordinate("droneData", drone.lat, drone.lng)?;

        validate_route(&self.route_points)?;

        if self.saved_polygons.features.is_empty() {
            return Err(InputValidationError::EmptyPolygonSet);
        }
        Ok(())
    }
}

/// At least two waypoints, all with finite in-range coordinates.
pub(crate) fn validate_route(route: &[RouteVertex]) -> Result<(), InputValidationError> {
    match route.len() {
        0 => return Err(InputValidationError::EmptyRoute),
        1 => return Err(InputValidationError::RouteTooShort(1)),
        _ => {}
    }
    for point in route {
        check_coordinate("routePoints", point.lat, point.lng)?;
    }
    Ok(())
}

pub(crate) fn check_coordinate(
    field: &'static str,
    lat: f64,
    lng: f64,
) -> Result<(), InputValidationError> {
    let valid = lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng);
    if valid {
        Ok(())
    } else {
        Err(InputValidationError::InvalidCoordinate { field, lat, lng })
    }
}

// ========== OUTPUT ==========

/// One point of the published offset route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalRoutePoint {
    pub lat: f64,
    pub lng: f64,
    pub altitude: Option<f64>,
    /// Reserved for the flight controller; not computed here.
    pub flight_altitude: Option<f64>,
    /// Reserved for terrain data; not computed here.
    pub ground_altitude: Option<f64>,
}

/// The ordered offset route. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalRoute {
    points: Vec<FinalRoutePoint>,
}

impl FinalRoute {
    pub fn new(points: Vec<FinalRoutePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[FinalRoutePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&FinalRoutePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&FinalRoutePoint> {
        self.points.last()
    }
}

/// Point counts per pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorStats {
    pub discretized_points: usize,
    pub boundary_points: usize,
    /// Points that needed the buffer projection or epsilon nudge fallback.
    pub degraded_points: usize,
    pub after_deduplication: usize,
    pub after_loop_removal: usize,
    pub final_points: usize,
}

/// Final route plus the context an external map renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetRouteResult {
    pub route: FinalRoute,
    pub drone: DroneData,
    pub original_route: Vec<RouteVertex>,
    pub polygons: FeatureCollection,
    pub stats: CorridorStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mission_parses_camel_case_fields() {
        let mission = MissionDescriptor::from_value(json!({
            "droneData": {"lat": 55.75, "lng": 37.61},
            "routePoints": [
                {"lat": 55.75, "lng": 37.61, "altitude": 50.0},
                {"lat": 55.76, "lng": 37.62, "altitude": 60.0}
            ],
            "savedPolygons": {
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[37.6, 55.7], [37.7, 55.7], [37.7, 55.8], [37.6, 55.7]]]
                    },
                    "properties": {}
                }]
            }
        }))
        .unwrap();

        assert_eq!(mission.route_points.len(), 2);
        assert_eq!(mission.route_points[1].altitude, Some(60.0));
        assert_eq!(mission.saved_polygons.features.len(), 1);
        assert!(mission.validate().is_ok());
    }

    #[test]
    fn missing_fields_normalize_then_fail_validation() {
        let mission = MissionDescriptor::from_value(json!({})).unwrap();
        assert_eq!(mission.saved_polygons.kind, "FeatureCollection");
        assert_eq!(
            mission.validate(),
            Err(InputValidationError::MissingField("droneData"))
        );

        let mission = MissionDescriptor::from_value(json!({
            "droneData": {"lat": 55.75, "lng": 37.61}
        }))
        .unwrap();
        assert_eq!(mission.validate(), Err(InputValidationError::EmptyRoute));
    }

    #[test]
    fn empty_polygon_set_is_rejected() {
        let mission = MissionDescriptor::from_value(json!({
            "droneData": {"lat": 55.75, "lng": 37.61},
            "routePoints": [{"lat": 55.75, "lng": 37.61}, {"lat": 55.76, "lng": 37.62}]
        }))
        .unwrap();
        assert_eq!(
            mission.validate(),
            Err(InputValidationError::EmptyPolygonSet)
        );
    }

    #[test]
    fn non_numeric_coordinates_are_malformed() {
        let result = MissionDescriptor::from_value(json!({
            "routePoints": [{"lat": "north", "lng": 37.61}]
        }));
        assert!(matches!(result, Err(InputValidationError::Malformed(_))));
    }

    #[test]
    fn unsupported_geometry_deserializes() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [37.6, 55.7]}
        }))
        .unwrap();
        assert_eq!(feature.geometry, Some(Geometry::Unsupported));
    }

    #[test]
    fn final_route_serializes_as_array() {
        let route = FinalRoute::new(vec![FinalRoutePoint {
            lat: 55.75,
            lng: 37.61,
            altitude: Some(50.0),
            flight_altitude: None,
            ground_altitude: None,
        }]);
        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(
            value,
            json!([{
                "lat": 55.75,
                "lng": 37.61,
                "altitude": 50.0,
                "flightAltitude": null,
                "groundAltitude": null
            }])
        );
    }
}
