//! Spatial math: great-circle distance and planar segment/polyline helpers.

use crate::models::ProjectedPoint;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Epsilon in meters for planar predicates. Absorbs floating-point error
/// from projection and arithmetic.
pub const PLANAR_EPS_M: f64 = 1e-7;

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lat(ref_lat_deg).max(1e-9)
}

/// Convert an east/west offset in meters to degrees longitude.
pub fn meters_to_lon(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lon(ref_lat_deg).max(1e-9)
}

fn orient(p: ProjectedPoint, q: ProjectedPoint, r: ProjectedPoint) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

fn within(a: f64, b: f64, value: f64) -> bool {
    let min = a.min(b) - PLANAR_EPS_M;
    let max = a.max(b) + PLANAR_EPS_M;
    value >= min && value <= max
}

fn on_segment(p: ProjectedPoint, q: ProjectedPoint, r: ProjectedPoint) -> bool {
    within(p.x, q.x, r.x) && within(p.y, q.y, r.y)
}

/// True if segments `a1-a2` and `b1-b2` cross, touch or overlap.
pub fn segments_intersect_2d(
    a1: ProjectedPoint,
    a2: ProjectedPoint,
    b1: ProjectedPoint,
    b2: ProjectedPoint,
) -> bool {
    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= PLANAR_EPS_M && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= PLANAR_EPS_M && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= PLANAR_EPS_M && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= PLANAR_EPS_M && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > PLANAR_EPS_M && o2 < -PLANAR_EPS_M) || (o1 < -PLANAR_EPS_M && o2 > PLANAR_EPS_M);
    let b_crosses = (o3 > PLANAR_EPS_M && o4 < -PLANAR_EPS_M) || (o3 < -PLANAR_EPS_M && o4 > PLANAR_EPS_M);
    a_crosses && b_crosses
}

/// Parameter `t` along `a1-a2` where it meets the non-parallel segment `b1-b2`.
///
/// Parallel and collinear pairs return `None`; callers treat those as touches.
pub fn segment_intersection_param(
    a1: ProjectedPoint,
    a2: ProjectedPoint,
    b1: ProjectedPoint,
    b2: ProjectedPoint,
) -> Option<f64> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() <= f64::EPSILON * r.norm().max(1.0) * s.norm().max(1.0) {
        return None;
    }
    let qp = b1 - a1;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    let tol_t = PLANAR_EPS_M / r.norm().max(PLANAR_EPS_M);
    let tol_u = PLANAR_EPS_M / s.norm().max(PLANAR_EPS_M);
    if t < -tol_t || t > 1.0 + tol_t || u < -tol_u || u > 1.0 + tol_u {
        return None;
    }
    Some(t.clamp(0.0, 1.0))
}

/// Project `p` onto segment `a-b`.
///
/// Returns the closest point on the segment and its distance to `p`.
pub fn project_onto_segment(
    p: ProjectedPoint,
    a: ProjectedPoint,
    b: ProjectedPoint,
) -> (ProjectedPoint, f64) {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq <= f64::EPSILON {
        return (a, p.distance(&a));
    }
    // t = ((P-A) · (B-A)) / |B-A|²
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let proj = a + ab * t;
    (proj, p.distance(&proj))
}

pub fn polyline_length(points: &[ProjectedPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Closest point on the polyline to `p` and its distance. First segment wins ties.
pub fn closest_point_on_polyline(
    p: ProjectedPoint,
    points: &[ProjectedPoint],
) -> Option<(ProjectedPoint, f64)> {
    match points {
        [] => None,
        [only] => Some((*only, p.distance(only))),
        _ => {
            let mut best: Option<(ProjectedPoint, f64)> = None;
            for w in points.windows(2) {
                let (proj, dist) = project_onto_segment(p, w[0], w[1]);
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((proj, dist));
                }
            }
            best
        }
    }
}

/// Shortest distance from `p` to any segment of the polyline.
pub fn distance_to_polyline(p: ProjectedPoint, points: &[ProjectedPoint]) -> f64 {
    closest_point_on_polyline(p, points).map_or(f64::INFINITY, |(_, d)| d)
}

/// Angle between two direction vectors in degrees, 0 when either is zero.
pub fn angle_between_deg(v1: ProjectedPoint, v2: ProjectedPoint) -> f64 {
    let norm1 = v1.norm();
    let norm2 = v2.norm();
    if norm1 == 0.0 || norm2 == 0.0 {
        return 0.0;
    }
    let cos_angle = (v1.dot(&v2) / (norm1 * norm2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}
