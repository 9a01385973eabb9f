//! Route discretization and hysteresis classification.
//!
//! The raw route is first corrected so it never passes through a polygon
//! interior: each crossing is replaced by the shorter way around the ring.
//! The corrected centerline is then sampled at a fixed arc-length step and
//! every sample is labelled by its distance to the *uncorrected* route.

use crate::config::{CorridorConfig, EndpointPolicy};
use crate::error::{CorridorError, GeometryError};
use crate::models::{GeoPoint, ProjectedPoint, RouteVertex};
use crate::polygon::{NoFlyPolygon, PolygonRepository, BOUNDARY_TOLERANCE_M};
use crate::projection::UtmProjector;
use crate::spatial::{distance_to_polyline, polyline_length, segment_intersection_param};

/// Classification of a sample relative to the original route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Label {
    /// On or near the original route.
    #[default]
    Safe,
    /// On a detour around a polygon.
    Boundary,
}

impl Label {
    /// Next label given a sample's distance to the original route.
    ///
    /// Below `tolerance_down` the sample is safe, above `tolerance_up` it is
    /// boundary, and in between it keeps the current label.
    pub fn transition(self, distance: f64, tolerance_down: f64, tolerance_up: f64) -> Label {
        if distance < tolerance_down {
            Label::Safe
        } else if distance > tolerance_up {
            Label::Boundary
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscretizedPoint {
    pub index: usize,
    pub projected: ProjectedPoint,
    pub geodetic: GeoPoint,
    pub label: Label,
    /// Distance to the uncorrected route in meters.
    pub distance: f64,
}

/// Sample and classify the route.
pub fn discretize_route(
    route: &[RouteVertex],
    repository: &PolygonRepository,
    projector: &UtmProjector,
    config: &CorridorConfig,
) -> Result<Vec<DiscretizedPoint>, CorridorError> {
    let raw = route
        .iter()
        .map(|v| projector.forward(v.lng, v.lat))
        .collect::<Result<Vec<_>, _>>()?;

    let corrected = correct_centerline(&raw, repository)?;
    let samples = sample_polyline(&corrected, config.step, config.endpoint_policy);

    let mut label = Label::Safe;
    let mut points = Vec::with_capacity(samples.len());
    for (index, projected) in samples.into_iter().enumerate() {
        let distance = distance_to_polyline(projected, &raw);
        label = label.transition(distance, config.tolerance_down, config.tolerance_up);
        points.push(DiscretizedPoint {
            index,
            projected,
            geodetic: projector.inverse_point(&projected)?,
            label,
            distance,
        });
    }

    tracing::debug!(
        "Discretized route: {} raw vertices, {} corrected, {} samples ({} boundary)",
        raw.len(),
        corrected.len(),
        points.len(),
        points.iter().filter(|p| p.label == Label::Boundary).count()
    );
    Ok(points)
}

/// Replace every polygon crossing with a detour along the ring.
///
/// Only the first polygon whose interior a segment crosses is handled.
pub fn correct_centerline(
    raw: &[ProjectedPoint],
    repository: &PolygonRepository,
) -> Result<Vec<ProjectedPoint>, GeometryError> {
    let mut out: Vec<ProjectedPoint> = Vec::with_capacity(raw.len());
    if let [only] = raw {
        out.push(*only);
    }
    for (segment, w) in raw.windows(2).enumerate() {
        let (a, b) = (w[0], w[1]);
        let piece = match detour(segment, a, b, repository)? {
            Some(path) => path,
            None => vec![a, b],
        };
        for p in piece {
            push_distinct(&mut out, p);
        }
    }
    Ok(out)
}

fn push_distinct(out: &mut Vec<ProjectedPoint>, p: ProjectedPoint) {
    if out
        .last()
        .map_or(true, |last| last.distance(&p) > BOUNDARY_TOLERANCE_M)
    {
        out.push(p);
    }
}

enum Overlap {
    Clear,
    Interval { entry: f64, exit: f64 },
}

fn detour(
    segment: usize,
    a: ProjectedPoint,
    b: ProjectedPoint,
    repository: &PolygonRepository,
) -> Result<Option<Vec<ProjectedPoint>>, GeometryError> {
    if a.distance(&b) <= BOUNDARY_TOLERANCE_M {
        return Ok(None);
    }
    for (polygon_idx, polygon) in repository.polygons().iter().enumerate() {
        let Overlap::Interval { entry, exit } = overlap(segment, polygon_idx, a, b, polygon)?
        else {
            continue;
        };
        let entry = polygon.project_onto_ring(a.lerp(&b, entry));
        let exit = polygon.project_onto_ring(a.lerp(&b, exit));
        let mut path = Vec::new();
        path.push(a);
        path.extend(polygon.arc_path(&entry, &exit));
        path.push(b);
        tracing::debug!(
            "Segment {} detoured around polygon {} ({} arc points)",
            segment,
            polygon_idx,
            path.len() - 2
        );
        return Ok(Some(path));
    }
    Ok(None)
}

/// Parameter interval of `a-b` that runs through the polygon interior.
fn overlap(
    segment: usize,
    polygon_idx: usize,
    a: ProjectedPoint,
    b: ProjectedPoint,
    polygon: &NoFlyPolygon,
) -> Result<Overlap, GeometryError> {
    let a_inside = polygon.contains(a);
    let b_inside = polygon.contains(b);

    let mut ts: Vec<f64> = polygon
        .ring()
        .windows(2)
        .filter_map(|w| segment_intersection_param(a, b, w[0], w[1]))
        .collect();
    let crossings = ts.len();
    if a_inside {
        ts.push(0.0);
    }
    if b_inside {
        ts.push(1.0);
    }
    if ts.is_empty() {
        return Ok(Overlap::Clear);
    }
    if a_inside && b_inside && crossings == 0 {
        return Err(GeometryError::UnusableIntersection {
            segment,
            polygon: polygon_idx,
        });
    }

    ts.sort_by(|x, y| x.total_cmp(y));
    ts.dedup_by(|x, y| (*x - *y).abs() <= 1e-12);

    let passes_inside = ts
        .windows(2)
        .any(|w| polygon.contains(a.lerp(&b, (w[0] + w[1]) / 2.0)));
    if !passes_inside {
        // Grazes a vertex or runs along an edge.
        return Ok(Overlap::Clear);
    }
    Ok(Overlap::Interval {
        entry: ts[0],
        exit: ts[ts.len() - 1],
    })
}

/// Sample the polyline at `k * step` for every whole step within its length.
///
/// With [`EndpointPolicy::ForceInclude`] the exact final vertex is appended
/// when the last whole step falls short of it.
pub fn sample_polyline(
    points: &[ProjectedPoint],
    step: f64,
    policy: EndpointPolicy,
) -> Vec<ProjectedPoint> {
    let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) else {
        return Vec::new();
    };
    let total = polyline_length(points);
    let whole_steps = (total / step).floor() as usize;

    let mut samples = Vec::with_capacity(whole_steps + 2);
    samples.push(first);
    let mut k = 1;
    let mut seg_start = 0.0;
    for w in points.windows(2) {
        let seg_len = w[0].distance(&w[1]);
        let seg_end = seg_start + seg_len;
        while k <= whole_steps && (k as f64) * step <= seg_end {
            let t = if seg_len > 0.0 {
                ((k as f64) * step - seg_start) / seg_len
            } else {
                0.0
            };
            samples.push(w[0].lerp(&w[1], t.clamp(0.0, 1.0)));
            k += 1;
        }
        seg_start = seg_end;
    }
    // Rounding can leave the last whole step just past the summed length.
    while k <= whole_steps {
        samples.push(last);
        k += 1;
    }

    if policy == EndpointPolicy::ForceInclude
        && total - (whole_steps as f64) * step > BOUNDARY_TOLERANCE_M
    {
        samples.push(last);
    }
    samples
}
