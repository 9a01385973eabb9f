//! Clearance offsets for discretized samples.
//!
//! Safe samples are pushed away from the nearest polygon edge. Runs of
//! boundary samples are shifted along the perpendicular of each sample's
//! neighbor bisector, with a fallback chain (buffer ring projection, nudge,
//! bounded outward push) when no candidate clears the polygon. Samples in
//! the hysteresis band blend both results.

use crate::config::CorridorConfig;
use crate::discretize::{DiscretizedPoint, Label};
use crate::models::ProjectedPoint;
use crate::polygon::{NoFlyPolygon, PolygonRepository, BOUNDARY_TOLERANCE_M};
use crate::spatial::closest_point_on_polyline;

const PUSH_START_M: f64 = 0.1;
const PUSH_ATTEMPTS: u32 = 8;

/// Which strategy produced an offset point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSource {
    Safe,
    Boundary,
    Blended,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetPoint {
    pub projected: ProjectedPoint,
    pub source: OffsetSource,
    /// Produced by the buffer projection, nudge or push fallback.
    pub degraded: bool,
}

/// Blend the two strategies by distance to the original route.
///
/// At or below `tolerance_down` the safe offset is returned unchanged, at
/// or above `tolerance_up` the boundary offset; in between the result is
/// linear in the distance.
pub fn interpolate_offset(
    safe: ProjectedPoint,
    boundary: ProjectedPoint,
    distance: f64,
    tolerance_down: f64,
    tolerance_up: f64,
) -> ProjectedPoint {
    if distance <= tolerance_down {
        return safe;
    }
    if distance >= tolerance_up {
        return boundary;
    }
    let ratio = (distance - tolerance_down) / (tolerance_up - tolerance_down);
    safe * (1.0 - ratio) + boundary * ratio
}

/// Move a point to `offset` meters from its nearest polygon edge.
///
/// Points already outside with at least `offset` clearance stay where they
/// are. A point exactly on the ring moves along the edge's outward normal.
pub fn safe_offset(
    point: ProjectedPoint,
    repository: &PolygonRepository,
    offset: f64,
) -> ProjectedPoint {
    let Some(hit) = repository.nearest_edge(point) else {
        return point;
    };
    let Some(polygon) = repository.get(hit.polygon) else {
        return point;
    };
    let inside = polygon.contains(point);
    if !inside && hit.distance >= offset {
        return point;
    }

    let unit = if hit.distance <= BOUNDARY_TOLERANCE_M {
        polygon.edge_normal(hit.edge)
    } else {
        (point - hit.point)
            .normalized()
            .unwrap_or_else(|| polygon.edge_normal(hit.edge))
    };
    let candidate = hit.point + unit * offset;
    if polygon.contains(candidate) {
        hit.point - unit * offset
    } else {
        candidate
    }
}

/// Offsets for every discretized sample, in order.
///
/// Labels are walked as maximal runs so each index receives exactly one
/// offset.
pub fn build_offsets(
    points: &[DiscretizedPoint],
    repository: &PolygonRepository,
    config: &CorridorConfig,
) -> Vec<OffsetPoint> {
    let mut offsets = Vec::with_capacity(points.len());
    let mut runs = 0usize;
    let mut start = 0;
    while start < points.len() {
        let label = points[start].label;
        let end = points[start..]
            .iter()
            .position(|p| p.label != label)
            .map_or(points.len(), |len| start + len);
        let run = &points[start..end];
        match label {
            Label::Safe => offsets.extend(run.iter().map(|p| OffsetPoint {
                projected: safe_offset(p.projected, repository, config.offset),
                source: OffsetSource::Safe,
                degraded: false,
            })),
            Label::Boundary => {
                runs += 1;
                offsets.extend(offset_boundary_run(run, repository, config));
            }
        }
        start = end;
    }

    tracing::debug!(
        "Computed {} offsets across {} boundary run(s), {} degraded",
        offsets.len(),
        runs,
        offsets.iter().filter(|o| o.degraded).count()
    );
    offsets
}

fn offset_boundary_run(
    run: &[DiscretizedPoint],
    repository: &PolygonRepository,
    config: &CorridorConfig,
) -> Vec<OffsetPoint> {
    let middle = run[run.len() / 2].projected;
    let polygon = match repository
        .nearest_edge(middle)
        .and_then(|hit| repository.get(hit.polygon))
    {
        Some(polygon) => polygon,
        None => {
            return run
                .iter()
                .map(|p| OffsetPoint {
                    projected: p.projected,
                    source: OffsetSource::Boundary,
                    degraded: false,
                })
                .collect()
        }
    };

    let shifter = BoundaryShifter::new(polygon, config);
    let positions: Vec<ProjectedPoint> = run.iter().map(|p| p.projected).collect();
    let mut shifted: Vec<ProjectedPoint> = Vec::with_capacity(run.len());
    let mut out = Vec::with_capacity(run.len());

    for (i, sample) in run.iter().enumerate() {
        let (boundary, degraded) = if i == run.len() - 1 && run.len() > 1 {
            shifter.shift_last(i, &positions, &shifted)
        } else {
            shifter.shift_point(i, &positions)
        };
        let safe = safe_offset(sample.projected, repository, config.offset);

        let d = sample.distance;
        let (projected, source) = if d <= config.tolerance_down {
            (safe, OffsetSource::Safe)
        } else if d >= config.tolerance_up {
            (boundary, OffsetSource::Boundary)
        } else {
            let blended =
                interpolate_offset(safe, boundary, d, config.tolerance_down, config.tolerance_up);
            if polygon.is_valid(blended) {
                (blended, OffsetSource::Blended)
            } else if polygon.is_valid(boundary) {
                (boundary, OffsetSource::Boundary)
            } else {
                (safe, OffsetSource::Safe)
            }
        };
        let degraded = degraded && source != OffsetSource::Safe;
        if degraded {
            tracing::warn!(
                "Offset {} near polygon {} needed fallback ({:.2}, {:.2}), valid={}",
                sample.index,
                polygon.index(),
                projected.x,
                projected.y,
                polygon.is_valid(projected)
            );
        }
        shifted.push(projected);
        out.push(OffsetPoint {
            projected,
            source,
            degraded,
        });
    }
    out
}

/// Boundary strategy against a single polygon.
struct BoundaryShifter<'a> {
    polygon: &'a NoFlyPolygon,
    offset: f64,
    nudge: f64,
    buffer: Vec<ProjectedPoint>,
}

impl<'a> BoundaryShifter<'a> {
    fn new(polygon: &'a NoFlyPolygon, config: &CorridorConfig) -> Self {
        Self {
            polygon,
            offset: config.offset,
            nudge: config.nudge,
            buffer: polygon.buffer_ring(config.offset),
        }
    }

    /// First valid perpendicular of the bisector of the cyclic neighbor edges.
    fn shift_by_neighbor(&self, idx: usize, run: &[ProjectedPoint]) -> Option<ProjectedPoint> {
        let n = run.len();
        if n < 2 {
            return None;
        }
        let point = run[idx];
        let prev = run[(idx + n - 1) % n];
        let next = run[(idx + 1) % n];

        let v1 = (next - point).normalized()?;
        let v2 = (point - prev).normalized()?;
        let bisector = (v1 + v2).normalized().unwrap_or_else(|| v1.perp());

        let perp1 = bisector.perp();
        let perp2 = perp1 * -1.0;
        [point + perp1 * self.offset, point + perp2 * self.offset]
            .into_iter()
            .find(|c| self.polygon.is_valid(*c))
    }

    /// Bisector shift, falling back to the buffer chain. Returns `(point, degraded)`.
    fn shift_point(&self, idx: usize, run: &[ProjectedPoint]) -> (ProjectedPoint, bool) {
        match self.shift_by_neighbor(idx, run) {
            Some(candidate) => (candidate, false),
            None => (self.fallback(run[idx]), true),
        }
    }

    /// The last point of a run follows the recent displacement trend.
    fn shift_last(
        &self,
        idx: usize,
        run: &[ProjectedPoint],
        shifted: &[ProjectedPoint],
    ) -> (ProjectedPoint, bool) {
        let point = run[idx];
        if shifted.len() >= 3 {
            let from = shifted.len() - 3;
            let sum = (from..shifted.len())
                .map(|j| shifted[j] - run[j])
                .fold(ProjectedPoint::default(), |acc, d| acc + d);
            let candidate = point + sum * (1.0 / 3.0);
            if self.polygon.is_valid(candidate) {
                return (candidate, false);
            }
        }

        let Some(tangent) = (point - run[idx - 1]).normalized() else {
            return self.shift_point(idx, run);
        };
        let normal = tangent.perp();
        for candidate in [point + normal * self.offset, point - normal * self.offset] {
            if self.polygon.is_valid(candidate) {
                return (candidate, false);
            }
        }
        (self.fallback(point), true)
    }

    /// Buffer ring projection, then nudge, then a bounded outward push.
    fn fallback(&self, point: ProjectedPoint) -> ProjectedPoint {
        let (resolved, step) = self.fallback_chain(point);
        match step {
            FallbackStep::Push(attempt) => tracing::debug!(
                "Fallback near polygon {} pushed out on attempt {}",
                self.polygon.index(),
                attempt
            ),
            _ => tracing::debug!(
                "Fallback near polygon {} resolved by {:?}",
                self.polygon.index(),
                step
            ),
        }
        resolved
    }

    fn fallback_chain(&self, point: ProjectedPoint) -> (ProjectedPoint, FallbackStep) {
        let on_buffer = closest_point_on_polyline(point, &self.buffer)
            .map_or(point, |(proj, _)| proj);
        if self.polygon.is_valid(on_buffer) {
            return (on_buffer, FallbackStep::Buffer);
        }

        let nudged = on_buffer + ProjectedPoint::new(self.nudge, self.nudge);
        if self.polygon.is_valid(nudged) {
            return (nudged, FallbackStep::Nudge);
        }

        let hit = self.polygon.project_onto_ring(nudged);
        let outward = self.polygon.edge_normal(hit.edge);
        let mut step = PUSH_START_M;
        let mut candidate = nudged;
        for attempt in 1..=PUSH_ATTEMPTS {
            candidate = hit.point + outward * step;
            if self.polygon.is_valid(candidate) {
                return (candidate, FallbackStep::Push(attempt));
            }
            step *= 2.0;
        }
        (candidate, FallbackStep::Exhausted)
    }
}

/// Stage of the fallback chain that produced a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackStep {
    Buffer,
    Nudge,
    /// Push that became valid on the given attempt, counted from 1.
    Push(u32),
    /// No push attempt was valid; the farthest candidate is kept.
    Exhausted,
}
