//! No-fly polygons in geodetic and projected form, and the queries the
//! discretizer and offset stages run against them.
//!
//! Projected rings are closed (first vertex repeated last) and normalized
//! to counter-clockwise orientation, so the outward normal of edge `a -> b`
//! is `(dy, -dx)`.

use crate::error::{CorridorError, GeometryError, InputValidationError};
use crate::models::{FeatureCollection, GeoPoint, Geometry, ProjectedPoint};
use crate::projection::UtmProjector;
use crate::spatial::{project_onto_segment, segments_intersect_2d};

/// Distance under which a point counts as touching a ring.
pub const BOUNDARY_TOLERANCE_M: f64 = 1e-7;

/// Mitre length (in multiples of the offset) beyond which a join is bevelled.
pub const MITRE_LIMIT: f64 = 5.0;

const MIN_AREA_M2: f64 = 1e-6;

/// Closest point on one polygon's ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingPoint {
    pub point: ProjectedPoint,
    pub distance: f64,
    /// Arc length from the ring's first vertex, counter-clockwise.
    pub arc_length: f64,
    pub edge: usize,
}

/// Closest edge point across the whole repository.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    pub point: ProjectedPoint,
    pub distance: f64,
    pub polygon: usize,
    pub edge: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoFlyPolygon {
    index: usize,
    geodetic: Vec<GeoPoint>,
    ring: Vec<ProjectedPoint>,
    /// Arc length at each ring vertex; last entry is the perimeter.
    cumulative: Vec<f64>,
}

impl NoFlyPolygon {
    /// Build from a geodetic ring, open or closed.
    pub fn from_geodetic(
        index: usize,
        ring: &[GeoPoint],
        projector: &UtmProjector,
    ) -> Result<Self, CorridorError> {
        let vertices = ring
            .iter()
            .map(|g| Ok((*g, projector.forward_point(g)?)))
            .collect::<Result<Vec<_>, CorridorError>>()?;
        Ok(Self::build(index, vertices)?)
    }

    /// Build from a projected ring, open or closed.
    pub fn from_projected(
        index: usize,
        ring: &[ProjectedPoint],
        projector: &UtmProjector,
    ) -> Result<Self, CorridorError> {
        let vertices = ring
            .iter()
            .map(|p| Ok((projector.inverse_point(p)?, *p)))
            .collect::<Result<Vec<_>, CorridorError>>()?;
        Ok(Self::build(index, vertices)?)
    }

    fn build(
        index: usize,
        vertices: Vec<(GeoPoint, ProjectedPoint)>,
    ) -> Result<Self, GeometryError> {
        let mut distinct: Vec<(GeoPoint, ProjectedPoint)> = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            let repeated = distinct
                .last()
                .is_some_and(|last| last.1.distance(&vertex.1) <= BOUNDARY_TOLERANCE_M);
            if !repeated {
                distinct.push(vertex);
            }
        }
        while distinct.len() > 1
            && distinct[0].1.distance(&distinct[distinct.len() - 1].1) <= BOUNDARY_TOLERANCE_M
        {
            distinct.pop();
        }
        if distinct.len() < 3 {
            return Err(GeometryError::TooFewVertices {
                polygon: index,
                count: distinct.len(),
            });
        }

        let area = signed_area(distinct.iter().map(|v| v.1));
        if area.abs() <= MIN_AREA_M2 {
            return Err(GeometryError::Degenerate { polygon: index });
        }
        if area < 0.0 {
            distinct.reverse();
        }

        let (mut geodetic, mut ring): (Vec<GeoPoint>, Vec<ProjectedPoint>) =
            distinct.into_iter().unzip();
        geodetic.push(geodetic[0]);
        ring.push(ring[0]);

        check_simple(index, &ring)?;

        let mut cumulative = Vec::with_capacity(ring.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in ring.windows(2) {
            total += w[0].distance(&w[1]);
            cumulative.push(total);
        }

        Ok(Self {
            index,
            geodetic,
            ring,
            cumulative,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Closed counter-clockwise projected ring.
    pub fn ring(&self) -> &[ProjectedPoint] {
        &self.ring
    }

    /// Closed geodetic ring in the same vertex order as [`Self::ring`].
    pub fn geodetic_ring(&self) -> &[GeoPoint] {
        &self.geodetic
    }

    pub fn vertex_count(&self) -> usize {
        self.ring.len() - 1
    }

    pub fn perimeter(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Strict interior test (ray casting). Points on the ring are not contained.
    pub fn contains(&self, p: ProjectedPoint) -> bool {
        if self.touches(p) {
            return false;
        }
        let mut inside = false;
        for w in self.ring.windows(2) {
            let (a, b) = (w[0], w[1]);
            if ((a.y > p.y) != (b.y > p.y)) && (p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x)
            {
                inside = !inside;
            }
        }
        inside
    }

    pub fn touches(&self, p: ProjectedPoint) -> bool {
        self.project_onto_ring(p).distance <= BOUNDARY_TOLERANCE_M
    }

    /// Neither inside nor on the boundary.
    pub fn is_valid(&self, p: ProjectedPoint) -> bool {
        !self.contains(p) && !self.touches(p)
    }

    /// Nearest ring point to `p`; the first edge wins ties.
    pub fn project_onto_ring(&self, p: ProjectedPoint) -> RingPoint {
        let mut best = RingPoint {
            point: self.ring[0],
            distance: f64::INFINITY,
            arc_length: 0.0,
            edge: 0,
        };
        for (edge, w) in self.ring.windows(2).enumerate() {
            let (proj, distance) = project_onto_segment(p, w[0], w[1]);
            if distance < best.distance {
                best = RingPoint {
                    point: proj,
                    distance,
                    arc_length: self.cumulative[edge] + w[0].distance(&proj),
                    edge,
                };
            }
        }
        best
    }

    /// Ring point at the given arc length, wrapping around the perimeter.
    pub fn point_at(&self, arc_length: f64) -> ProjectedPoint {
        let perimeter = self.perimeter();
        let s = arc_length.rem_euclid(perimeter);
        for (edge, w) in self.ring.windows(2).enumerate() {
            let start = self.cumulative[edge];
            let end = self.cumulative[edge + 1];
            if s <= end && end > start {
                return w[0].lerp(&w[1], (s - start) / (end - start));
            }
        }
        self.ring[0]
    }

    /// Unit outward normal of a ring edge.
    pub fn edge_normal(&self, edge: usize) -> ProjectedPoint {
        let d = self.ring[edge + 1] - self.ring[edge];
        ProjectedPoint::new(d.y, -d.x)
            .normalized()
            .unwrap_or_default()
    }

    /// Shorter way around the ring from `entry` to `exit`, in travel order.
    ///
    /// Starts at `entry.point`, passes through the ring vertices strictly
    /// between the two positions, and ends at `exit.point`. Equal lengths
    /// go counter-clockwise.
    pub fn arc_path(&self, entry: &RingPoint, exit: &RingPoint) -> Vec<ProjectedPoint> {
        let perimeter = self.perimeter();
        let forward_len = (exit.arc_length - entry.arc_length).rem_euclid(perimeter);
        let backward_len = perimeter - forward_len;
        let forward = forward_len <= backward_len;
        let span = forward_len.min(backward_len);

        let mut between: Vec<(f64, ProjectedPoint)> = (0..self.vertex_count())
            .filter_map(|k| {
                let along = if forward {
                    (self.cumulative[k] - entry.arc_length).rem_euclid(perimeter)
                } else {
                    (entry.arc_length - self.cumulative[k]).rem_euclid(perimeter)
                };
                (along > BOUNDARY_TOLERANCE_M && along < span - BOUNDARY_TOLERANCE_M)
                    .then_some((along, self.ring[k]))
            })
            .collect();
        between.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut path = Vec::with_capacity(between.len() + 2);
        path.push(entry.point);
        path.extend(between.into_iter().map(|(_, p)| p));
        path.push(exit.point);
        path
    }

    /// Closed ring offset outward by `distance` with mitred joins.
    ///
    /// Joins whose mitre would exceed [`MITRE_LIMIT`] (and near reversals)
    /// are bevelled.
    pub fn buffer_ring(&self, distance: f64) -> Vec<ProjectedPoint> {
        let n = self.vertex_count();
        let mut out = Vec::with_capacity(n + 2);
        for k in 0..n {
            let vertex = self.ring[k];
            let n0 = self.edge_normal((k + n - 1) % n);
            let n1 = self.edge_normal(k);
            let denom = 1.0 + n0.dot(&n1);
            if denom > 1e-9 {
                let mitre = (n0 + n1) * (1.0 / denom);
                if mitre.norm() <= MITRE_LIMIT {
                    out.push(vertex + mitre * distance);
                    continue;
                }
            }
            out.push(vertex + n0 * distance);
            out.push(vertex + n1 * distance);
        }
        out.push(out[0]);
        out
    }
}

fn signed_area(points: impl Iterator<Item = ProjectedPoint> + Clone) -> f64 {
    let first = points.clone().next();
    let mut sum = 0.0;
    let mut prev: Option<ProjectedPoint> = None;
    for p in points {
        if let Some(q) = prev {
            sum += q.x * p.y - p.x * q.y;
        }
        prev = Some(p);
    }
    if let (Some(last), Some(first)) = (prev, first) {
        sum += last.x * first.y - first.x * last.y;
    }
    sum / 2.0
}

fn check_simple(index: usize, ring: &[ProjectedPoint]) -> Result<(), GeometryError> {
    let edges = ring.len() - 1;
    for i in 0..edges {
        for j in (i + 2)..edges {
            if i == 0 && j == edges - 1 {
                continue;
            }
            if segments_intersect_2d(ring[i], ring[i + 1], ring[j], ring[j + 1]) {
                return Err(GeometryError::SelfIntersecting {
                    polygon: index,
                    first: i,
                    second: j,
                });
            }
        }
    }
    Ok(())
}

/// The no-fly polygons of one mission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonRepository {
    polygons: Vec<NoFlyPolygon>,
}

impl PolygonRepository {
    pub fn new(polygons: Vec<NoFlyPolygon>) -> Self {
        Self { polygons }
    }

    /// Collect the outer ring of every `Polygon` and `MultiPolygon` member.
    ///
    /// Holes and other geometry types are skipped with a warning.
    pub fn from_feature_collection(
        collection: &FeatureCollection,
        projector: &UtmProjector,
    ) -> Result<Self, CorridorError> {
        let mut rings: Vec<(usize, &Vec<Vec<f64>>)> = Vec::new();
        for (feature_idx, feature) in collection.features.iter().enumerate() {
            let polygons: Vec<&Vec<Vec<Vec<f64>>>> = match &feature.geometry {
                Some(Geometry::Polygon { coordinates }) => vec![coordinates],
                Some(Geometry::MultiPolygon { coordinates }) => coordinates.iter().collect(),
                Some(Geometry::Unsupported) | None => {
                    tracing::warn!("Ignoring feature {} without polygon geometry", feature_idx);
                    continue;
                }
            };
            for polygon in polygons {
                match polygon.split_first() {
                    Some((outer, holes)) => {
                        if !holes.is_empty() {
                            tracing::warn!(
                                "Ignoring {} hole(s) in feature {}",
                                holes.len(),
                                feature_idx
                            );
                        }
                        rings.push((feature_idx, outer));
                    }
                    None => tracing::warn!("Ignoring polygon without rings in feature {}", feature_idx),
                }
            }
        }

        let mut polygons = Vec::with_capacity(rings.len());
        for (feature_idx, outer) in rings {
            let ring = outer
                .iter()
                .map(|position| match position.as_slice() {
                    [lng, lat, ..] => Ok(GeoPoint::new(*lat, *lng)),
                    _ => Err(InputValidationError::Malformed(format!(
                        "feature {feature_idx} has a position with {} coordinates",
                        position.len()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            polygons.push(NoFlyPolygon::from_geodetic(polygons.len(), &ring, projector)?);
        }

        if polygons.is_empty() {
            return Err(InputValidationError::EmptyPolygonSet.into());
        }
        Ok(Self { polygons })
    }

    pub fn polygons(&self) -> &[NoFlyPolygon] {
        &self.polygons
    }

    pub fn get(&self, polygon: usize) -> Option<&NoFlyPolygon> {
        self.polygons.get(polygon)
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Globally closest edge point; the first polygon wins ties.
    pub fn nearest_edge(&self, p: ProjectedPoint) -> Option<EdgeHit> {
        let mut best: Option<EdgeHit> = None;
        for (idx, polygon) in self.polygons.iter().enumerate() {
            let hit = polygon.project_onto_ring(p);
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(EdgeHit {
                    point: hit.point,
                    distance: hit.distance,
                    polygon: idx,
                    edge: hit.edge,
                });
            }
        }
        best
    }

    /// Valid with respect to one polygon. Unknown indices are vacuously valid.
    pub fn is_valid(&self, p: ProjectedPoint, polygon: usize) -> bool {
        self.polygons.get(polygon).map_or(true, |poly| poly.is_valid(p))
    }

    /// Valid with respect to every polygon.
    pub fn is_clear(&self, p: ProjectedPoint) -> bool {
        self.polygons.iter().all(|poly| poly.is_valid(p))
    }

    /// Index of the first polygon whose interior holds `p`.
    pub fn containing(&self, p: ProjectedPoint) -> Option<usize> {
        self.polygons.iter().position(|poly| poly.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{local, square};
    use crate::models::Feature;
    use crate::spatial::{meters_to_lat, meters_to_lon};

    fn lp(x: f64, y: f64) -> ProjectedPoint {
        local(x, y)
    }

    #[test]
    fn ring_is_closed_and_counter_clockwise() {
        let projector = UtmProjector::default();
        // Clockwise, open.
        let cw = [lp(0.0, 0.0), lp(0.0, 10.0), lp(10.0, 10.0), lp(10.0, 0.0)];
        let poly = NoFlyPolygon::from_projected(0, &cw, &projector).unwrap();
        assert_eq!(poly.vertex_count(), 4);
        assert_eq!(poly.ring().first(), poly.ring().last());
        assert!(signed_area(poly.ring()[..4].iter().copied()) > 0.0);
        assert_eq!(poly.geodetic_ring().len(), 5);
        assert!((poly.perimeter() - 40.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_invalid_rings() {
        let projector = UtmProjector::default();
        let two = [lp(0.0, 0.0), lp(10.0, 0.0), lp(0.0, 0.0)];
        assert_eq!(
            NoFlyPolygon::from_projected(3, &two, &projector),
            Err(CorridorError::Geometry(GeometryError::TooFewVertices {
                polygon: 3,
                count: 2
            }))
        );

        let bowtie = [lp(0.0, 0.0), lp(10.0, 10.0), lp(10.0, 0.0), lp(0.0, 4.0)];
        assert!(matches!(
            NoFlyPolygon::from_projected(0, &bowtie, &projector),
            Err(CorridorError::Geometry(GeometryError::SelfIntersecting { .. }))
        ));

        let flat = [lp(0.0, 0.0), lp(5.0, 0.0), lp(10.0, 0.0)];
        assert!(matches!(
            NoFlyPolygon::from_projected(0, &flat, &projector),
            Err(CorridorError::Geometry(GeometryError::Degenerate { polygon: 0 }))
        ));
    }

    #[test]
    fn contains_touches_and_validity() {
        let poly = square(0, 0.0, 0.0, 10.0);
        assert!(poly.contains(lp(5.0, 5.0)));
        assert!(!poly.contains(lp(0.0, 5.0)));
        assert!(poly.touches(lp(0.0, 5.0)));
        assert!(!poly.is_valid(lp(0.0, 5.0)));
        assert!(!poly.is_valid(lp(5.0, 5.0)));
        assert!(poly.is_valid(lp(15.0, 5.0)));
    }

    #[test]
    fn ring_projection_and_arc_positions() {
        let poly = square(0, 0.0, 0.0, 10.0);
        let hit = poly.project_onto_ring(lp(5.0, -3.0));
        assert!((hit.distance - 3.0).abs() < 1e-6);
        assert!((hit.arc_length - 5.0).abs() < 1e-6);
        assert_eq!(hit.edge, 0);

        let wrapped = poly.point_at(45.0);
        assert!(wrapped.distance(&lp(5.0, 0.0)) < 1e-6);
        let corner = poly.point_at(20.0);
        assert!(corner.distance(&lp(10.0, 10.0)) < 1e-6);
    }

    #[test]
    fn arc_path_takes_shorter_side_in_travel_order() {
        let poly = square(0, 0.0, 0.0, 10.0);
        let a = poly.project_onto_ring(lp(5.0, -1.0));
        let b = poly.project_onto_ring(lp(11.0, 5.0));

        let forward = poly.arc_path(&a, &b);
        assert_eq!(forward.len(), 3);
        assert!(forward[1].distance(&lp(10.0, 0.0)) < 1e-6);
        assert!(forward[2].distance(&lp(10.0, 5.0)) < 1e-6);

        let backward = poly.arc_path(&b, &a);
        assert_eq!(backward.len(), 3);
        assert!(backward[0].distance(&lp(10.0, 5.0)) < 1e-6);
        assert!(backward[1].distance(&lp(10.0, 0.0)) < 1e-6);
        assert!(backward[2].distance(&lp(5.0, 0.0)) < 1e-6);
    }

    #[test]
    fn buffer_ring_mitres_square_corners() {
        let poly = square(0, 0.0, 0.0, 10.0);
        let buffer = poly.buffer_ring(1.0);
        assert_eq!(buffer.len(), 5);
        assert!(buffer[0].distance(&lp(-1.0, -1.0)) < 1e-6);
        assert!(buffer[2].distance(&lp(11.0, 11.0)) < 1e-6);
        for p in &buffer {
            assert!(poly.is_valid(*p));
        }
    }

    #[test]
    fn sharp_spike_is_bevelled() {
        let projector = UtmProjector::default();
        let spike = [lp(0.0, 0.0), lp(100.0, 1.0), lp(0.0, 2.0)];
        let poly = NoFlyPolygon::from_projected(0, &spike, &projector).unwrap();
        let buffer = poly.buffer_ring(1.0);
        // The spike tip is split into two bevel points.
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn repository_reads_polygon_and_multipolygon_features() {
        let projector = UtmProjector::default();
        let lat0 = 55.75;
        let lng0 = 37.6;
        let dlat = meters_to_lat(50.0, lat0);
        let dlng = meters_to_lon(50.0, lat0);
        let ring = |x0: f64| {
            vec![
                vec![lng0 + x0, lat0],
                vec![lng0 + x0 + dlng, lat0],
                vec![lng0 + x0 + dlng, lat0 + dlat],
                vec![lng0 + x0, lat0 + dlat],
                vec![lng0 + x0, lat0],
            ]
        };
        let collection = FeatureCollection {
            kind: "FeatureCollection".to_string(),
            features: vec![
                Feature {
                    kind: "Feature".to_string(),
                    geometry: Some(Geometry::Polygon {
                        coordinates: vec![ring(0.0)],
                    }),
                    properties: None,
                },
                Feature {
                    kind: "Feature".to_string(),
                    geometry: Some(Geometry::Unsupported),
                    properties: None,
                },
                Feature {
                    kind: "Feature".to_string(),
                    geometry: Some(Geometry::MultiPolygon {
                        coordinates: vec![vec![ring(0.01)], vec![ring(0.02)]],
                    }),
                    properties: None,
                },
            ],
        };

        let repo = PolygonRepository::from_feature_collection(&collection, &projector).unwrap();
        assert_eq!(repo.len(), 3);
        assert_eq!(repo.get(2).map(|p| p.index()), Some(2));

        let inside_second = projector.forward(lng0 + 0.01 + dlng / 2.0, lat0 + dlat / 2.0).unwrap();
        assert_eq!(repo.containing(inside_second), Some(1));
        let hit = repo.nearest_edge(inside_second).unwrap();
        assert_eq!(hit.polygon, 1);
        assert!((hit.distance - 25.0).abs() < 0.5);
    }

    #[test]
    fn repository_without_polygons_is_rejected() {
        let projector = UtmProjector::default();
        let collection = FeatureCollection::default();
        assert_eq!(
            PolygonRepository::from_feature_collection(&collection, &projector),
            Err(CorridorError::Input(InputValidationError::EmptyPolygonSet))
        );
    }

    #[test]
    fn nearest_edge_prefers_closest_polygon() {
        let repo = PolygonRepository::new(vec![
            square(0, 0.0, 0.0, 10.0),
            square(1, 20.0, 0.0, 10.0),
        ]);
        let hit = repo.nearest_edge(lp(18.0, 5.0)).unwrap();
        assert_eq!(hit.polygon, 1);
        assert!((hit.distance - 2.0).abs() < 1e-6);
        assert!(repo.is_valid(lp(5.0, 5.0), 1));
        assert!(!repo.is_clear(lp(5.0, 5.0)));
    }
}
