//! Planar test geometry placed inside UTM zone 37N.

use crate::models::ProjectedPoint;
use crate::polygon::{NoFlyPolygon, PolygonRepository};
use crate::projection::UtmProjector;

/// Local origin, roughly lat 55, lng 39.
pub const BASE: ProjectedPoint = ProjectedPoint::new(500_000.0, 6_100_000.0);

pub fn local(x: f64, y: f64) -> ProjectedPoint {
    BASE + ProjectedPoint::new(x, y)
}

/// Counter-clockwise square with its first vertex at local `(x0, y0)`.
pub fn square(index: usize, x0: f64, y0: f64, size: f64) -> NoFlyPolygon {
    let ring = [
        local(x0, y0),
        local(x0 + size, y0),
        local(x0 + size, y0 + size),
        local(x0, y0 + size),
    ];
    NoFlyPolygon::from_projected(index, &ring, &UtmProjector::default()).unwrap()
}

pub fn square_repository(x0: f64, y0: f64, size: f64) -> PolygonRepository {
    PolygonRepository::new(vec![square(0, x0, y0, size)])
}
