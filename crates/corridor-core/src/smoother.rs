//! Centered moving-average smoothing.

use crate::config::SmoothingEdge;
use crate::models::ProjectedPoint;

/// Average each point with up to `window / 2` neighbors on each side.
///
/// Near the ends, [`SmoothingEdge::Symmetric`] shrinks the window to the
/// neighbors available on both sides, so the first and last points are
/// returned unchanged. [`SmoothingEdge::Truncated`] keeps whatever neighbors
/// exist, which pulls the endpoints toward the interior. A window below 2
/// returns the input as is.
pub fn smooth_route(
    route: &[ProjectedPoint],
    window: usize,
    edge: SmoothingEdge,
) -> Vec<ProjectedPoint> {
    if route.is_empty() || window < 2 {
        return route.to_vec();
    }
    let n = route.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let neighborhood = match edge {
                SmoothingEdge::Symmetric => {
                    let reach = half.min(i).min(n - 1 - i);
                    &route[i - reach..=i + reach]
                }
                SmoothingEdge::Truncated => &route[i.saturating_sub(half)..(i + half + 1).min(n)],
            };
            let sum = neighborhood
                .iter()
                .fold(ProjectedPoint::default(), |acc, p| acc + *p);
            sum * (1.0 / neighborhood.len() as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: ProjectedPoint, x: f64, y: f64) -> bool {
        (a.x - x).abs() < 1e-12 && (a.y - y).abs() < 1e-12
    }

    fn pts(coords: &[(f64, f64)]) -> Vec<ProjectedPoint> {
        coords.iter().map(|&(x, y)| ProjectedPoint::new(x, y)).collect()
    }

    #[test]
    fn endpoints_are_kept() {
        let route = pts(&[(0.0, 0.0), (1.0, 3.0), (2.0, -1.0), (3.0, 4.0), (4.0, 0.0)]);
        let smoothed = smooth_route(&route, 5, SmoothingEdge::Symmetric);
        assert_eq!(smoothed.len(), route.len());
        assert_eq!(smoothed[0], route[0]);
        assert_eq!(smoothed[4], route[4]);
        // Second point averages its immediate neighbors only.
        assert!((smoothed[1].y - 2.0 / 3.0).abs() < 1e-12);
        // Center point averages all five.
        assert!((smoothed[2].x - 2.0).abs() < 1e-12);
        assert!((smoothed[2].y - 1.2).abs() < 1e-12);
    }

    #[test]
    fn truncated_edges_average_one_sided_neighbors() {
        let route = pts(&[(0.0, 0.0), (1.0, 3.0), (2.0, -1.0), (3.0, 4.0), (4.0, 0.0)]);
        let smoothed = smooth_route(&route, 5, SmoothingEdge::Truncated);
        assert_eq!(smoothed.len(), route.len());
        // First point: mean of p0, p1, p2.
        assert!(near(smoothed[0], 1.0, 2.0 / 3.0));
        // Second point: mean of p0..=p3.
        assert!(near(smoothed[1], 1.5, 1.5));
        assert!(near(smoothed[2], 2.0, 1.2));
        // Last point: mean of p2, p3, p4.
        assert!(near(smoothed[4], 3.0, 1.0));
    }

    #[test]
    fn edge_modes_agree_away_from_the_ends() {
        let route: Vec<_> = (0..12)
            .map(|i| ProjectedPoint::new(i as f64, if i % 2 == 0 { 1.0 } else { -1.0 }))
            .collect();
        let symmetric = smooth_route(&route, 5, SmoothingEdge::Symmetric);
        let truncated = smooth_route(&route, 5, SmoothingEdge::Truncated);
        for i in 2..10 {
            assert_eq!(symmetric[i], truncated[i]);
        }
        assert_eq!(symmetric[0], route[0]);
        assert_eq!(symmetric[11], route[11]);
        assert!(near(truncated[0], 1.0, 1.0 / 3.0));
    }

    #[test]
    fn straight_line_is_a_fixed_point() {
        let route: Vec<_> = (0..10).map(|i| ProjectedPoint::new(i as f64, 2.0 * i as f64)).collect();
        let smoothed = smooth_route(&route, 5, SmoothingEdge::Symmetric);
        for (a, b) in smoothed.iter().zip(&route) {
            assert!(a.distance(b) < 1e-9);
        }
    }

    #[test]
    fn truncated_edges_pull_line_ends_inward() {
        let route: Vec<_> = (0..10).map(|i| ProjectedPoint::new(i as f64, 0.0)).collect();
        let smoothed = smooth_route(&route, 5, SmoothingEdge::Truncated);
        // With 1 m samples the ends move by a full sample spacing.
        assert!(near(smoothed[0], 1.0, 0.0));
        assert!(near(smoothed[9], 8.0, 0.0));
        for i in 2..8 {
            assert!(smoothed[i].distance(&route[i]) < 1e-9);
        }
    }

    #[test]
    fn small_window_is_identity() {
        let route = pts(&[(0.0, 0.0), (1.0, 3.0), (2.0, -1.0)]);
        assert_eq!(smooth_route(&route, 1, SmoothingEdge::Truncated), route);
        assert_eq!(smooth_route(&route, 0, SmoothingEdge::Symmetric), route);
        assert!(smooth_route(&[], 5, SmoothingEdge::Truncated).is_empty());
    }
}
