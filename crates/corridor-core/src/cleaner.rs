//! Removal of redundant and looping points from an offset route.

use crate::config::CorridorConfig;
use crate::models::ProjectedPoint;
use crate::spatial::angle_between_deg;

/// Greedy thinning: keep a point iff it is at least `min_spacing` from the
/// last kept point. The first point is always kept.
pub fn reduce_route(route: &[ProjectedPoint], min_spacing: f64) -> Vec<ProjectedPoint> {
    let mut reduced: Vec<ProjectedPoint> = Vec::with_capacity(route.len());
    for p in route {
        match reduced.last() {
            Some(last) if p.distance(last) < min_spacing => {}
            _ => reduced.push(*p),
        }
    }
    reduced
}

/// Collapse loops where the route comes back near an earlier point while
/// heading the opposite way.
///
/// For `j >= i + 2`, if `p[j]` is within `distance_threshold` of `p[i]` and
/// the angle between `p[i] -> p[i+1]` and `p[j-1] -> p[j]` is at least
/// `angle_threshold` degrees, the points strictly between are dropped and
/// the scan restarts from the same `i`. A pair spanning the whole route is
/// the return leg of a closed mission and is left alone.
pub fn remove_loops(
    route: &[ProjectedPoint],
    distance_threshold: f64,
    angle_threshold: f64,
) -> Vec<ProjectedPoint> {
    let mut cleaned = route.to_vec();
    let mut i = 0;
    while i + 2 < cleaned.len() {
        let mut j = i + 2;
        while j < cleaned.len() {
            let whole_route = i == 0 && j == cleaned.len() - 1;
            if !whole_route && cleaned[i].distance(&cleaned[j]) < distance_threshold {
                let v1 = cleaned[i + 1] - cleaned[i];
                let v2 = cleaned[j] - cleaned[j - 1];
                if angle_between_deg(v1, v2) >= angle_threshold {
                    cleaned.drain(i + 1..j);
                    j = i + 2;
                    continue;
                }
            }
            j += 1;
        }
        i += 1;
    }
    cleaned
}

/// Point counts after each cleaning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRoute {
    pub points: Vec<ProjectedPoint>,
    pub after_deduplication: usize,
    pub after_loop_removal: usize,
}

/// De-duplicate, remove loops, then de-duplicate the seams loops leave.
pub fn clean_route(route: &[ProjectedPoint], config: &CorridorConfig) -> CleanedRoute {
    let deduplicated = reduce_route(route, config.min_spacing);
    let looped = remove_loops(
        &deduplicated,
        config.loop_distance_threshold,
        config.loop_angle_threshold,
    );
    let points = reduce_route(&looped, config.min_spacing);
    CleanedRoute {
        after_deduplication: deduplicated.len(),
        after_loop_removal: looped.len(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<ProjectedPoint> {
        coords.iter().map(|&(x, y)| ProjectedPoint::new(x, y)).collect()
    }

    #[test]
    fn reduce_keeps_spacing_and_order() {
        let route = pts(&[(0.0, 0.0), (0.5, 0.0), (1.0, 0.0), (1.2, 0.0), (2.5, 0.0)]);
        let reduced = reduce_route(&route, 0.95);
        assert_eq!(reduced, pts(&[(0.0, 0.0), (1.0, 0.0), (2.5, 0.0)]));
        assert!(reduced.windows(2).all(|w| w[0].distance(&w[1]) >= 0.95));
        assert!(reduce_route(&[], 0.95).is_empty());
    }

    #[test]
    fn out_and_back_spike_collapses() {
        let route = pts(&[(0.0, 0.0), (0.0, 10.0), (0.0, 20.0), (0.0, 10.001), (0.0, 0.001)]);
        let config = CorridorConfig::default();

        let looped = remove_loops(&route, 2.0, 150.0);
        assert_eq!(looped, pts(&[(0.0, 0.0), (0.0, 10.0), (0.0, 10.001), (0.0, 0.001)]));

        let cleaned = clean_route(&route, &config);
        assert_eq!(cleaned.points, pts(&[(0.0, 0.0), (0.0, 10.0), (0.0, 0.001)]));
        assert_eq!(cleaned.after_deduplication, 5);
        assert_eq!(cleaned.after_loop_removal, 4);
    }

    #[test]
    fn closed_mission_keeps_its_return_leg() {
        let route = pts(&[(0.0, 0.0), (0.0, 10.0), (3.0, 12.0), (0.5, 0.3)]);
        assert_eq!(remove_loops(&route, 2.0, 150.0), route);
    }

    #[test]
    fn shallow_turns_are_not_loops() {
        // Comes back within 2 m of the start, but heading 90 degrees off.
        let route = pts(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, -3.0),
            (0.5, -3.0),
            (0.5, -1.0),
            (0.5, 5.0),
        ]);
        assert_eq!(remove_loops(&route, 2.0, 150.0), route);
    }

    #[test]
    fn zero_length_direction_counts_as_zero_angle() {
        let route = pts(&[(0.0, 0.0), (0.0, 0.0), (5.0, 0.0), (0.5, 0.0), (9.0, 9.0)]);
        let looped = remove_loops(&route, 2.0, 150.0);
        assert_eq!(looped.len(), 4);
        assert_eq!(looped[0], looped[1]);
    }
}
