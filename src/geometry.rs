//! Planar geometry boundary.
//!
//! Everything above this module speaks in [`PlanePoint`] rings; conversion
//! from and to geographic coordinates happens only through [`Projection`],
//! and the boolean primitives live behind [`Clipper`].

use geo::{BooleanOps, Intersects, LineString, MultiPolygon, Polygon, Simplify};
use itertools::Itertools;

use crate::point::{GeoPoint, PlanePoint};

/// An open ring: the closing vertex is implied, never stored.
pub type PlaneRing = Vec<PlanePoint>;

/// Coordinate transform supplied by the host renderer.
pub trait Projection {
    fn to_plane(&self, point: GeoPoint) -> PlanePoint;

    fn to_geo(&self, point: PlanePoint) -> GeoPoint;

    fn ring_to_plane(&self, ring: &[GeoPoint]) -> PlaneRing {
        ring.iter().map(|&p| self.to_plane(p)).collect()
    }

    fn ring_to_geo(&self, ring: &[PlanePoint]) -> Vec<GeoPoint> {
        ring.iter().map(|&p| self.to_geo(p)).collect()
    }
}

/// The polygon-clipping primitive.
pub trait Clipper {
    /// Union of all `rings` as one operation. Returns the outer boundary of
    /// every resulting polygon; holes are dropped.
    fn union(&self, rings: &[PlaneRing]) -> Vec<PlaneRing>;

    fn simplify(&self, ring: &[PlanePoint], tolerance: f64) -> PlaneRing;

    fn intersects(&self, a: &[PlanePoint], b: &[PlanePoint]) -> bool;
}

/// [`Clipper`] backed by the `geo` crate's boolean operations.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoClipper;

impl GeoClipper {
    fn polygon(ring: &[PlanePoint]) -> Polygon<f64> {
        // `Polygon::new` closes the exterior for us.
        Polygon::new(
            LineString::from(ring.iter().map(|&p| geo::Coord::from(p)).collect::<Vec<_>>()),
            vec![],
        )
    }

    fn exterior(polygon: &Polygon<f64>) -> PlaneRing {
        open_ring(polygon.exterior().coords().map(|&c| PlanePoint::from(c)).collect())
    }
}

impl Clipper for GeoClipper {
    fn union(&self, rings: &[PlaneRing]) -> Vec<PlaneRing> {
        let merged = rings
            .iter()
            .filter(|ring| ring.len() >= 3)
            .map(|ring| MultiPolygon::new(vec![Self::polygon(ring)]))
            .fold(MultiPolygon::new(vec![]), |acc, next| acc.union(&next));
        merged
            .0
            .iter()
            .map(Self::exterior)
            .filter(|ring| ring.len() >= 3)
            .collect()
    }

    fn simplify(&self, ring: &[PlanePoint], tolerance: f64) -> PlaneRing {
        if ring.len() < 3 || tolerance <= 0.0 {
            return ring.to_vec();
        }
        Self::exterior(&Self::polygon(ring).simplify(&tolerance))
    }

    fn intersects(&self, a: &[PlanePoint], b: &[PlanePoint]) -> bool {
        if a.len() < 3 || b.len() < 3 {
            return false;
        }
        Self::polygon(a).intersects(&Self::polygon(b))
    }
}

/// Drops the closing vertex if the ring repeats its first point at the end.
pub fn open_ring<P: PartialEq>(mut ring: Vec<P>) -> Vec<P> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Appends the first point to the end, unless already closed.
pub fn close_ring<P: PartialEq + Copy>(ring: &[P]) -> Vec<P> {
    let mut closed = ring.to_vec();
    if let Some(&first) = ring.first() {
        if ring.last() != Some(&first) || ring.len() == 1 {
            closed.push(first);
        }
    }
    closed
}

/// Number of distinct vertices, ignoring closure.
pub fn distinct_vertices(ring: &[PlanePoint]) -> usize {
    ring.iter().unique_by(|p| p.key()).count()
}

/// Distance from `p` to the segment `a`–`b`, measured perpendicular to the
/// segment where the foot falls inside it and to the nearer endpoint
/// otherwise.
pub fn segment_distance(p: PlanePoint, a: PlanePoint, b: PlanePoint) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.dist(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.dist(PlanePoint::new(a.x + t * dx, a.y + t * dy))
}

/// The boundary segment of `ring` nearest to `p`, as the index of its
/// starting vertex together with the distance. Ties keep the segment met
/// first in ring order.
pub fn nearest_segment(ring: &[PlanePoint], p: PlanePoint) -> Option<(usize, f64)> {
    if ring.len() < 2 {
        return None;
    }
    ring.iter()
        .circular_tuple_windows()
        .enumerate()
        .map(|(ix, (&a, &b))| (ix, segment_distance(p, a, b)))
        .fold(None, |best: Option<(usize, f64)>, (ix, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((ix, d)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> PlaneRing {
        vec![
            PlanePoint::new(x, y),
            PlanePoint::new(x + size, y),
            PlanePoint::new(x + size, y + size),
            PlanePoint::new(x, y + size),
        ]
    }

    #[test]
    fn union_of_overlapping_squares_has_eight_corners() {
        let rings = GeoClipper.union(&[square(0.0, 0.0, 100.0), square(50.0, 50.0, 100.0)]);
        assert_eq!(rings.len(), 1);
        assert_eq!(distinct_vertices(&rings[0]), 8);
    }

    #[test]
    fn union_of_disjoint_squares_keeps_both() {
        let rings = GeoClipper.union(&[square(0.0, 0.0, 10.0), square(50.0, 50.0, 10.0)]);
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn intersection_test() {
        assert!(GeoClipper.intersects(&square(0.0, 0.0, 100.0), &square(50.0, 50.0, 100.0)));
        assert!(!GeoClipper.intersects(&square(0.0, 0.0, 10.0), &square(50.0, 50.0, 10.0)));
    }

    #[test]
    fn simplify_drops_collinear_points() {
        let ring = vec![
            PlanePoint::new(0.0, 0.0),
            PlanePoint::new(10.0, 0.0),
            PlanePoint::new(10.0, 10.0),
            PlanePoint::new(5.0, 10.1),
            PlanePoint::new(0.0, 10.0),
        ];
        let simplified = GeoClipper.simplify(&ring, 1.0);
        assert_eq!(distinct_vertices(&simplified), 4);
    }

    #[test]
    fn ring_closure() {
        let open = vec![1, 2, 3];
        assert_eq!(close_ring(&open), vec![1, 2, 3, 1]);
        assert_eq!(close_ring(&[1, 2, 3, 1]), vec![1, 2, 3, 1]);
        assert_eq!(open_ring(vec![1, 2, 3, 1]), vec![1, 2, 3]);
        assert_eq!(open_ring(vec![1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn distance_to_segment() {
        let (a, b) = (PlanePoint::new(0.0, 0.0), PlanePoint::new(10.0, 0.0));
        assert_eq!(segment_distance(PlanePoint::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(segment_distance(PlanePoint::new(13.0, 4.0), a, b), 5.0);
    }

    #[test]
    fn nearest_segment_prefers_first_on_tie() {
        let ring = square(0.0, 0.0, 10.0);
        // Equidistant from the bottom (0) and right (1) edges.
        let (ix, d) = nearest_segment(&ring, PlanePoint::new(8.0, 2.0)).unwrap();
        assert_eq!(ix, 0);
        assert_eq!(d, 2.0);

        let (ix, _) = nearest_segment(&ring, PlanePoint::new(1.0, 5.0)).unwrap();
        assert_eq!(ix, 3);
    }
}
