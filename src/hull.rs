use std::collections::{HashMap, HashSet};
use std::fmt;

use geo::{ConcaveHull, ConvexHull, MultiPoint, Point};
use lazy_static::lazy_static;

use crate::geometry::{open_ring, PlaneRing};
use crate::point::PlanePoint;

pub const CONVEX: &str = "convex";
pub const CONCAVE: &str = "concave";

/// Concavity handed to `geo`'s concave hull; lower values hug the points
/// more tightly.
pub const DEFAULT_CONCAVITY: f64 = 2.0;

lazy_static! {
    /// Every hull algorithm name an engine may be configured with.
    pub static ref KNOWN_HULLS: HashSet<&'static str> =
        [CONVEX, CONCAVE].into_iter().collect();
}

/// Reduces a raw point cloud to its boundary.
pub trait HullAlgorithm {
    fn hull(&self, points: &[PlanePoint]) -> PlaneRing;
}

fn multi_point(points: &[PlanePoint]) -> MultiPoint<f64> {
    MultiPoint::new(points.iter().map(|p| Point::new(p.x, p.y)).collect())
}

fn exterior(polygon: geo::Polygon<f64>) -> PlaneRing {
    let (exterior, _) = polygon.into_inner();
    open_ring(exterior.into_iter().map(PlanePoint::from).collect())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Convex;

impl HullAlgorithm for Convex {
    fn hull(&self, points: &[PlanePoint]) -> PlaneRing {
        if points.len() < 3 {
            return points.to_vec();
        }
        exterior(multi_point(points).convex_hull())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Concave {
    pub concavity: f64,
}

impl Default for Concave {
    fn default() -> Self {
        Self {
            concavity: DEFAULT_CONCAVITY,
        }
    }
}

impl HullAlgorithm for Concave {
    fn hull(&self, points: &[PlanePoint]) -> PlaneRing {
        if points.len() < 3 {
            return points.to_vec();
        }
        exterior(multi_point(points).concave_hull(self.concavity))
    }
}

/// Implementations supplied for the known hull names. A name may be known
/// yet unsupplied; selecting such a name with hull reduction enabled is a
/// setup fault.
#[derive(Default)]
pub struct HullRegistry {
    supplied: HashMap<&'static str, Box<dyn HullAlgorithm>>,
}

impl HullRegistry {
    /// No implementations at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Both known names, backed by `geo`.
    pub fn builtin() -> Self {
        Self::empty()
            .supply(CONVEX, Convex)
            .supply(CONCAVE, Concave::default())
    }

    /// Supplies the implementation for a known name. Unknown names are
    /// ignored.
    pub fn supply(mut self, name: &str, algorithm: impl HullAlgorithm + 'static) -> Self {
        match KNOWN_HULLS.get(name) {
            Some(&known) => {
                self.supplied.insert(known, Box::new(algorithm));
            }
            None => tracing::warn!("ignoring implementation for unknown hull `{}`", name),
        }
        self
    }

    pub fn is_supplied(&self, name: &str) -> bool {
        self.supplied.contains_key(name)
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<Box<dyn HullAlgorithm>> {
        self.supplied.remove(name)
    }
}

impl fmt::Debug for HullRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.supplied.keys().collect();
        names.sort();
        f.debug_struct("HullRegistry").field("supplied", &names).finish()
    }
}
