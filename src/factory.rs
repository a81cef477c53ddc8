//! Turning raw point lists into admitted polygons.

use tracing::{debug, info, trace, warn};

use crate::config::Options;
use crate::geometry::{distinct_vertices, open_ring, Clipper, Projection};
use crate::hull::HullAlgorithm;
use crate::point::GeoPoint;
use crate::polygon::{LineageIds, Polygon, PolygonId, Snapshot};
use crate::renderer::MapRenderer;
use crate::store::PolygonStore;

/// How much processing a point list goes through before admission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pipeline {
    /// Hull reduction (when enabled), simplification, then union.
    Full,
    /// Union only, to untangle a ring that an edit made self-crossing.
    Normalize,
    /// The ring is taken as-is.
    Verbatim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
    pub pipeline: Pipeline,
    /// Ignores the polygon cap.
    pub force: bool,
    /// Lineage for the first admitted ring; fresh ids otherwise.
    pub lineage: Option<PolygonId>,
}

impl Admission {
    /// A stroke the user just drew.
    pub fn user() -> Self {
        Self {
            pipeline: Pipeline::Full,
            force: false,
            lineage: None,
        }
    }

    /// A ring produced by the merge engine.
    pub fn merged() -> Self {
        Self {
            pipeline: Pipeline::Verbatim,
            force: true,
            lineage: None,
        }
    }

    /// Rebuilding an edited polygon from its final geometry.
    pub fn rebuild(lineage: PolygonId) -> Self {
        Self {
            pipeline: Pipeline::Normalize,
            force: true,
            lineage: Some(lineage),
        }
    }
}

/// The mutable drawing state the factory and merge engine work against.
pub struct Scene<'a, R: ?Sized> {
    pub renderer: &'a mut R,
    pub store: &'a mut PolygonStore,
    pub ids: &'a mut LineageIds,
    pub edges_active: bool,
}

pub struct Factory<'a> {
    clipper: &'a dyn Clipper,
    hull: Option<&'a dyn HullAlgorithm>,
    options: &'a Options,
}

impl<'a> Factory<'a> {
    pub fn new(
        clipper: &'a dyn Clipper,
        hull: Option<&'a dyn HullAlgorithm>,
        options: &'a Options,
    ) -> Self {
        Self {
            clipper,
            hull,
            options,
        }
    }

    #[inline]
    pub fn clipper(&self) -> &'a dyn Clipper {
        self.clipper
    }

    /// Runs `points` through `pipeline` and returns every ring that is
    /// still a polygon (three or more distinct vertices) afterwards.
    pub fn rings<P: Projection + ?Sized>(
        &self,
        projection: &P,
        points: &[GeoPoint],
        pipeline: Pipeline,
    ) -> Vec<Vec<GeoPoint>> {
        let plane = projection.ring_to_plane(points);
        if distinct_vertices(&plane) < 3 {
            trace!("factory: {} points is not a polygon", plane.len());
            return vec![];
        }

        let candidates = match pipeline {
            Pipeline::Verbatim => return vec![points.to_vec()],
            Pipeline::Normalize => self.clipper.union(&[plane]),
            Pipeline::Full => {
                let reduced = match self.hull.filter(|_| self.options.concave_polygon()) {
                    Some(hull) => hull.hull(&plane),
                    None => plane,
                };
                let simplified = self
                    .clipper
                    .simplify(&reduced, self.options.simplify_factor());
                self.clipper.union(&[simplified])
            }
        };

        candidates
            .into_iter()
            .filter(|ring| {
                let keep = distinct_vertices(ring) >= 3;
                if !keep {
                    trace!("factory: dropping degenerate ring of {}", ring.len());
                }
                keep
            })
            .map(|ring| projection.ring_to_geo(&ring))
            .collect()
    }

    /// Builds polygons from `points` and adds them to the store. Returns the
    /// lineage ids admitted, which may be none (degenerate input, cap
    /// reached) or several (a stroke that crossed itself).
    pub fn admit<R: MapRenderer + ?Sized>(
        &self,
        scene: &mut Scene<'_, R>,
        points: &[GeoPoint],
        admission: Admission,
    ) -> Vec<PolygonId> {
        let maximum = self.options.maximum_polygons();
        let room = |store: &PolygonStore| admission.force || store.len() < maximum;
        if !room(scene.store) {
            info!("factory: polygon cap of {} reached", maximum);
            return vec![];
        }

        let raw = open_ring(points.to_vec());
        let rings = self.rings(&*scene.renderer, &raw, admission.pipeline);
        let mut lineage = admission.lineage;
        let mut admitted = Vec::with_capacity(rings.len());
        for ring in rings {
            if !room(scene.store) {
                info!("factory: polygon cap of {} reached", maximum);
                break;
            }
            let id = lineage.take().unwrap_or_else(|| scene.ids.allocate());
            let polygon = Polygon::new(id, ring, raw.clone(), scene.edges_active);
            scene.store.add(polygon, &mut *scene.renderer);
            admitted.push(id);
        }
        debug!(
            "factory: admitted {:?} from {} points ({:?})",
            admitted,
            raw.len(),
            admission.pipeline
        );
        admitted
    }

    /// Puts a recorded state back exactly as it was, raw points included.
    /// Ignores the cap.
    pub fn restore<R: MapRenderer + ?Sized>(
        &self,
        scene: &mut Scene<'_, R>,
        snapshot: &Snapshot,
    ) -> Option<PolygonId> {
        if self
            .rings(&*scene.renderer, &snapshot.ring, Pipeline::Verbatim)
            .is_empty()
        {
            warn!("factory: recorded state of {} is degenerate", snapshot.lineage);
            return None;
        }
        let polygon = Polygon::from_snapshot(snapshot, scene.edges_active);
        scene.store.add(polygon, &mut *scene.renderer);
        debug!("factory: restored {}", snapshot.lineage);
        Some(snapshot.lineage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeoClipper;
    use crate::hull::Convex;
    use crate::renderer::HeadlessRenderer;

    fn square(x: f64, y: f64, size: f64) -> Vec<GeoPoint> {
        [(x, y), (x + size, y), (x + size, y + size), (x, y + size), (x, y)]
            .into_iter()
            .map(|(x, y)| GeoPoint::new(y, x))
            .collect()
    }

    struct Fixture {
        renderer: HeadlessRenderer,
        store: PolygonStore,
        ids: LineageIds,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                renderer: HeadlessRenderer::default(),
                store: PolygonStore::default(),
                ids: LineageIds::default(),
            }
        }

        fn admit(
            &mut self,
            options: &Options,
            points: &[GeoPoint],
            admission: Admission,
        ) -> Vec<PolygonId> {
            let factory = Factory::new(&GeoClipper, Some(&Convex), options);
            let mut scene = Scene {
                renderer: &mut self.renderer,
                store: &mut self.store,
                ids: &mut self.ids,
                edges_active: true,
            };
            factory.admit(&mut scene, points, admission)
        }
    }

    #[test]
    fn admits_a_square() {
        let options = Options::default();
        let mut fixture = Fixture::new();
        let ids = fixture.admit(&options, &square(0.0, 0.0, 100.0), Admission::user());
        assert_eq!(ids.len(), 1);
        let polygon = fixture.store.get(ids[0]).unwrap();
        assert_eq!(polygon.vertex_count(), 4);
        assert_eq!(polygon.edge_count(), 4);
        assert_eq!(polygon.raw().len(), 4);
        assert_eq!(fixture.renderer.layers.get(&ids[0]), Some(&4));
    }

    #[test]
    fn rejects_degenerate_input() {
        let options = Options::default();
        let mut fixture = Fixture::new();
        let line = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)];
        assert!(fixture.admit(&options, &line, Admission::user()).is_empty());
        let repeated = vec![GeoPoint::new(0.0, 0.0); 5];
        assert!(fixture.admit(&options, &repeated, Admission::user()).is_empty());
        assert!(fixture.admit(&options, &[], Admission::user()).is_empty());
        assert!(fixture.store.is_empty());
    }

    #[test]
    fn hull_reduction_fills_a_notch() {
        let options = Options::default();
        let mut fixture = Fixture::new();
        let corners = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (5.0, 5.0), (0.0, 10.0)];
        let notched: Vec<GeoPoint> = corners
            .into_iter()
            .map(|(x, y)| GeoPoint::new(y, x))
            .collect();
        let ids = fixture.admit(&options, &notched, Admission::user());
        assert_eq!(fixture.store.get(ids[0]).unwrap().vertex_count(), 4);

        let options = Options::builder().concave_polygon(false).build().unwrap();
        let ids = fixture.admit(&options, &notched, Admission::user());
        assert_eq!(fixture.store.get(ids[0]).unwrap().vertex_count(), 5);
    }

    #[test]
    fn cap_stops_admission_unless_forced() {
        let options = Options::builder().maximum_polygons(1).build().unwrap();
        let mut fixture = Fixture::new();
        assert_eq!(fixture.admit(&options, &square(0.0, 0.0, 10.0), Admission::user()).len(), 1);
        assert!(fixture
            .admit(&options, &square(50.0, 0.0, 10.0), Admission::user())
            .is_empty());
        assert_eq!(
            fixture
                .admit(&options, &square(50.0, 0.0, 10.0), Admission::merged())
                .len(),
            1
        );
        assert_eq!(fixture.store.len(), 2);
    }

    #[test]
    fn restore_keeps_lineage_and_raw_points() {
        let options = Options::default();
        let mut fixture = Fixture::new();
        let lineage = fixture.ids.allocate();
        let snapshot = Snapshot {
            lineage,
            ring: square(0.0, 0.0, 10.0)[..4].to_vec(),
            raw: square(0.0, 0.0, 12.0),
        };
        let factory = Factory::new(&GeoClipper, Some(&Convex), &options);
        let mut scene = Scene {
            renderer: &mut fixture.renderer,
            store: &mut fixture.store,
            ids: &mut fixture.ids,
            edges_active: false,
        };
        assert_eq!(factory.restore(&mut scene, &snapshot), Some(lineage));
        assert_eq!(fixture.store.get(lineage).unwrap().snapshot(), snapshot);
    }
}
