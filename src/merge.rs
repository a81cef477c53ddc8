//! Unioning overlapping polygons.

use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{debug, info, trace, warn};

use crate::factory::{Admission, Factory, Scene};
use crate::geometry::{Clipper, PlaneRing, Projection};
use crate::point::PlanePoint;
use crate::polygon::{PolygonId, Snapshot};
use crate::renderer::MapRenderer;

/// One polygon produced by a merge pass.
#[derive(Clone)]
pub struct Merged {
    pub id: PolygonId,
    /// Every original lineage that went into this polygon.
    pub absorbed: Vec<PolygonId>,
    /// Originals to bring back if this merge is undone. Trigger polygons
    /// are left out.
    pub replaced: Vec<Snapshot>,
}

#[derive(Clone, Default)]
pub struct MergeOutcome {
    pub removed: Vec<PolygonId>,
    pub merged: Vec<Merged>,
}

/// Whether `a` and `b` fuse into one ring. Shapes that only touch at a
/// point intersect but stay apart.
fn fuses(clipper: &dyn Clipper, a: &[PlanePoint], b: &[PlanePoint]) -> bool {
    clipper.intersects(a, b) && clipper.union(&[a.to_vec(), b.to_vec()]).len() == 1
}

/// Groups of store indices connected by fusing pairs, singletons left out.
fn components(clipper: &dyn Clipper, planes: &[(PolygonId, PlaneRing)]) -> Vec<Vec<usize>> {
    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut parent: Vec<usize> = (0..planes.len()).collect();
    for (i, j) in (0..planes.len()).tuple_combinations() {
        if fuses(clipper, &planes[i].1, &planes[j].1) {
            let (ri, rj) = (root(&mut parent, i), root(&mut parent, j));
            parent[ri.max(rj)] = ri.min(rj);
        }
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..planes.len() {
        let r = root(&mut parent, i);
        groups.entry(r).or_default().push(i);
    }
    groups.into_values().filter(|group| group.len() > 1).collect()
}

/// One merge pass over the whole store.
///
/// Polygons are grouped by overlap, transitively, so chains of
/// overlapping shapes collapse in one pass; each group is unioned in a
/// single operation. `triggers` are the polygons whose creation or edit
/// caused this pass. Returns `None` when nothing fuses, which makes a
/// second pass right after a first a no-op.
pub fn merge<R: MapRenderer + ?Sized>(
    factory: &Factory<'_>,
    scene: &mut Scene<'_, R>,
    triggers: &[PolygonId],
) -> Option<MergeOutcome> {
    if scene.store.len() < 2 {
        return None;
    }
    let clipper = factory.clipper();
    let planes: Vec<(PolygonId, PlaneRing)> = scene
        .store
        .all()
        .iter()
        .map(|polygon| (polygon.id(), scene.renderer.ring_to_plane(polygon.ring())))
        .collect();

    let groups = components(clipper, &planes);
    if groups.is_empty() {
        trace!("merge: nothing fuses among {}", planes.len());
        return None;
    }

    let mut outcome = MergeOutcome::default();
    for group in groups {
        let members: Vec<PolygonId> = group.iter().map(|&i| planes[i].0).collect();
        let rings: Vec<PlaneRing> = group.iter().map(|&i| planes[i].1.clone()).collect();
        let united = clipper.union(&rings);
        if united.is_empty() {
            warn!("merge: union of {:?} came back empty, leaving them", members);
            continue;
        }
        if united.len() >= members.len() {
            trace!("merge: {:?} do not reduce, leaving them", members);
            continue;
        }
        info!(
            "merge: {} polygons -> {} ({:?}, triggered by {:?})",
            members.len(),
            united.len(),
            members,
            triggers
        );

        // Each original goes to the first result ring it fuses with.
        let mut absorbed_by: Vec<Vec<Snapshot>> = vec![Vec::new(); united.len()];
        for (&i, &id) in group.iter().zip(&members) {
            let polygon = match scene.store.remove(id, &mut *scene.renderer) {
                Some(polygon) => polygon,
                None => continue,
            };
            let target = united
                .iter()
                .position(|ring| fuses(clipper, &planes[i].1, ring))
                .unwrap_or(0);
            absorbed_by[target].push(polygon.snapshot());
        }
        outcome.removed.extend(members.iter().copied());

        for (ring, originals) in united.into_iter().zip(absorbed_by) {
            let absorbed: Vec<PolygonId> = originals.iter().map(|s| s.lineage).collect();
            let replaced: Vec<Snapshot> = originals
                .into_iter()
                .filter(|s| !triggers.contains(&s.lineage))
                .collect();

            let points = scene.renderer.ring_to_geo(&ring);
            for id in factory.admit(scene, &points, Admission::merged()) {
                debug!("merge: {} absorbed {:?}", id, absorbed);
                outcome.merged.push(Merged {
                    id,
                    absorbed: absorbed.clone(),
                    replaced: replaced.clone(),
                });
            }
        }
    }

    if outcome.merged.is_empty() && outcome.removed.is_empty() {
        return None;
    }
    Some(outcome)
}
