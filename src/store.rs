use std::collections::BTreeMap;

use tracing::debug;

use crate::polygon::{Polygon, PolygonId};
use crate::renderer::MapRenderer;

/// The live polygons of one engine context. Membership here is what is
/// drawn; the renderer is kept in step on every mutation.
#[derive(Default)]
pub struct PolygonStore {
    polygons: BTreeMap<PolygonId, Polygon>,
}

impl PolygonStore {
    /// Attaches the polygon to the renderer and adds it. A polygon already
    /// stored under the same lineage is replaced.
    pub fn add<R: MapRenderer + ?Sized>(&mut self, polygon: Polygon, renderer: &mut R) {
        debug!(
            "store: add {} ({} vertices)",
            polygon.id(),
            polygon.vertex_count()
        );
        if self.polygons.contains_key(&polygon.id()) {
            renderer.detach_polygon(polygon.id());
        }
        renderer.attach_polygon(&polygon);
        self.polygons.insert(polygon.id(), polygon);
    }

    /// Detaches the polygon and its edges from the renderer and removes it.
    pub fn remove<R: MapRenderer + ?Sized>(
        &mut self,
        id: PolygonId,
        renderer: &mut R,
    ) -> Option<Polygon> {
        let polygon = self.polygons.remove(&id)?;
        debug!("store: remove {}", id);
        renderer.detach_polygon(id);
        Some(polygon)
    }

    pub fn clear<R: MapRenderer + ?Sized>(&mut self, renderer: &mut R) -> Vec<Polygon> {
        let removed = std::mem::take(&mut self.polygons);
        for &id in removed.keys() {
            renderer.detach_polygon(id);
        }
        debug!("store: cleared {} polygons", removed.len());
        removed.into_values().collect()
    }

    /// Every live polygon, in lineage order.
    pub fn all(&self) -> Vec<&Polygon> {
        self.polygons.values().collect()
    }

    pub fn ids(&self) -> Vec<PolygonId> {
        self.polygons.keys().copied().collect()
    }

    pub fn get(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons.get(&id)
    }

    /// Mutable access for in-place vertex edits; membership cannot change
    /// through it.
    pub(crate) fn get_mut(&mut self, id: PolygonId) -> Option<&mut Polygon> {
        self.polygons.get_mut(&id)
    }

    pub(crate) fn for_each_mut(&mut self, mut f: impl FnMut(&mut Polygon)) {
        self.polygons.values_mut().for_each(|polygon| f(polygon));
    }

    pub fn contains(&self, id: PolygonId) -> bool {
        self.polygons.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::GeoPoint;
    use crate::polygon::LineageIds;
    use crate::renderer::HeadlessRenderer;

    fn triangle(id: PolygonId) -> Polygon {
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];
        Polygon::new(id, ring.clone(), ring, false)
    }

    #[test]
    fn add_remove_clear_keep_renderer_in_step() {
        let mut renderer = HeadlessRenderer::default();
        let mut store = PolygonStore::default();
        let mut ids = LineageIds::default();
        let (a, b) = (ids.allocate(), ids.allocate());

        store.add(triangle(a), &mut renderer);
        store.add(triangle(b), &mut renderer);
        assert_eq!(store.len(), 2);
        assert_eq!(renderer.layers.len(), 2);

        assert!(store.remove(a, &mut renderer).is_some());
        assert!(store.remove(a, &mut renderer).is_none());
        assert_eq!(store.ids(), vec![b]);
        assert!(!renderer.layers.contains_key(&a));

        let cleared = store.clear(&mut renderer);
        assert_eq!(cleared.len(), 1);
        assert!(store.is_empty());
        assert!(renderer.layers.is_empty());
    }

    #[test]
    fn re_adding_a_lineage_replaces_it() {
        let mut renderer = HeadlessRenderer::default();
        let mut store = PolygonStore::default();
        let id = LineageIds::default().allocate();
        store.add(triangle(id), &mut renderer);
        store.add(triangle(id), &mut renderer);
        assert_eq!(store.len(), 1);
        assert_eq!(store.all().len(), 1);
    }
}
