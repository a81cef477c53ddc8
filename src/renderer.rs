//! The host map surface.

use std::collections::BTreeMap;

use crate::geometry::Projection;
use crate::point::{GeoPoint, PlanePoint};
use crate::polygon::{Polygon, PolygonId};

/// Everything the engine asks of the host map: coordinate conversion,
/// toggling its own pan/zoom gestures, presentation classes, polygon layers
/// and the preview stroke.
pub trait MapRenderer: Projection {
    /// Enables or disables the host's pan/zoom gestures.
    fn set_gestures(&mut self, enabled: bool);

    fn set_mode_classes(&mut self, classes: &[(&'static str, bool)]);

    /// Adds the polygon and its edge handles to the map.
    fn attach_polygon(&mut self, polygon: &Polygon);

    /// Redraws a polygon whose vertices moved.
    fn redraw_polygon(&mut self, polygon: &Polygon);

    /// Removes the polygon and all of its edge handles.
    fn detach_polygon(&mut self, id: PolygonId);

    fn draw_preview(&mut self, from: PlanePoint, to: PlanePoint);

    fn clear_preview(&mut self);
}

/// A renderer without a screen. The projection is the identity (`x` is the
/// longitude, `y` the latitude) and every call is recorded, which makes it
/// the renderer of choice for tests and scripted sessions.
#[derive(Clone, Debug)]
pub struct HeadlessRenderer {
    pub gestures: bool,
    pub classes: Vec<(&'static str, bool)>,
    /// Displayed polygons and their current vertex count.
    pub layers: BTreeMap<PolygonId, usize>,
    pub preview: Vec<(PlanePoint, PlanePoint)>,
    pub redraws: usize,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self {
            gestures: true,
            classes: Vec::new(),
            layers: BTreeMap::new(),
            preview: Vec::new(),
            redraws: 0,
        }
    }
}

impl HeadlessRenderer {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|&(name, on)| on && name == class)
    }
}

impl Projection for HeadlessRenderer {
    fn to_plane(&self, point: GeoPoint) -> PlanePoint {
        PlanePoint::new(point.lng, point.lat)
    }

    fn to_geo(&self, point: PlanePoint) -> GeoPoint {
        GeoPoint::new(point.y, point.x)
    }
}

impl MapRenderer for HeadlessRenderer {
    fn set_gestures(&mut self, enabled: bool) {
        self.gestures = enabled;
    }

    fn set_mode_classes(&mut self, classes: &[(&'static str, bool)]) {
        self.classes = classes.to_vec();
    }

    fn attach_polygon(&mut self, polygon: &Polygon) {
        self.layers.insert(polygon.id(), polygon.vertex_count());
    }

    fn redraw_polygon(&mut self, polygon: &Polygon) {
        self.redraws += 1;
        self.layers.insert(polygon.id(), polygon.vertex_count());
    }

    fn detach_polygon(&mut self, id: PolygonId) {
        self.layers.remove(&id);
    }

    fn draw_preview(&mut self, from: PlanePoint, to: PlanePoint) {
        self.preview.push((from, to));
    }

    fn clear_preview(&mut self) {
        self.preview.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_projection_round_trips() {
        let renderer = HeadlessRenderer::default();
        let geo = GeoPoint::new(51.5, -0.12);
        let plane = renderer.to_plane(geo);
        assert_eq!(plane, PlanePoint::new(-0.12, 51.5));
        assert_eq!(renderer.to_geo(plane), geo);
    }
}
