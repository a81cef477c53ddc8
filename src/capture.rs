use tracing::trace;

use crate::geometry::close_ring;
use crate::point::{GeoPoint, PlanePoint};
use crate::renderer::MapRenderer;

/// A free-hand stroke in progress.
///
/// The tracer does nothing on its own: each [`Tracer::feed`] draws one
/// preview segment from the previous sample and remembers the new one.
/// Cancelling a stroke is dropping the tracer.
#[derive(Clone)]
pub struct Tracer {
    last: PlanePoint,
    points: Vec<GeoPoint>,
}

impl Tracer {
    pub fn begin<R: MapRenderer + ?Sized>(start: PlanePoint, renderer: &mut R) -> Self {
        trace!("tracer: begin at {:?}", start);
        renderer.clear_preview();
        Self {
            last: start,
            points: vec![renderer.to_geo(start)],
        }
    }

    pub fn feed<R: MapRenderer + ?Sized>(&mut self, next: PlanePoint, renderer: &mut R) {
        renderer.draw_preview(self.last, next);
        self.last = next;
        self.points.push(renderer.to_geo(next));
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    /// Ends the stroke. With at least three samples the ring is closed and
    /// returned; fewer means the user did not draw a shape.
    pub fn finish<R: MapRenderer + ?Sized>(self, renderer: &mut R) -> Option<Vec<GeoPoint>> {
        renderer.clear_preview();
        trace!("tracer: finish with {} points", self.points.len());
        (self.points.len() >= 3).then(|| close_ring(&self.points))
    }
}
